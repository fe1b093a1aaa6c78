use async_trait::async_trait;
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::params::{BlockFilterParams, DateRange, date_range_schema, parse_params, to_output};

/// Per-surgeon block usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockUtilBySurgeonTool;

impl BlockUtilBySurgeonTool {
    pub const NAME: &'static str = "block_util_by_surgeon";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurgeonUtilization {
    pub surgeon_name: &'static str,
    pub blocks: u32,
    pub utilized_blocks: u32,
    pub utilization_rate: f64,
    pub total_cases: u32,
    /// Minutes.
    pub avg_case_duration: u32,
}

const fn surgeon(
    surgeon_name: &'static str,
    blocks: u32,
    utilized_blocks: u32,
    utilization_rate: f64,
    total_cases: u32,
    avg_case_duration: u32,
) -> SurgeonUtilization {
    SurgeonUtilization {
        surgeon_name,
        blocks,
        utilized_blocks,
        utilization_rate,
        total_cases,
        avg_case_duration,
    }
}

pub const SURGEONS: [SurgeonUtilization; 8] = [
    surgeon("Dr. Sarah Chen", 12, 11, 0.92, 28, 145),
    surgeon("Dr. Michael Roberts", 10, 9, 0.9, 24, 120),
    surgeon("Dr. James Wilson", 8, 7, 0.88, 18, 180),
    surgeon("Dr. Emily Park", 8, 6, 0.75, 15, 95),
    surgeon("Dr. David Martinez", 6, 5, 0.83, 14, 110),
    surgeon("Dr. Lisa Thompson", 6, 4, 0.67, 10, 135),
    surgeon("Dr. Robert Kim", 4, 2, 0.5, 6, 160),
    surgeon("Dr. Jennifer Lee", 4, 3, 0.75, 8, 88),
];

fn block_group_members(blockgroup: &str) -> &'static [&'static str] {
    match blockgroup {
        "Orthopedics" => &["Dr. Sarah Chen", "Dr. Michael Roberts"],
        "General Surgery" => &["Dr. James Wilson", "Dr. Emily Park"],
        "Cardiac Surgery" => &["Dr. David Martinez", "Dr. Lisa Thompson"],
        "Neurosurgery" => &["Dr. Robert Kim", "Dr. Jennifer Lee"],
        _ => &[],
    }
}

/// Surgeons matching the optional block group filter.
pub fn surgeons_for(blockgroup: Option<&str>) -> Vec<SurgeonUtilization> {
    match blockgroup {
        None => SURGEONS.to_vec(),
        Some(group) => {
            let members = block_group_members(group);
            SURGEONS
                .iter()
                .filter(|s| members.contains(&s.surgeon_name))
                .cloned()
                .collect()
        }
    }
}

#[async_trait]
impl ToolExecutor for BlockUtilBySurgeonTool {
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let params: BlockFilterParams = parse_params(Self::NAME, input)?;
        DateRange::parse(Self::NAME, &params.start_date, &params.end_date)?;
        debug!(
            tool = Self::NAME,
            blockgroup = ?params.blockgroup,
            location = ?params.location,
            "Listing surgeon utilization"
        );
        to_output(Self::NAME, &surgeons_for(params.blockgroup.as_deref()))
    }
}

impl Tool for BlockUtilBySurgeonTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Shows utilization metrics per surgeon. Use this to analyze individual surgeon block \
             usage, including their utilization rate, case counts, and average case duration.",
            date_range_schema(&[
                (
                    "blockgroup",
                    "Optional filter by block group (e.g., 'Orthopedics', 'Cardiac')",
                ),
                (
                    "location",
                    "Optional filter by location (e.g., 'Main OR', 'Ambulatory')",
                ),
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unfiltered_lists_everyone() {
        assert_eq!(surgeons_for(None).len(), 8);
    }

    #[test]
    fn test_block_group_filter() {
        let names: Vec<&str> = surgeons_for(Some("Cardiac Surgery"))
            .iter()
            .map(|s| s.surgeon_name)
            .collect();
        assert_eq!(names, vec!["Dr. David Martinez", "Dr. Lisa Thompson"]);
    }

    #[test]
    fn test_unknown_block_group_is_empty() {
        assert!(surgeons_for(Some("Podiatry")).is_empty());
    }

    #[tokio::test]
    async fn test_execute_returns_array() {
        let out = BlockUtilBySurgeonTool
            .execute(json!({
                "start_date": "2024-01-01",
                "end_date": "2024-01-31",
                "blockgroup": "Orthopedics"
            }))
            .await
            .unwrap();
        assert_eq!(out.as_array().map(Vec::len), Some(2));
        assert_eq!(out[0]["avg_case_duration"], 145);
    }
}
