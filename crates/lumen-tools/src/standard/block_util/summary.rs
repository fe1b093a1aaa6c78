use async_trait::async_trait;
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::params::{
    BlockFilterParams, DateRange, date_range_schema, parse_params, round2, to_output,
};

/// Overall block utilization for a date range.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockUtilSummaryTool;

impl BlockUtilSummaryTool {
    pub const NAME: &'static str = "block_util_summary";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockUtilSummary {
    pub total_blocks: u32,
    pub utilized_blocks: u32,
    pub utilization_rate: f64,
    pub prime_time_utilization: f64,
    pub total_cases: u32,
    pub avg_cases_per_block: f64,
}

pub fn summarize(params: &BlockFilterParams) -> BlockUtilSummary {
    let base = if params.blockgroup.is_some() { 0.78 } else { 0.72 };
    let location_modifier = match params.location.as_deref() {
        Some("Main OR") => 0.05,
        _ => 0.0,
    };

    BlockUtilSummary {
        total_blocks: 248,
        utilized_blocks: 186,
        utilization_rate: round2(base + location_modifier),
        prime_time_utilization: 0.81,
        total_cases: 412,
        avg_cases_per_block: 2.2,
    }
}

#[async_trait]
impl ToolExecutor for BlockUtilSummaryTool {
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let params: BlockFilterParams = parse_params(Self::NAME, input)?;
        DateRange::parse(Self::NAME, &params.start_date, &params.end_date)?;
        debug!(tool = Self::NAME, ?params, "Computing block utilization summary");
        to_output(Self::NAME, &summarize(&params))
    }
}

impl Tool for BlockUtilSummaryTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Returns overall block utilization metrics for the filtered date range. Use this to \
             get a high-level view of OR block utilization including total blocks, utilized \
             blocks, utilization rate, and case counts.",
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
