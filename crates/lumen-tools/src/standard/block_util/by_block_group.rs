use async_trait::async_trait;
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::params::{DateRange, date_range_schema, parse_params, to_output};

/// Utilization broken down by service line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockUtilByBlockGroupTool;

impl BlockUtilByBlockGroupTool {
    pub const NAME: &'static str = "block_util_by_block_group";
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockGroupParams {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockGroupUtilization {
    pub blockgroup: &'static str,
    pub total_blocks: u32,
    pub utilized_blocks: u32,
    pub utilization_rate: f64,
    pub total_cases: u32,
}

const fn group(
    blockgroup: &'static str,
    total_blocks: u32,
    utilized_blocks: u32,
    utilization_rate: f64,
    total_cases: u32,
) -> BlockGroupUtilization {
    BlockGroupUtilization {
        blockgroup,
        total_blocks,
        utilized_blocks,
        utilization_rate,
        total_cases,
    }
}

pub const BLOCK_GROUPS: [BlockGroupUtilization; 8] = [
    group("Orthopedics", 52, 48, 0.82, 108),
    group("General Surgery", 48, 42, 0.74, 89),
    group("Cardiac Surgery", 36, 32, 0.79, 58),
    group("Neurosurgery", 32, 26, 0.71, 45),
    group("Urology", 28, 22, 0.68, 48),
    group("ENT", 24, 18, 0.62, 38),
    group("Plastics", 16, 11, 0.58, 16),
    group("Vascular", 12, 9, 0.65, 10),
];

#[async_trait]
impl ToolExecutor for BlockUtilByBlockGroupTool {
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let params: BlockGroupParams = parse_params(Self::NAME, input)?;
        DateRange::parse(Self::NAME, &params.start_date, &params.end_date)?;
        debug!(tool = Self::NAME, location = ?params.location, "Listing block group utilization");
        to_output(Self::NAME, &BLOCK_GROUPS)
    }
}

impl Tool for BlockUtilByBlockGroupTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Breaks down block utilization by service line/block group. Use this to compare how \
             different surgical services are using their allocated block time.",
            date_range_schema(&[(
                "location",
                "Optional filter by location (e.g., 'Main OR', 'Ambulatory')",
            )]),
        )
    }
}
