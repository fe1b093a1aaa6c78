//! # Block Utilization Tools
//!
//! Operating-room block utilization queries backed by fixed sample data.
//! All four tools take an inclusive `start_date`/`end_date` range in
//! `YYYY-MM-DD` form and reject malformed or reversed ranges.
//!
//! | Tool | Output |
//! |------|--------|
//! | `block_util_summary` | object with totals and rates |
//! | `block_util_by_block_group` | array, one entry per service line |
//! | `block_util_by_surgeon` | array, optionally filtered by block group |
//! | `block_util_drill_down` | array, one row per weekday |

mod by_block_group;
mod by_surgeon;
mod drill_down;
mod params;
mod summary;

pub use by_block_group::{
    BLOCK_GROUPS, BlockGroupParams, BlockGroupUtilization, BlockUtilByBlockGroupTool,
};
pub use by_surgeon::{BlockUtilBySurgeonTool, SURGEONS, SurgeonUtilization, surgeons_for};
pub use drill_down::{
    BlockUtilDrillDownTool, DailyBlockDetail, DrillDownParams, MAX_DRILL_DOWN_DAYS, daily_rows,
};
pub use params::{BlockFilterParams, DateRange};
pub use summary::{BlockUtilSummary, BlockUtilSummaryTool, summarize};

use lumen_core::ToolError;

use crate::ToolRegistry;

/// Register all block utilization tools.
pub fn register_block_util_tools(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    registry.register_tool(BlockUtilSummaryTool)?;
    registry.register_tool(BlockUtilByBlockGroupTool)?;
    registry.register_tool(BlockUtilBySurgeonTool)?;
    registry.register_tool(BlockUtilDrillDownTool)?;
    Ok(())
}
