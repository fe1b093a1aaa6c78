use async_trait::async_trait;
use chrono::{Datelike, Weekday};
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::params::{DATE_FORMAT, DateRange, date_range_schema, parse_params, round2, to_output};

/// Longest range the drill-down will expand into daily rows.
pub const MAX_DRILL_DOWN_DAYS: i64 = 366;

/// Day-by-day block detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockUtilDrillDownTool;

impl BlockUtilDrillDownTool {
    pub const NAME: &'static str = "block_util_drill_down";
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrillDownParams {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub surgeon: Option<String>,
    #[serde(default)]
    pub blockgroup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBlockDetail {
    pub date: String,
    pub block_start: &'static str,
    pub block_end: &'static str,
    pub cases_scheduled: u32,
    pub cases_completed: u32,
    pub utilization_rate: f64,
    /// Minutes of casework inside the allocated block.
    pub in_block_time: u32,
    /// Minutes of overtime past the block end.
    pub out_of_block_time: u32,
}

/// One row per weekday in `range`.
pub fn daily_rows<R: Rng + ?Sized>(range: DateRange, rng: &mut R) -> Vec<DailyBlockDetail> {
    range
        .start
        .iter_days()
        .take_while(|day| *day <= range.end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            let cases_scheduled = rng.random_range(2..=4);
            let cancellations = rng.random_range(0..=1);
            DailyBlockDetail {
                date: day.format(DATE_FORMAT).to_string(),
                block_start: "07:30",
                block_end: "15:30",
                cases_scheduled,
                cases_completed: cases_scheduled - cancellations,
                utilization_rate: round2(rng.random_range(0.60..0.95)),
                in_block_time: rng.random_range(360..480),
                out_of_block_time: rng.random_range(0..60),
            }
        })
        .collect()
}

#[async_trait]
impl ToolExecutor for BlockUtilDrillDownTool {
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let params: DrillDownParams = parse_params(Self::NAME, input)?;
        let range = DateRange::parse(Self::NAME, &params.start_date, &params.end_date)?;
        if range.days() > MAX_DRILL_DOWN_DAYS {
            return Err(ToolError::invalid_input(
                Self::NAME,
                format!(
                    "date range spans {} days; at most {MAX_DRILL_DOWN_DAYS} are allowed",
                    range.days()
                ),
            ));
        }

        debug!(
            tool = Self::NAME,
            surgeon = ?params.surgeon,
            blockgroup = ?params.blockgroup,
            days = range.days(),
            "Generating daily block detail"
        );
        let rows = daily_rows(range, &mut rand::rng());
        to_output(Self::NAME, &rows)
    }
}

impl Tool for BlockUtilDrillDownTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Detailed case-level data for a specific block or surgeon. Use this to get granular \
             day-by-day block utilization details including scheduled vs completed cases, \
             in-block time, and out-of-block time.",
            date_range_schema(&[
                ("surgeon", "Optional filter by surgeon name"),
                ("blockgroup", "Optional filter by block group"),
            ]),
        )
    }
}
