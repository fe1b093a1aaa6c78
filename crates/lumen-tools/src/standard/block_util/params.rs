//! Shared parameter types and helpers for the block utilization tools.

use chrono::NaiveDate;
use lumen_core::ToolError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date range plus the optional block group and location filters.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockFilterParams {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub blockgroup: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A validated, inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(tool: &str, start: &str, end: &str) -> Result<Self, ToolError> {
        let start = parse_date(tool, "start_date", start)?;
        let end = parse_date(tool, "end_date", end)?;
        if start > end {
            return Err(ToolError::invalid_input(
                tool,
                format!("start_date {start} is after end_date {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_date(tool: &str, field: &str, raw: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        ToolError::invalid_input(tool, format!("{field} '{raw}' is not YYYY-MM-DD: {e}"))
    })
}

pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::invalid_input(tool, e.to_string()))
}

pub(crate) fn to_output<T: Serialize>(tool: &str, output: &T) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(|e| ToolError::execution_failed(tool, e.to_string()))
}

/// Input schema with the date range and the given optional string filters.
pub(crate) fn date_range_schema(filters: &[(&str, &str)]) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "start_date".to_string(),
        json!({"type": "string", "description": "Start date in YYYY-MM-DD format"}),
    );
    properties.insert(
        "end_date".to_string(),
        json!({"type": "string", "description": "End date in YYYY-MM-DD format"}),
    );
    for (name, description) in filters {
        properties.insert(
            (*name).to_string(),
            json!({"type": "string", "description": description}),
        );
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": ["start_date", "end_date"],
    })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
