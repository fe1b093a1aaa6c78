//! JSON Schema compilation and input validation.

use jsonschema::Validator;
use lumen_core::ToolError;
use serde_json::Value;

/// Compile a tool's declared input schema.
pub(crate) fn compile(tool: &str, schema: &Value) -> Result<Validator, ToolError> {
    Validator::new(schema).map_err(|e| ToolError::InvalidSchema {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Check `input` against a compiled schema, reporting every violation.
pub(crate) fn check(tool: &str, validator: &Validator, input: &Value) -> Result<(), ToolError> {
    if validator.is_valid(input) {
        return Ok(());
    }
    let violations: Vec<String> = validator.iter_errors(input).map(|e| e.to_string()).collect();
    Err(ToolError::invalid_input(tool, violations.join("; ")))
}

/// Validate `input` against an uncompiled schema.
///
/// # Errors
///
/// `InvalidSchema` if the schema does not compile, `InvalidInput` listing all
/// violations otherwise.
pub fn validate_against_schema(tool: &str, schema: &Value, input: &Value) -> Result<(), ToolError> {
    let validator = compile(tool, schema)?;
    check(tool, &validator, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "start_date": {"type": "string"},
                "limit": {"type": "integer"}
            },
            "required": ["start_date"]
        })
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_against_schema("t", &schema(), &json!({"start_date": "2024-01-01"})).is_ok());
    }

    #[test]
    fn test_missing_required_field_reported() {
        let err = validate_against_schema("t", &schema(), &json!({"limit": 3})).unwrap_err();
        match err {
            ToolError::InvalidInput { tool, reason } => {
                assert_eq!(tool, "t");
                assert!(reason.contains("start_date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_violations_collected() {
        let err = validate_against_schema("t", &schema(), &json!({"limit": "many"})).unwrap_err();
        let ToolError::InvalidInput { reason, .. } = err else {
            panic!("expected invalid input");
        };
        assert_eq!(reason.split("; ").count(), 2);
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let err = validate_against_schema("t", &json!({"type": "not-a-type"}), &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidSchema { .. }));
    }
}
