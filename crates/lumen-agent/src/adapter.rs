//! # Content and Schema Adapter
//!
//! Translation between the in-process conversation model and the Converse
//! wire format, plus typed extraction from model turns.
//!
//! Invocation ids travel as `toolUseId` in both `toolUse` and `toolResult`
//! blocks, following Converse naming.
//!
//! ## Payload wrapping
//!
//! The wire format only accepts JSON objects as tool result content, so
//! [`wrap_payload`] normalizes every tool output:
//!
//! | Tool output | Sent as |
//! |-------------|---------|
//! | array `A` | `{"data": A}` |
//! | scalar or null `s` | `{"value": s}` |
//! | object whose only key is `data` or `value` | `{"value": O}` |
//! | any other object `O` | `O` |
//!
//! [`unwrap_payload`] inverts this exactly: `unwrap_payload(&wrap_payload(x)) == x`
//! for every JSON value `x`.

use lumen_core::{
    ContentBlock, Conversation, Role, ToolDefinition, ToolInvocation, ToolResult, ToolStatus, Turn,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Key holding a wrapped array payload.
pub const DATA_KEY: &str = "data";
/// Key holding a wrapped scalar, or an object that would otherwise be ambiguous.
pub const VALUE_KEY: &str = "value";

/// `{"toolSpec": {...}}` entry of a Converse `toolConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolSpec {
    pub tool_spec: WireToolSpecBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolSpecBody {
    pub name: String,
    pub description: String,
    pub input_schema: WireSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSchema {
    pub json: Value,
}

/// One Converse message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: Vec<WireContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireContentBlock {
    Text(String),
    ToolUse(WireToolUse),
    ToolResult(WireToolResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolUse {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolResult {
    pub tool_use_id: String,
    pub content: Vec<WireToolResultContent>,
    pub status: ToolStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireToolResultContent {
    Json(Value),
    Text(String),
}

/// Copy every definition into the wire tool format, in order.
pub fn to_wire_tool_specs(definitions: &[ToolDefinition]) -> Vec<WireToolSpec> {
    definitions
        .iter()
        .map(|definition| WireToolSpec {
            tool_spec: WireToolSpecBody {
                name: definition.name.clone(),
                description: definition.description.clone(),
                input_schema: WireSchema {
                    json: definition.input_schema.clone(),
                },
            },
        })
        .collect()
}

/// All text blocks of `turn`, joined by a newline.
pub fn extract_text(turn: &Turn) -> String {
    turn.text_blocks().collect::<Vec<_>>().join("\n")
}

/// All tool invocations of `turn`, in emission order.
pub fn extract_invocations(turn: &Turn) -> Vec<ToolInvocation> {
    turn.invocations().cloned().collect()
}

/// Build the result for one invocation, wrapping its payload.
pub fn tool_result(invocation_id: &str, payload: Value, status: ToolStatus) -> ToolResult {
    ToolResult {
        invocation_id: invocation_id.to_string(),
        payload: wrap_payload(payload),
        status,
    }
}

/// [`tool_result`] as a content block.
pub fn to_wire_result(invocation_id: &str, payload: Value, status: ToolStatus) -> ContentBlock {
    ContentBlock::ToolResult(tool_result(invocation_id, payload, status))
}

/// Normalize a tool output into an object.
pub fn wrap_payload(payload: Value) -> Value {
    let reserved = matches!(&payload, Value::Object(map) if is_reserved_shape(map));
    match payload {
        Value::Array(_) => single_entry(DATA_KEY, payload),
        Value::Object(_) if !reserved => payload,
        other => single_entry(VALUE_KEY, other),
    }
}

/// Recover the original tool output from a wrapped payload.
pub fn unwrap_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) if map.len() == 1 => match (map.get(DATA_KEY), map.get(VALUE_KEY)) {
            (Some(Value::Array(items)), _) => Value::Array(items.clone()),
            (_, Some(inner)) => inner.clone(),
            _ => payload.clone(),
        },
        _ => payload.clone(),
    }
}

fn is_reserved_shape(map: &Map<String, Value>) -> bool {
    map.len() == 1 && (map.contains_key(DATA_KEY) || map.contains_key(VALUE_KEY))
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Convert a turn into a Converse message.
pub fn turn_to_wire(turn: &Turn) -> WireMessage {
    let content = turn
        .content()
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => WireContentBlock::Text(text.clone()),
            ContentBlock::ToolInvocation(invocation) => WireContentBlock::ToolUse(WireToolUse {
                tool_use_id: invocation.id.clone(),
                name: invocation.name.clone(),
                input: invocation.input.clone(),
            }),
            ContentBlock::ToolResult(result) => WireContentBlock::ToolResult(WireToolResult {
                tool_use_id: result.invocation_id.clone(),
                content: vec![WireToolResultContent::Json(result.payload.clone())],
                status: result.status,
            }),
        })
        .collect();

    WireMessage {
        role: turn.role(),
        content,
    }
}

pub fn conversation_to_wire(conversation: &Conversation) -> Vec<WireMessage> {
    conversation.turns().iter().map(turn_to_wire).collect()
}

/// Convert raw Converse content into a turn.
///
/// Block kinds the conversation model has no place for (reasoning traces,
/// images, documents) are skipped.
pub fn turn_from_wire(role: Role, content: Vec<Value>) -> Turn {
    let blocks = content
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<WireContentBlock>(raw) {
            Ok(block) => Some(block_from_wire(block)),
            Err(err) => {
                debug!(error = %err, "Skipping unsupported content block");
                None
            }
        })
        .collect();
    Turn::new(role, blocks)
}

fn block_from_wire(block: WireContentBlock) -> ContentBlock {
    match block {
        WireContentBlock::Text(text) => ContentBlock::Text(text),
        WireContentBlock::ToolUse(tool_use) => ContentBlock::ToolInvocation(ToolInvocation {
            id: tool_use.tool_use_id,
            name: tool_use.name,
            input: tool_use.input,
        }),
        WireContentBlock::ToolResult(result) => {
            let payload = result
                .content
                .into_iter()
                .next()
                .map(|content| match content {
                    WireToolResultContent::Json(value) => value,
                    WireToolResultContent::Text(text) => Value::String(text),
                })
                .unwrap_or(Value::Null);
            ContentBlock::ToolResult(ToolResult {
                invocation_id: result.tool_use_id,
                payload,
                status: result.status,
            })
        }
    }
}
