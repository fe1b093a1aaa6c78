//! # Conversation Model
//!
//! An append-only log of [`Turn`]s exchanged between the user and the model.
//! The log is the model's context, so order is significant and nothing that
//! has been appended is ever rewritten.
//!
//! [`Conversation::push`] enforces the two structural rules every transcript
//! must satisfy:
//!
//! - roles strictly alternate between `user` and `assistant`;
//! - a user turn that follows an assistant turn carrying tool invocations
//!   answers each of them exactly once, with matching ids, in the same order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Author of a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification carried by a [`ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolStatus::Error)
    }
}

/// A model-issued request to run a named tool.
///
/// The `id` is opaque and assigned by the model; it is only used to
/// correlate the invocation with its [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// The outcome of one [`ToolInvocation`], correlated by `invocation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub invocation_id: String,
    pub payload: Value,
    pub status: ToolStatus,
}

/// A single block of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    Text(String),
    ToolInvocation(ToolInvocation),
    ToolResult(ToolResult),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_invocation(&self) -> Option<&ToolInvocation> {
        match self {
            ContentBlock::ToolInvocation(invocation) => Some(invocation),
            _ => None,
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        match self {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        }
    }
}

/// One message-shaped entry of a [`Conversation`].
///
/// Turns have no mutable accessors; once a turn is appended its content is
/// fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: Vec<ContentBlock>,
}

impl Turn {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::text(text)])
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![ContentBlock::text(text)])
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    /// Text blocks in their original order.
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentBlock::as_text)
    }

    /// Tool invocations in the order the model emitted them.
    pub fn invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.content.iter().filter_map(ContentBlock::as_invocation)
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.content.iter().filter_map(ContentBlock::as_tool_result)
    }

    pub fn has_invocations(&self) -> bool {
        self.invocations().next().is_some()
    }
}

/// Structural violations rejected by [`Conversation::push`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("turn {index} repeats the '{role}' role of the previous turn")]
    RepeatedRole { index: usize, role: Role },

    #[error("turn {index} is a '{role}' turn but carries {block} blocks")]
    MisplacedBlock {
        index: usize,
        role: Role,
        block: &'static str,
    },

    #[error("turn {index} answers tool invocations {found:?}, expected {expected:?}")]
    UnmatchedToolResults {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Turn>", into = "Vec<Turn>")]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation from prior history, validating every turn.
    pub fn from_turns(turns: Vec<Turn>) -> Result<Self, ConversationError> {
        let mut conversation = Self::new();
        for turn in turns {
            conversation.push(turn)?;
        }
        Ok(conversation)
    }

    /// Append a turn after checking it against the current tail.
    pub fn push(&mut self, turn: Turn) -> Result<(), ConversationError> {
        let index = self.turns.len();

        match turn.role {
            Role::User if turn.has_invocations() => {
                return Err(ConversationError::MisplacedBlock {
                    index,
                    role: turn.role,
                    block: "toolInvocation",
                });
            }
            Role::Assistant if turn.tool_results().next().is_some() => {
                return Err(ConversationError::MisplacedBlock {
                    index,
                    role: turn.role,
                    block: "toolResult",
                });
            }
            _ => {}
        }

        if self.turns.last().is_some_and(|previous| previous.role == turn.role) {
            return Err(ConversationError::RepeatedRole {
                index,
                role: turn.role,
            });
        }

        if turn.role == Role::User {
            let expected: Vec<&str> = self
                .turns
                .last()
                .map(|previous| previous.invocations().map(|i| i.id.as_str()).collect())
                .unwrap_or_default();
            let found: Vec<&str> = turn
                .tool_results()
                .map(|r| r.invocation_id.as_str())
                .collect();

            if expected != found {
                return Err(ConversationError::UnmatchedToolResults {
                    index,
                    expected: expected.into_iter().map(str::to_string).collect(),
                    found: found.into_iter().map(str::to_string).collect(),
                });
            }
        }

        self.turns.push(turn);
        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl TryFrom<Vec<Turn>> for Conversation {
    type Error = ConversationError;

    fn try_from(turns: Vec<Turn>) -> Result<Self, Self::Error> {
        Self::from_turns(turns)
    }
}

impl From<Conversation> for Vec<Turn> {
    fn from(conversation: Conversation) -> Self {
        conversation.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(id: &str) -> ContentBlock {
        ContentBlock::ToolResult(ToolResult {
            invocation_id: id.to_string(),
            payload: json!({}),
            status: ToolStatus::Success,
        })
    }

    fn invocation(id: &str) -> ContentBlock {
        ContentBlock::ToolInvocation(ToolInvocation::new(id, "tool", json!({})))
    }

    #[test]
    fn test_push_alternating_turns() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user_text("hi")).unwrap();
        conversation.push(Turn::assistant_text("hello")).unwrap();
        conversation.push(Turn::user_text("more")).unwrap();
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_repeated_role_rejected() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user_text("hi")).unwrap();
        let err = conversation.push(Turn::user_text("again")).unwrap_err();
        assert_eq!(
            err,
            ConversationError::RepeatedRole {
                index: 1,
                role: Role::User
            }
        );
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_tool_results_must_match_invocations_in_order() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user_text("q")).unwrap();
        conversation
            .push(Turn::assistant(vec![invocation("a"), invocation("b")]))
            .unwrap();

        let swapped = Turn::user(vec![result("b"), result("a")]);
        assert!(matches!(
            conversation.push(swapped),
            Err(ConversationError::UnmatchedToolResults { index: 2, .. })
        ));

        let missing = Turn::user(vec![result("a")]);
        assert!(conversation.push(missing).is_err());

        let plain_text = Turn::user_text("ignored the tools");
        assert!(conversation.push(plain_text).is_err());

        conversation
            .push(Turn::user(vec![result("a"), result("b")]))
            .unwrap();
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_unsolicited_tool_result_rejected() {
        let mut conversation = Conversation::new();
        let err = conversation.push(Turn::user(vec![result("x")])).unwrap_err();
        assert!(matches!(
            err,
            ConversationError::UnmatchedToolResults { index: 0, .. }
        ));
    }

    #[test]
    fn test_misplaced_blocks_rejected() {
        let mut conversation = Conversation::new();
        assert!(matches!(
            conversation.push(Turn::user(vec![invocation("a")])),
            Err(ConversationError::MisplacedBlock { .. })
        ));

        conversation.push(Turn::user_text("q")).unwrap();
        assert!(matches!(
            conversation.push(Turn::assistant(vec![result("a")])),
            Err(ConversationError::MisplacedBlock { .. })
        ));
    }

    #[test]
    fn test_content_block_serde_shape() {
        let block = invocation("a");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({"toolInvocation": {"id": "a", "name": "tool", "input": {}}})
        );

        let text = serde_json::to_value(ContentBlock::text("hi")).unwrap();
        assert_eq!(text, json!({"text": "hi"}));

        let result = serde_json::to_value(result("a")).unwrap();
        assert_eq!(result["toolResult"]["invocationId"], "a");
        assert_eq!(result["toolResult"]["status"], "success");
    }

    #[test]
    fn test_deserialize_validates_history() {
        let invalid = json!([
            {"role": "user", "content": [{"text": "a"}]},
            {"role": "user", "content": [{"text": "b"}]}
        ]);
        assert!(serde_json::from_value::<Conversation>(invalid).is_err());

        let valid = json!([
            {"role": "user", "content": [{"text": "a"}]},
            {"role": "assistant", "content": [{"text": "b"}]}
        ]);
        let conversation: Conversation = serde_json::from_value(valid).unwrap();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_turn_accessors_preserve_order() {
        let turn = Turn::assistant(vec![
            ContentBlock::text("looking"),
            invocation("a"),
            ContentBlock::text("and"),
            invocation("b"),
        ]);
        let texts: Vec<&str> = turn.text_blocks().collect();
        let ids: Vec<&str> = turn.invocations().map(|i| i.id.as_str()).collect();
        assert_eq!(texts, vec!["looking", "and"]);
        assert_eq!(ids, vec!["a", "b"]);
    }
}
