use futures::FutureExt;
use indexmap::IndexMap;
use jsonschema::Validator;
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::schema;

#[derive(Clone)]
struct RegisteredTool {
    definition: ToolDefinition,
    executor: Arc<dyn ToolExecutor>,
    validator: Arc<Validator>,
}

/// Name-keyed collection of callable tools.
///
/// `ToolRegistry` is populated once at startup and then shared read-only
/// (typically behind an `Arc`) by every agent run, so lookups need no
/// locking. Tools keep the order in which their names were first registered;
/// that order is what the model sees in its tool list.
///
/// Registering a name that already exists replaces the previous definition
/// and executor in place (last writer wins). Registration order is under the
/// caller's control, so this is logged rather than rejected.
///
/// # Example
///
/// ```rust
/// use lumen_core::{ToolDefinition, executor_fn};
/// use lumen_tools::ToolRegistry;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let mut registry = ToolRegistry::new();
/// registry
///     .register(
///         ToolDefinition::new("echo", "Echo the input", json!({"type": "object"})),
///         Arc::new(executor_fn(|input| async move { Ok(input) })),
///     )
///     .unwrap();
///
/// let out = registry.execute("echo", json!({"x": 1})).await.unwrap();
/// assert_eq!(out, json!({"x": 1}));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition with its executor.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidSchema` if the definition's input schema
    /// does not compile. The registry is left unchanged in that case.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<(), ToolError> {
        let validator = schema::compile(&definition.name, &definition.input_schema)?;
        let name = definition.name.clone();
        let entry = RegisteredTool {
            definition,
            executor,
            validator: Arc::new(validator),
        };

        if self.tools.insert(name.clone(), entry).is_some() {
            warn!(tool = %name, "Tool registered twice; previous entry replaced");
        } else {
            debug!(tool = %name, "Tool registered");
        }
        Ok(())
    }

    /// Register a self-describing tool.
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let definition = tool.definition();
        self.register(definition, Arc::new(tool))
    }

    /// Builder-style variant of [`register_tool`](Self::register_tool).
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Result<Self, ToolError> {
        self.register_tool(tool)?;
        Ok(self)
    }

    /// Find the executor registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ToolExecutor>, ToolError> {
        self.tools
            .get(name)
            .map(|entry| Arc::clone(&entry.executor))
            .ok_or_else(|| ToolError::not_found(name))
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|entry| &entry.definition)
    }

    /// Validate `input` against the tool's schema and run it.
    ///
    /// Executor failures, including panics, are returned unchanged as
    /// [`ToolError`]s; containing them is the caller's job.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no tool has this name
    /// - `InvalidInput` if the input violates the declared schema
    /// - whatever the executor itself fails with
    pub async fn execute(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        schema::check(name, &entry.validator, &input)?;

        match AssertUnwindSafe(entry.executor.execute(input))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = %name, %message, "Tool executor panicked");
                Err(ToolError::execution_failed(
                    name,
                    format!("executor panicked: {message}"),
                ))
            }
        }
    }

    /// Snapshot of all definitions in registration order.
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|entry| entry.definition.clone())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// A registry restricted to `names`, sharing executors with `self`.
    ///
    /// Registration order of `self` is kept. Unknown names are skipped.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Self {
        for name in names {
            if !self.contains(name.as_ref()) {
                warn!(tool = %name.as_ref(), "Requested tool is not registered");
            }
        }

        let tools = self
            .tools
            .iter()
            .filter(|(name, _)| names.iter().any(|n| n.as_ref() == name.as_str()))
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();
        Self { tools }
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lumen_core::executor_fn;
    use serde_json::json;

    struct Constant {
        name: &'static str,
        value: Value,
    }

    #[async_trait]
    impl ToolExecutor for Constant {
        async fn execute(&self, _input: Value) -> Result<Value, ToolError> {
            Ok(self.value.clone())
        }
    }

    impl Tool for Constant {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(self.name, "constant", json!({"type": "object"}))
        }
    }

    struct Panics;

    #[async_trait]
    impl ToolExecutor for Panics {
        async fn execute(&self, _input: Value) -> Result<Value, ToolError> {
            panic!("table missing")
        }
    }

    fn constant(name: &'static str, value: Value) -> Constant {
        Constant { name, value }
    }

    #[tokio::test]
    async fn test_execute_registered_tool() {
        let registry = ToolRegistry::new()
            .with_tool(constant("one", json!(1)))
            .unwrap();

        assert_eq!(registry.execute("one", json!({})).await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_missing_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry.execute("ghost", json!({})).await.unwrap_err();
        assert_eq!(err, ToolError::not_found("ghost"));
        assert!(registry.lookup("ghost").is_err());
    }

    #[tokio::test]
    async fn test_duplicate_registration_last_writer_wins() {
        let registry = ToolRegistry::new()
            .with_tool(constant("a", json!("first")))
            .unwrap()
            .with_tool(constant("b", json!("other")))
            .unwrap()
            .with_tool(constant("a", json!("second")))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.execute("a", json!({})).await.unwrap(), json!("second"));
        // Replacement keeps the original position.
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_schema_violation_never_reaches_executor() {
        let mut registry = ToolRegistry::new();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry
            .register(
                ToolDefinition::new(
                    "dated",
                    "needs a date",
                    json!({
                        "type": "object",
                        "properties": {"start_date": {"type": "string"}},
                        "required": ["start_date"]
                    }),
                ),
                Arc::new(executor_fn(move |_| {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    async { Ok(json!({})) }
                })),
            )
            .unwrap();

        let err = registry.execute("dated", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput { .. }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        registry
            .execute("dated", json!({"start_date": "2024-01-01"}))
            .await
            .unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_schema_rejected_at_registration() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .register(
                ToolDefinition::new("bad", "", json!({"type": 12})),
                Arc::new(executor_fn(|input| async move { Ok(input) })),
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidSchema { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_executor_becomes_error() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new("panics", "", json!({"type": "object"})),
                Arc::new(Panics),
            )
            .unwrap();

        let err = registry.execute("panics", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("table missing"));
    }

    #[test]
    fn test_list_definitions_snapshot_in_order() {
        let registry = ToolRegistry::new()
            .with_tool(constant("z", json!(0)))
            .unwrap()
            .with_tool(constant("a", json!(0)))
            .unwrap();

        let names: Vec<String> = registry
            .list_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[tokio::test]
    async fn test_subset_shares_executors() {
        let registry = ToolRegistry::new()
            .with_tool(constant("a", json!("a")))
            .unwrap()
            .with_tool(constant("b", json!("b")))
            .unwrap()
            .with_tool(constant("c", json!("c")))
            .unwrap();

        let scoped = registry.subset(&["c", "a", "missing"]);
        assert_eq!(scoped.names().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(scoped.execute("c", json!({})).await.unwrap(), json!("c"));
        assert!(scoped.execute("b", json!({})).await.is_err());
    }
}
