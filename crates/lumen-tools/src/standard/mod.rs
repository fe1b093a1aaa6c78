//! Standard tool library shipped with the agent.

pub mod block_util;

pub use block_util::register_block_util_tools;

use lumen_core::ToolError;

use crate::ToolRegistry;

/// Registry holding every standard tool.
pub fn standard_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    register_block_util_tools(&mut registry)?;
    Ok(registry)
}
