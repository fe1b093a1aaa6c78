//! # Lumen Tools
//!
//! The tool registry the agent dispatches through, plus the standard
//! analytics tools.
//!
//! ## Overview
//!
//! - **[`ToolRegistry`]**: name-keyed executors with JSON Schema validation,
//!   read-only once startup registration is done
//! - **[`schema`]**: schema compilation and input validation
//! - **[`standard`]**: block utilization tools with sample data

pub mod registry;
pub mod schema;
pub mod standard;

pub use registry::ToolRegistry;
pub use schema::validate_against_schema;
pub use standard::{register_block_util_tools, standard_registry};
