//! Execution of external tools.

pub mod command_builder;

pub use command_builder::{ToolCommand, ToolOutput};
