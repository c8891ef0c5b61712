//! Supporting utilities: working-area file helpers, tool lookup, and progress display.

pub mod fs;
pub mod platform;
pub mod progress;
