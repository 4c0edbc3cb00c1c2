//! CLI command handling

pub mod format;
pub mod handlers;
pub mod settings;
