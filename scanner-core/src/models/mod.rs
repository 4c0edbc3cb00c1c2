//! Data models for the scanner

pub mod configuration;
pub mod mode;
pub mod payload;

pub use configuration::*;
pub use mode::*;
pub use payload::*;
