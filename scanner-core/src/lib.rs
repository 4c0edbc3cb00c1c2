//! # Scanner Core Library
//!
//! Mode catalog, expression evaluation, the mode state machine with its idle
//! reverter, HTTP dispatch, and the scan pipeline that ties them together.

pub mod catalog;
pub mod console;
pub mod expression;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod transport;
