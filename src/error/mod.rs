//! Error handling module
//!
//! Defines the transform error type and its exit codes

pub mod types;

pub use types::*;
