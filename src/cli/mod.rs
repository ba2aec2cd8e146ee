//! Command-line interface module
//!
//! Builds the argument parser, holds the run options and the parsed invocation

pub mod args;
pub mod options;

pub use args::*;
pub use options::*;
