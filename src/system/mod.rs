//! System abstraction for standard streams, file handles and environment
//!
//! Every byte the transformer reads or writes goes through this trait, so the
//! whole resolution policy can be exercised against an in-memory mock.

use std::env::VarError;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Unified trait for system operations (standard streams + files + environment)
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::io`, `std::fs` and `std::env`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    // ==================== Environment Operations ====================

    /// Get an environment variable
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    /// Command-line tokens of the process, program name first
    fn args_os(&self) -> Vec<OsString>;

    // ==================== File Operations ====================

    /// Open a file for reading, line-buffered
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;

    /// Create (or truncate) a file for writing, line-buffered
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;

    // ==================== Standard Streams ====================

    /// Standard input
    fn stdin(&self) -> Box<dyn BufRead + '_>;

    /// Standard output
    fn stdout(&self) -> Box<dyn Write + '_>;

    /// Standard error, where failure reports are written
    fn stderr(&self) -> Box<dyn Write + '_>;
}
