//! Real system implementation using `std::io`, `std::fs` and `std::env`

use super::System;
use std::env::VarError;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, BufReader, LineWriter, Write};
use std::path::Path;

/// Production implementation of System trait
///
/// Files are wrapped in `BufReader`/`LineWriter` so output reaches disk a line
/// at a time, the same way the standard streams behave on a terminal.
#[derive(Debug, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub const fn new() -> Self {
        return Self;
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RealSystem {
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }

    fn args_os(&self) -> Vec<OsString> {
        std::env::args_os().collect()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        let file = fs::File::create(path)?;
        Ok(Box::new(LineWriter::new(file)))
    }

    fn stdin(&self) -> Box<dyn BufRead + '_> {
        Box::new(io::stdin().lock())
    }

    fn stdout(&self) -> Box<dyn Write + '_> {
        Box::new(io::stdout())
    }

    fn stderr(&self) -> Box<dyn Write + '_> {
        Box::new(io::stderr())
    }
}
