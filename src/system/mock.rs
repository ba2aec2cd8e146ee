//! Mock system implementation for testing

#![expect(clippy::module_name_repetitions)]

use super::System;
use std::collections::{HashMap, HashSet};
use std::env::VarError;
use std::ffi::OsString;
use std::io::{self, BufRead, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides in-memory files, standard streams and environment,
/// so transform runs can be checked without touching the real process.
///
/// # Example
/// ```
/// use filexform::system::{mock::MockSystem, System};
/// use std::io::Read;
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("HOME", "/home/user").unwrap()
///     .with_file("/test/file.txt", b"Hello, world!").unwrap()
///     .with_stdin(b"from stdin").unwrap();
///
/// assert_eq!(system.env_var("HOME").unwrap(), "/home/user");
///
/// let mut contents = String::new();
/// system.open(Path::new("/test/file.txt")).unwrap().read_to_string(&mut contents).unwrap();
/// assert_eq!(contents, "Hello, world!");
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    args: Vec<OsString>,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    stdin: Vec<u8>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Where a `MockWriter` appends its bytes
#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Stdout,
    Stderr,
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                args: vec![OsString::from("mock")],
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
                stdin: Vec::new(),
                stdout: Vec::new(),
                stderr: Vec::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the mock state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set the process arguments after the program name (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the mock state lock is poisoned
    #[inline]
    pub fn with_args<I, T>(self, args: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut state = self.write_state()?;
        state.args.truncate(1);
        state.args.extend(args.into_iter().map(Into::into));
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the mock state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;

        // Ensure parent directories exist
        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the mock state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Set the bytes that standard input will yield (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the mock state lock is poisoned
    #[inline]
    pub fn with_stdin(self, contents: &[u8]) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.stdin = contents.to_vec();
        drop(state);
        Ok(self)
    }

    /// Contents of a file in the mock filesystem, if it exists
    #[must_use]
    #[inline]
    pub fn file_contents<P: AsRef<Path>>(&self, path: P) -> Option<Vec<u8>> {
        let state = self.state.read().ok()?;
        state.files.get(path.as_ref()).cloned()
    }

    /// Everything written to standard output so far
    #[must_use]
    #[inline]
    pub fn stdout_contents(&self) -> Vec<u8> {
        self.state
            .read()
            .map(|state| state.stdout.clone())
            .unwrap_or_default()
    }

    /// Everything written to standard error so far, lossily decoded
    #[must_use]
    #[inline]
    pub fn stderr_contents(&self) -> String {
        self.state
            .read()
            .map(|state| String::from_utf8_lossy(&state.stderr).into_owned())
            .unwrap_or_default()
    }

    #[inline]
    fn write_state(&self) -> io::Result<std::sync::RwLockWriteGuard<'_, MockSystemState>> {
        self.state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor == Path::new("") {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    #[expect(clippy::map_err_ignore, reason = "This is for VarError")]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn args_os(&self) -> Vec<OsString> {
        self.state
            .read()
            .map(|state| state.args.clone())
            .unwrap_or_default()
    }

    #[inline]
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let state = self
            .state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))?;
        if state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "Is a directory",
            ));
        }
        let bytes = state
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))?
            .clone();
        drop(state);
        Ok(Box::new(Cursor::new(bytes)))
    }

    #[inline]
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        let mut state = self.write_state()?;

        if let Some(parent) = path.parent()
            && parent != Path::new("")
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ));
        }

        // Truncate on open, like File::create
        state.files.insert(path.to_path_buf(), Vec::new());
        drop(state);
        Ok(Box::new(MockWriter {
            target: Target::File(path.to_path_buf()),
            system: self.clone(),
        }))
    }

    #[inline]
    fn stdin(&self) -> Box<dyn BufRead + '_> {
        let bytes = self
            .state
            .read()
            .map(|state| state.stdin.clone())
            .unwrap_or_default();
        Box::new(Cursor::new(bytes))
    }

    #[inline]
    fn stdout(&self) -> Box<dyn Write + '_> {
        Box::new(MockWriter {
            target: Target::Stdout,
            system: self.clone(),
        })
    }

    #[inline]
    fn stderr(&self) -> Box<dyn Write + '_> {
        Box::new(MockWriter {
            target: Target::Stderr,
            system: self.clone(),
        })
    }
}

/// Writer for `MockSystem` that appends straight into the in-memory state
struct MockWriter {
    target: Target,
    system: MockSystem,
}

#[expect(
    clippy::missing_trait_methods,
    reason = "Only implementing what I need"
)]
impl Write for MockWriter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.system.write_state()?;
        match self.target {
            Target::File(ref path) => state
                .files
                .entry(path.clone())
                .or_default()
                .extend_from_slice(buf),
            Target::Stdout => state.stdout.extend_from_slice(buf),
            Target::Stderr => state.stderr.extend_from_slice(buf),
        }
        drop(state);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
