//! Error types with exit codes

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a transform run
///
/// Every variant maps to the process exit code reported by
/// [`crate::transform::Transformer::finish`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransformError {
    /// Invalid combination of positional files and `-i`/`-o`
    #[error("{message}")]
    ArgumentConflict { message: String },

    /// An environment variable holds a value the transformer can't use
    #[error("Invalid {name} value '{value}': expected 'text' or 'binary'")]
    InvalidEnvironment { name: String, value: String },

    /// A named input or output file could not be opened
    #[error("Could not open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The loader, processor or dumper failed
    #[error("{0}")]
    Processing(anyhow::Error),

    /// The argument parser rejected the command line (or printed help/version)
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// A post-parse hook rejected the parsed arguments
    #[error("{0}")]
    Hook(anyhow::Error),
}

impl TransformError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub fn exit_code(&self) -> i32 {
        match *self {
            Self::ArgumentConflict { .. } | Self::InvalidEnvironment { .. } | Self::Hook(_) => 1,
            Self::FileOpen { .. } => 2,
            Self::Processing(_) => 3,
            Self::Usage(ref err) => err.exit_code(),
        }
    }

    /// Create an argument conflict error
    #[inline]
    pub fn argument_conflict<S: Into<String>>(message: S) -> Self {
        Self::ArgumentConflict {
            message: message.into(),
        }
    }

    /// Create an error for an unusable environment variable value
    #[inline]
    pub fn invalid_environment<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self::InvalidEnvironment {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a file open error for `path`
    #[inline]
    pub fn file_open<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure raised while loading, processing or dumping
    #[inline]
    pub fn processing<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Processing(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_error_kinds() {
        assert_eq!(TransformError::argument_conflict("Too many inputs!").exit_code(), 1);
        assert_eq!(
            TransformError::file_open("a.txt", io::Error::from(io::ErrorKind::NotFound))
                .exit_code(),
            2
        );
        assert_eq!(TransformError::processing(anyhow::anyhow!("bad")).exit_code(), 3);
        assert_eq!(TransformError::Hook(anyhow::anyhow!("nope")).exit_code(), 1);
        assert_eq!(
            TransformError::invalid_environment("FILEXFORM_DEFAULT_MODE", "octets").exit_code(),
            1
        );
    }

    #[test]
    fn file_open_message_names_path_and_cause() {
        let err = TransformError::file_open(
            "missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(
            err.to_string(),
            "Could not open file missing.txt: No such file or directory"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn processing_message_is_the_error_text() {
        let err = TransformError::processing(anyhow::anyhow!("bad"));
        assert_eq!(err.to_string(), "bad");
    }
}
