//! Configuration surface of a transformer run

use crate::cli::Invocation;
use crate::stream::StreamMode;
use crate::system::System;
use anyhow::Result;
use clap::Command;
use std::ffi::OsString;
use std::path::Path;

/// Environment variable holding the default stream mode (`text` or `binary`)
pub const DEFAULT_MODE_ENV: &str = "FILEXFORM_DEFAULT_MODE";

pub(crate) type PreParseHook<'f> = Box<dyn FnOnce(Command) -> Command + 'f>;
pub(crate) type PostParseHook<'f> =
    Box<dyn FnOnce(&Command, &mut Invocation) -> Result<()> + 'f>;

/// Options for building a [`crate::transform::Transformer`]
///
/// # Example
/// ```
/// use clap::{Arg, ArgAction, Command};
/// use filexform::cli::TransformerOptions;
/// use filexform::stream::StreamMode;
///
/// let options = TransformerOptions::new()
///     .parser(Command::new("upcase").about("Upper-case a file"))
///     .args(["-i", "in.txt", "--shout"])
///     .pre_parse_hook(|cmd| cmd.arg(Arg::new("shout").long("shout").action(ArgAction::SetTrue)))
///     .default_mode(StreamMode::Text);
/// assert!(options.positional_args_enabled());
/// ```
pub struct TransformerOptions<'f> {
    pub(crate) parser: Option<Command>,
    pub(crate) args: Option<Vec<OsString>>,
    pub(crate) pre_parse_hook: Option<PreParseHook<'f>>,
    pub(crate) post_parse_hook: Option<PostParseHook<'f>>,
    positional_args: Option<bool>,
    pub(crate) pass_through: bool,
    pub(crate) quiet: bool,
    pub(crate) default_mode: StreamMode,
    pub(crate) invalid_default_mode: Option<String>,
}

impl<'f> TransformerOptions<'f> {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            parser: None,
            args: None,
            pre_parse_hook: None,
            post_parse_hook: None,
            positional_args: None,
            pass_through: false,
            quiet: false,
            default_mode: StreamMode::Text,
            invalid_default_mode: None,
        }
    }

    /// Start from defaults, taking the default stream mode from
    /// `FILEXFORM_DEFAULT_MODE` when it is set
    ///
    /// A value other than `text` or `binary` is kept and reported by
    /// [`crate::transform::Transformer::validate`], so it goes through the
    /// same exit path (and the same `-q` handling) as any other bad input.
    #[must_use]
    #[inline]
    pub fn from_env(system: &dyn System) -> Self {
        let mut options = Self::new();
        if let Ok(value) = system.env_var(DEFAULT_MODE_ENV) {
            match value.parse::<StreamMode>() {
                Ok(mode) => options.default_mode = mode,
                Err(_) => options.invalid_default_mode = Some(value),
            }
        }
        options
    }

    /// Use `parser` instead of a bare command named after the program
    #[must_use]
    #[inline]
    pub fn parser(mut self, parser: Command) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Parse these tokens instead of the process arguments
    ///
    /// The program name is supplied by the transformer; pass only the arguments.
    #[must_use]
    #[inline]
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Augment the parser before parsing, typically to add flags
    #[must_use]
    #[inline]
    pub fn pre_parse_hook<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(Command) -> Command + 'f,
    {
        self.pre_parse_hook = Some(Box::new(hook));
        self
    }

    /// Validate or augment the parsed invocation
    ///
    /// An error returned here ends the run with exit code 1.
    #[must_use]
    #[inline]
    pub fn post_parse_hook<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Command, &mut Invocation) -> Result<()> + 'f,
    {
        self.post_parse_hook = Some(Box::new(hook));
        self
    }

    /// Enable or disable the `[input_file] [output_file]` syntax
    #[must_use]
    #[inline]
    pub fn positional_args(mut self, enabled: bool) -> Self {
        self.positional_args = Some(enabled);
        self
    }

    /// Collect trailing tokens into [`Invocation::remaining_args`]
    ///
    /// Positional paths are turned off unless explicitly re-enabled, since
    /// both would compete for the same bare tokens.
    #[must_use]
    #[inline]
    pub fn pass_through(mut self, enabled: bool) -> Self {
        self.pass_through = enabled;
        self
    }

    /// Suppress error messages even without `-q`
    #[must_use]
    #[inline]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Mode used when neither an override nor a capability flag decides
    #[must_use]
    #[inline]
    pub fn default_mode(mut self, mode: StreamMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Whether the positional path syntax will be registered
    #[must_use]
    #[inline]
    pub fn positional_args_enabled(&self) -> bool {
        self.positional_args.unwrap_or(!self.pass_through)
    }
}

impl Default for TransformerOptions<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Program name for the default parser: the file stem of `argv[0]`
#[must_use]
#[inline]
pub fn program_name(args: &[OsString]) -> String {
    args.first()
        .and_then(|arg0| Path::new(arg0).file_stem())
        .map_or_else(
            || "transform".to_owned(),
            |stem| stem.to_string_lossy().into_owned(),
        )
}
