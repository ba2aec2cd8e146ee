//! Stream resolver and invoker
//!
//! A [`Transformer`] owns one parsed invocation and runs a caller's functions
//! against the streams it resolves to, strictly in the order
//! parse → validate → open input → load → process → open output → dump.
//! [`Transformer::finish`] (or [`report`] when parsing itself failed) is the
//! single place where errors become exit codes and messages.

use crate::cli::{
    DEFAULT_MODE_ENV, Invocation, TransformerOptions, program_name, register_args,
    split_known_args,
};
use crate::contract::{Dumper, Loader, ModeOverrides, Processor, StreamModes, StreamProcessor};
use crate::error::TransformError;
use crate::stream::{InputStream, OutputStream, StreamMode};
use crate::system::System;
use clap::Command;
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, warn};

/// Exit code of a successful run
pub const EXIT_SUCCESS: i32 = 0;

/// Resolves streams for one invocation and runs processing functions on them
pub struct Transformer<'s> {
    system: &'s dyn System,
    command: Command,
    invocation: Invocation,
    default_mode: StreamMode,
    invalid_default_mode: Option<String>,
    overrides: ModeOverrides,
    quiet: bool,
}

impl<'s> Transformer<'s> {
    /// Build the parser, run the hooks and parse the command line
    ///
    /// Validation of the parsed paths is deferred to [`Transformer::run`] and
    /// [`Transformer::stream`] so that `-q` already applies to its message.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parser rejects the arguments, or help/version was requested ([`TransformError::Usage`])
    /// - The post-parse hook fails ([`TransformError::Hook`])
    #[inline]
    pub fn new(
        system: &'s dyn System,
        options: TransformerOptions<'_>,
    ) -> Result<Self, TransformError> {
        let positional_args = options.positional_args_enabled();
        let TransformerOptions {
            parser,
            args,
            pre_parse_hook,
            post_parse_hook,
            pass_through,
            quiet,
            default_mode,
            invalid_default_mode,
            ..
        } = options;

        let process_args = system.args_os();
        let parser = parser.unwrap_or_else(|| Command::new(program_name(&process_args)));
        let mut command = register_args(parser, positional_args);

        if let Some(hook) = pre_parse_hook {
            command = hook(command);
        }
        command.build();

        let mut tokens = match args {
            Some(args) => args,
            None => process_args.into_iter().skip(1).collect(),
        };
        let remaining_args = if pass_through {
            let (known, unknown) = split_known_args(&command, tokens, positional_args);
            tokens = known;
            unknown
        } else {
            Vec::new()
        };

        let program = OsString::from(command.get_name());
        let matches = command.try_get_matches_from_mut(core::iter::once(program).chain(tokens))?;
        let mut invocation = Invocation::from_matches(matches, remaining_args);

        if let Some(hook) = post_parse_hook {
            hook(&command, &mut invocation).map_err(TransformError::Hook)?;
        }

        debug!(
            "Parsed invocation: files={:?} input={:?} output={:?} quiet={} remaining={:?}",
            invocation.files(),
            invocation.input(),
            invocation.output(),
            invocation.quiet(),
            invocation.remaining_args()
        );

        Ok(Self {
            system,
            command,
            quiet: quiet || invocation.quiet(),
            invocation,
            default_mode,
            invalid_default_mode,
            overrides: ModeOverrides::default(),
        })
    }

    /// The parsed invocation
    #[must_use]
    #[inline]
    pub const fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// The parser, including flags added by the pre-parse hook
    #[must_use]
    #[inline]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Whether error messages will be printed
    #[must_use]
    #[inline]
    pub const fn verbose(&self) -> bool {
        !self.quiet
    }

    /// Force the input stream's mode, ignoring capability flags
    #[must_use]
    #[inline]
    pub fn with_input_mode(mut self, mode: StreamMode) -> Self {
        self.overrides.input = Some(mode);
        self
    }

    /// Force the output stream's mode, ignoring capability flags
    #[must_use]
    #[inline]
    pub fn with_output_mode(mut self, mode: StreamMode) -> Self {
        self.overrides.output = Some(mode);
        self
    }

    /// Check the configured default mode and the parsed paths
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `FILEXFORM_DEFAULT_MODE` was set to an unknown mode ([`TransformError::InvalidEnvironment`])
    /// - Three or more positional paths were given, or positional paths were
    ///   mixed with `-i`/`-o` ([`TransformError::ArgumentConflict`])
    #[inline]
    pub fn validate(&self) -> Result<(), TransformError> {
        if let Some(value) = self.invalid_default_mode.as_ref() {
            return Err(TransformError::invalid_environment(DEFAULT_MODE_ENV, value.clone()));
        }
        self.invocation.validate()
    }

    /// Open the resolved input in `mode`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FileOpen`] if a named input cannot be opened
    #[inline]
    pub fn open_input(&self, mode: StreamMode) -> Result<InputStream<'s>, TransformError> {
        InputStream::open(self.system, self.invocation.input_source(), mode)
    }

    /// Open the resolved output in `mode`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FileOpen`] if a named output cannot be created
    #[inline]
    pub fn open_output(&self, mode: StreamMode) -> Result<OutputStream<'s>, TransformError> {
        OutputStream::open(self.system, self.invocation.output_sink(), mode)
    }

    /// Buffered mode: load the whole input, process it, dump the result
    ///
    /// The input is closed before the processor runs and the output is only
    /// opened once the processor has returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The paths conflict ([`TransformError::ArgumentConflict`])
    /// - A file cannot be opened ([`TransformError::FileOpen`])
    /// - The loader, processor or dumper fails ([`TransformError::Processing`])
    #[inline]
    pub fn run<T, U>(
        &self,
        processor: Processor<'_, T, U>,
        loader: Loader<'_, T>,
        dumper: Dumper<'_, U>,
    ) -> Result<(), TransformError> {
        self.validate()?;

        let modes = StreamModes::resolve(
            self.default_mode,
            self.overrides,
            processor.mode(),
            loader.mode(),
            dumper.mode(),
        );
        debug!(
            "Stream modes: input={} output={}",
            modes.input, modes.output
        );

        let value = {
            let mut input = self.open_input(modes.input)?;
            loader
                .call(&mut input, &self.invocation)
                .map_err(TransformError::Processing)?
        };

        let result = processor
            .call(value, &self.invocation)
            .map_err(TransformError::Processing)?;

        let mut output = self.open_output(modes.output)?;
        dumper
            .call(result, &mut output, &self.invocation)
            .map_err(TransformError::Processing)?;
        output.finish().map_err(TransformError::Processing)
    }

    /// Streaming mode: hand both open streams to the processor
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The paths conflict ([`TransformError::ArgumentConflict`])
    /// - A file cannot be opened ([`TransformError::FileOpen`])
    /// - The processor fails ([`TransformError::Processing`])
    #[inline]
    pub fn stream(&self, processor: StreamProcessor<'_>) -> Result<(), TransformError> {
        self.validate()?;

        let modes = StreamModes::resolve(
            self.default_mode,
            self.overrides,
            processor.mode(),
            None,
            None,
        );
        debug!(
            "Stream modes: input={} output={}",
            modes.input, modes.output
        );

        let mut input = self.open_input(modes.input)?;
        let mut output = self.open_output(modes.output)?;
        processor
            .call(&mut input, &mut output, &self.invocation)
            .map_err(TransformError::Processing)?;
        drop(input);
        output.finish().map_err(TransformError::Processing)
    }

    /// Turn the outcome of a run into an exit code, printing the error
    /// message unless quiet
    #[must_use]
    #[inline]
    pub fn finish(&self, result: Result<(), TransformError>) -> i32 {
        report(self.system, result, self.quiet)
    }
}

/// Turn an outcome into an exit code, writing messages to the system's stderr
///
/// Parser output (errors, help, version) and post-parse hook failures are
/// always printed; the rest is suppressed when `quiet` is set. Processing
/// failures print their cause chain and backtrace, when there is one, before
/// the message.
#[must_use]
#[inline]
pub fn report(system: &dyn System, result: Result<(), TransformError>, quiet: bool) -> i32 {
    let err = match result {
        Ok(()) => {
            debug!("Transform completed");
            return EXIT_SUCCESS;
        }
        Err(err) => err,
    };
    let code = err.exit_code();
    debug!("Transform failed with exit code {code}: {err}");

    match err {
        TransformError::Usage(ref clap_err) => {
            let rendered = clap_err.render().to_string();
            if clap_err.use_stderr() {
                emit(&mut system.stderr(), &rendered);
            } else {
                emit(&mut system.stdout(), &rendered);
            }
        }
        TransformError::Hook(ref cause) => {
            emit(&mut system.stderr(), &format!("{cause}\n"));
        }
        _ if quiet => {}
        TransformError::Processing(ref cause) => {
            let mut stderr = system.stderr();
            if has_trace(cause) {
                emit(&mut stderr, &format!("{cause:?}\n"));
            }
            emit(&mut stderr, &format!("{err}\n"));
        }
        _ => {
            emit(&mut system.stderr(), &format!("{err}\n"));
        }
    }

    code
}

fn has_trace(cause: &anyhow::Error) -> bool {
    cause.chain().nth(1).is_some()
        || cause.backtrace().status() == std::backtrace::BacktraceStatus::Captured
}

fn emit(writer: &mut dyn Write, text: &str) {
    if let Err(e) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
        warn!("Failed to write error message: {e}");
    }
}
