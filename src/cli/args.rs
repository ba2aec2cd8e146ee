use crate::error::TransformError;
use crate::stream::{StreamSink, StreamSource};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Argument id of the positional input/output paths
pub const FILES: &str = "files";
/// Argument id of `-i/--input`
pub const INPUT: &str = "input";
/// Argument id of `-o/--output`
pub const OUTPUT: &str = "output";
/// Argument id of `-q/--quiet`
pub const QUIET: &str = "quiet";

/// Register the standard transformer arguments on `command`
///
/// Caller-supplied parsers keep everything they already define; the
/// positional paths are only added when asked for.
#[must_use]
#[inline]
pub fn register_args(command: Command, positional_args: bool) -> Command {
    let command = command
        .arg(
            Arg::new(INPUT)
                .short('i')
                .long("input")
                .value_name("FILE")
                .value_parser(value_parser!(OsString))
                .help("Read input from FILE instead of stdin"),
        )
        .arg(
            Arg::new(OUTPUT)
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(OsString))
                .help("Write output to FILE instead of stdout"),
        )
        .arg(
            Arg::new(QUIET)
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress error messages"),
        );

    if positional_args {
        command.arg(
            Arg::new(FILES)
                .value_name("FILE")
                .num_args(0..)
                .value_parser(value_parser!(OsString))
                .help("Input file, optionally followed by output file"),
        )
    } else {
        command
    }
}

/// Separate the tokens `command` understands from the ones it doesn't
///
/// Options `command` defines are recognised wherever they appear, together
/// with their values. Bare tokens are kept for the parser only when
/// `positional_args` is set. Everything after `--` is unknown.
/// `command` must be built (see [`Command::build`]) so that `--help` and
/// `--version` are known as well.
#[must_use]
#[inline]
pub fn split_known_args<I>(
    command: &Command,
    args: I,
    positional_args: bool,
) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = OsString>,
{
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut args = args.into_iter();

    while let Some(token) = args.next() {
        let Some(text) = token.to_str() else {
            if positional_args {
                known.push(token);
            } else {
                unknown.push(token.to_string_lossy().into_owned());
            }
            continue;
        };

        if text == "--" {
            unknown.extend(args.by_ref().map(|arg| arg.to_string_lossy().into_owned()));
            break;
        }

        // Some(true) when the option's value is the next token
        let recognised = if let Some(long) = text.strip_prefix("--") {
            match long.split_once('=') {
                Some((name, _)) => find_long(command, name).map(|_| false),
                None => find_long(command, long).map(|arg| arg.get_action().takes_values()),
            }
        } else if let Some(shorts) = text.strip_prefix('-')
            && !shorts.is_empty()
        {
            short_cluster(command, shorts)
        } else {
            None
        };

        match recognised {
            Some(needs_value) => {
                known.push(token);
                if needs_value && let Some(value) = args.next() {
                    known.push(value);
                }
            }
            None if positional_args && (text == "-" || !text.starts_with('-')) => known.push(token),
            None => unknown.push(text.to_owned()),
        }
    }

    (known, unknown)
}

/// Whether every flag in `-abc` is known, and if so whether the last one
/// still needs the next token as its value
fn short_cluster(command: &Command, shorts: &str) -> Option<bool> {
    for (index, short) in shorts.char_indices() {
        let arg = find_short(command, short)?;
        if arg.get_action().takes_values() {
            return Some(index + short.len_utf8() == shorts.len());
        }
    }
    Some(false)
}

fn find_long<'c>(command: &'c Command, name: &str) -> Option<&'c Arg> {
    command.get_arguments().find(|arg| {
        arg.get_long() == Some(name)
            || arg
                .get_all_aliases()
                .is_some_and(|aliases| aliases.contains(&name))
    })
}

fn find_short(command: &Command, short: char) -> Option<&Arg> {
    command.get_arguments().find(|arg| {
        arg.get_short() == Some(short)
            || arg
                .get_all_short_aliases()
                .is_some_and(|aliases| aliases.contains(&short))
    })
}

fn non_empty_path(value: &OsString) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

/// Parsed invocation request
///
/// Built once from the command line. Only a post-parse hook gets to touch it
/// mutably; after that the transformer hands out shared references.
#[derive(Debug, Clone)]
pub struct Invocation {
    files: Vec<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    quiet: bool,
    remaining_args: Vec<String>,
    extras: BTreeMap<String, Value>,
    matches: ArgMatches,
}

impl Invocation {
    /// Extract the standard fields from parsed matches
    ///
    /// Ids that were never registered (positional paths turned off) read as
    /// empty, and so do empty path values. `remaining_args` are the tokens
    /// [`split_known_args`] set aside.
    #[must_use]
    #[inline]
    pub fn from_matches(matches: ArgMatches, remaining_args: Vec<String>) -> Self {
        let files = matches
            .try_get_many::<OsString>(FILES)
            .ok()
            .flatten()
            .map(|values| values.filter_map(non_empty_path).collect())
            .unwrap_or_default();
        let input = matches
            .try_get_one::<OsString>(INPUT)
            .ok()
            .flatten()
            .and_then(non_empty_path);
        let output = matches
            .try_get_one::<OsString>(OUTPUT)
            .ok()
            .flatten()
            .and_then(non_empty_path);
        let quiet = matches
            .try_get_one::<bool>(QUIET)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);

        Self {
            files,
            input,
            output,
            quiet,
            remaining_args,
            extras: BTreeMap::new(),
            matches,
        }
    }

    /// Positional paths, in command-line order
    #[must_use]
    #[inline]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path given with `-i/--input`
    #[must_use]
    #[inline]
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    /// Path given with `-o/--output`
    #[must_use]
    #[inline]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    #[must_use]
    #[inline]
    pub const fn quiet(&self) -> bool {
        self.quiet
    }

    /// Unrecognised tokens, when pass-through is enabled
    #[must_use]
    #[inline]
    pub fn remaining_args(&self) -> &[String] {
        &self.remaining_args
    }

    /// Raw matches, for flags a pre-parse hook added
    #[must_use]
    #[inline]
    pub const fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// Value a post-parse hook stored under `key`
    #[must_use]
    #[inline]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Store a derived value for the processing functions to read
    #[inline]
    pub fn insert_extra<K: Into<String>>(&mut self, key: K, value: Value) {
        self.extras.insert(key.into(), value);
    }

    /// Reject argument combinations that have no unambiguous meaning
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ArgumentConflict`] if:
    /// - Three or more positional paths were given
    /// - Positional paths were combined with `-i` or `-o`
    #[inline]
    pub fn validate(&self) -> Result<(), TransformError> {
        if self.files.len() >= 3 {
            return Err(TransformError::argument_conflict("Too many inputs!"));
        }
        if !self.files.is_empty() && (self.input.is_some() || self.output.is_some()) {
            return Err(TransformError::argument_conflict(
                "Can't specify both args and options",
            ));
        }
        Ok(())
    }

    /// Where input comes from: `-i`, then the first positional path, then stdin
    #[must_use]
    #[inline]
    pub fn input_source(&self) -> StreamSource {
        self.input
            .as_ref()
            .or_else(|| self.files.first())
            .map_or(StreamSource::Stdin, |path| StreamSource::File(path.clone()))
    }

    /// Where output goes: `-o`, then the second of exactly two positional paths, then stdout
    #[must_use]
    #[inline]
    pub fn output_sink(&self) -> StreamSink {
        if let Some(path) = self.output.as_ref() {
            return StreamSink::File(path.clone());
        }
        match self.files.as_slice() {
            [_, second] => StreamSink::File(second.clone()),
            _ => StreamSink::Stdout,
        }
    }
}
