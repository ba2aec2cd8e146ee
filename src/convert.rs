//! JSON/YAML conversion, the processing behind the `filexform` binary
//!
//! The extra flags are registered by a pre-parse hook and resolved by a
//! post-parse hook, which stores the effective formats as invocation extras
//! for the loader and dumper to read.

use crate::cli::{Invocation, TransformerOptions};
use crate::contract::{Dumper, Loader, Processor};
use crate::formats::Format;
use crate::system::System;
use anyhow::{Result, anyhow, bail};
use clap::{Arg, ArgAction, Command, value_parser};
use serde_json::Value;

pub const FROM: &str = "from";
pub const TO: &str = "to";
pub const PRETTY: &str = "pretty";
pub const SELECT: &str = "select";

/// Parser for the binary, before the standard transformer arguments are added
#[must_use]
#[inline]
pub fn base_command() -> Command {
    Command::new("filexform")
        .about("Convert a document between JSON and YAML")
        .version(env!("CARGO_PKG_VERSION"))
}

/// Register the conversion flags
#[must_use]
#[inline]
pub fn conversion_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(FROM)
                .long("from")
                .value_name("FORMAT")
                .value_parser(value_parser!(Format))
                .default_value("json")
                .help("Format of the input"),
        )
        .arg(
            Arg::new(TO)
                .long("to")
                .value_name("FORMAT")
                .value_parser(value_parser!(Format))
                .help("Format of the output [default: same as --from]"),
        )
        .arg(
            Arg::new(PRETTY)
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Indent JSON output"),
        )
        .arg(
            Arg::new(SELECT)
                .long("select")
                .value_name("POINTER")
                .help("Only output the value at this JSON pointer (e.g. /items/0)"),
        )
}

/// Resolve the effective formats and check the pointer syntax
///
/// # Errors
///
/// Returns an error if `--select` is not a JSON pointer
#[inline]
pub fn resolve_conversion(_command: &Command, invocation: &mut Invocation) -> Result<()> {
    let from = invocation
        .matches()
        .try_get_one::<Format>(FROM)?
        .copied()
        .unwrap_or(Format::Json);
    let to = invocation
        .matches()
        .try_get_one::<Format>(TO)?
        .copied()
        .unwrap_or(from);

    if let Some(pointer) = invocation.matches().try_get_one::<String>(SELECT)?
        && !pointer.is_empty()
        && !pointer.starts_with('/')
    {
        bail!("--select must be a JSON pointer starting with '/', got '{pointer}'");
    }

    invocation.insert_extra(FROM, Value::String(from.to_string()));
    invocation.insert_extra(TO, Value::String(to.to_string()));
    Ok(())
}

/// Add the binary's parser and hooks to `options`
#[must_use]
#[inline]
pub fn configure(options: TransformerOptions<'_>) -> TransformerOptions<'_> {
    options
        .parser(base_command())
        .pre_parse_hook(conversion_args)
        .post_parse_hook(resolve_conversion)
}

fn format_extra(invocation: &Invocation, key: &str) -> Result<Format> {
    let name = invocation
        .extra(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("No {key} format resolved"))?;
    name.parse::<Format>().map_err(|e| anyhow!(e))
}

/// Load the input in the `--from` format
#[must_use]
#[inline]
pub fn loader<'f>() -> Loader<'f, Value> {
    Loader::new(|input, invocation| format_extra(invocation, FROM)?.load(input))
}

/// Apply `--select`, if given
#[must_use]
#[inline]
pub fn processor<'f>() -> Processor<'f, Value, Value> {
    Processor::new(|value: Value, invocation| {
        match invocation.matches().try_get_one::<String>(SELECT)? {
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("Nothing found at {pointer}")),
            None => Ok(value),
        }
    })
}

/// Dump the result in the `--to` format
#[must_use]
#[inline]
pub fn dumper<'f>() -> Dumper<'f, Value> {
    Dumper::new(|value: Value, output, invocation| {
        let pretty = matches!(
            invocation.matches().try_get_one::<bool>(PRETTY),
            Ok(Some(true))
        );
        format_extra(invocation, TO)?.dump(&value, output, pretty)
    })
}

/// Run a conversion and return the exit code
#[must_use]
#[inline]
pub fn run_conversion(system: &dyn System, options: TransformerOptions<'_>) -> i32 {
    crate::run_on(system, processor(), loader(), dumper(), configure(options))
}
