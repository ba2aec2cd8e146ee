//! JSON and YAML load/dump adapters

use core::fmt;
use core::str::FromStr;

use crate::contract::{Dumper, Loader};
use crate::stream::{InputStream, OutputStream, StreamMode};
use anyhow::{Context as _, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write as _;

/// Structured formats the adapters understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[non_exhaustive]
pub enum Format {
    Json,
    Yaml,
}

impl FromStr for Format {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Invalid format: {s}. Use 'json' or 'yaml'")),
        }
    }
}

impl fmt::Display for Format {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

impl Format {
    /// Stream mode the dumper for this format needs, if any
    ///
    /// YAML is produced as text; JSON works on either kind of stream.
    #[must_use]
    #[inline]
    pub const fn dump_mode(self) -> Option<StreamMode> {
        match self {
            Self::Json => None,
            Self::Yaml => Some(StreamMode::Text),
        }
    }

    /// Deserialize one document from the input stream
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid document for `T`
    #[inline]
    pub fn load<T: DeserializeOwned>(self, input: &mut InputStream<'_>) -> Result<T> {
        let source = input.source().clone();
        match self {
            Self::Json => serde_json::from_reader(input)
                .with_context(|| format!("Failed to parse JSON from {source}")),
            Self::Yaml => serde_yaml::from_reader(input)
                .with_context(|| format!("Failed to parse YAML from {source}")),
        }
    }

    /// Serialize `value` onto the output stream
    ///
    /// JSON output is terminated by a newline; `pretty` indents it. YAML is
    /// always block style.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized or the write fails
    #[inline]
    pub fn dump<T: Serialize>(
        self,
        value: &T,
        output: &mut OutputStream<'_>,
        pretty: bool,
    ) -> Result<()> {
        let sink = output.sink().clone();
        match self {
            Self::Json => {
                let written = if pretty {
                    serde_json::to_writer_pretty(&mut *output, value)
                } else {
                    serde_json::to_writer(&mut *output, value)
                };
                written.with_context(|| format!("Failed to write JSON to {sink}"))?;
                output
                    .write_all(b"\n")
                    .with_context(|| format!("Failed to write JSON to {sink}"))
            }
            Self::Yaml => serde_yaml::to_writer(&mut *output, value)
                .with_context(|| format!("Failed to write YAML to {sink}")),
        }
    }

    /// Loader/dumper pair for this format
    #[must_use]
    #[inline]
    pub fn io<'f, T>(self, pretty: bool) -> (Loader<'f, T>, Dumper<'f, T>)
    where
        T: DeserializeOwned + Serialize,
    {
        let loader = Loader::new(move |input, _| self.load(input));
        let dumper = Dumper::new(move |value: T, output, _| self.dump(&value, output, pretty));
        let dumper = match self.dump_mode() {
            Some(mode) => dumper.with_mode(mode),
            None => dumper,
        };
        (loader, dumper)
    }
}

/// Compact JSON loader/dumper pair
#[must_use]
#[inline]
pub fn json_io<'f, T>() -> (Loader<'f, T>, Dumper<'f, T>)
where
    T: DeserializeOwned + Serialize,
{
    Format::Json.io(false)
}

/// Indented JSON loader/dumper pair
#[must_use]
#[inline]
pub fn json_io_pretty<'f, T>() -> (Loader<'f, T>, Dumper<'f, T>)
where
    T: DeserializeOwned + Serialize,
{
    Format::Json.io(true)
}

/// YAML loader/dumper pair; the dumper requires a text-mode stream
#[must_use]
#[inline]
pub fn yaml_io<'f, T>() -> (Loader<'f, T>, Dumper<'f, T>)
where
    T: DeserializeOwned + Serialize,
{
    Format::Yaml.io(false)
}
