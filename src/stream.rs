//! Stream bindings: where bytes come from, where they go, and in which mode

use core::fmt;
use core::str::FromStr;

use crate::error::TransformError;
use crate::system::System;
use anyhow::{Context as _, Result, bail};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use tracing::debug;

/// How a stream is read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum StreamMode {
    /// UTF-8 text
    #[default]
    Text,
    /// Raw bytes
    Binary,
}

impl FromStr for StreamMode {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "binary" => Ok(Self::Binary),
            _ => Err(format!("Invalid stream mode: {s}. Use 'text' or 'binary'")),
        }
    }
}

impl fmt::Display for StreamMode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Text => f.write_str("text"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

/// Resolved input side of a stream binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    Stdin,
    File(PathBuf),
}

/// Resolved output side of a stream binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSink {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for StreamSource {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(ref path) => write!(f, "{}", path.display()),
        }
    }
}

impl fmt::Display for StreamSink {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(ref path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whole-stream value used by the default loader and dumper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match *self {
            Self::Text(ref text) => text.as_bytes(),
            Self::Binary(ref bytes) => bytes,
        }
    }
}

impl From<String> for Payload {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for Payload {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// An opened input stream
///
/// Dropping it closes the underlying file.
pub struct InputStream<'a> {
    source: StreamSource,
    mode: StreamMode,
    reader: Box<dyn BufRead + 'a>,
}

impl<'a> InputStream<'a> {
    /// Open `source` through `system`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FileOpen`] if a named file cannot be opened
    #[inline]
    pub fn open(
        system: &'a dyn System,
        source: StreamSource,
        mode: StreamMode,
    ) -> Result<Self, TransformError> {
        let reader = match source {
            StreamSource::Stdin => system.stdin(),
            StreamSource::File(ref path) => system
                .open(path)
                .map_err(|e| TransformError::file_open(path.clone(), e))?,
        };
        debug!("Opened input {source} in {mode} mode");
        Ok(Self {
            source,
            mode,
            reader,
        })
    }

    /// Wrap an arbitrary reader, mostly useful for tests
    #[inline]
    pub fn from_reader<R: BufRead + 'a>(reader: R, mode: StreamMode) -> Self {
        Self {
            source: StreamSource::Stdin,
            mode,
            reader: Box::new(reader),
        }
    }

    #[must_use]
    #[inline]
    pub const fn source(&self) -> &StreamSource {
        &self.source
    }

    #[must_use]
    #[inline]
    pub const fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Read the rest of the stream as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the bytes are not valid UTF-8
    #[inline]
    pub fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        self.reader
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read text from {}", self.source))?;
        Ok(text)
    }

    /// Read the rest of the stream as raw bytes
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails
    #[inline]
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read from {}", self.source))?;
        Ok(bytes)
    }

    /// Read the rest of the stream in this stream's mode
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, or in text mode if the bytes are not valid UTF-8
    #[inline]
    pub fn read_payload(&mut self) -> Result<Payload> {
        match self.mode {
            StreamMode::Text => self.read_text().map(Payload::Text),
            StreamMode::Binary => self.read_bytes().map(Payload::Binary),
        }
    }
}

impl Read for InputStream<'_> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for InputStream<'_> {
    #[inline]
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    #[inline]
    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt);
    }
}

/// An opened output stream
///
/// Dropping it closes the underlying file; call [`OutputStream::finish`] to
/// surface flush errors instead of losing them in the drop.
pub struct OutputStream<'a> {
    sink: StreamSink,
    mode: StreamMode,
    writer: Box<dyn Write + 'a>,
}

impl<'a> OutputStream<'a> {
    /// Open `sink` through `system`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::FileOpen`] if a named file cannot be created
    #[inline]
    pub fn open(
        system: &'a dyn System,
        sink: StreamSink,
        mode: StreamMode,
    ) -> Result<Self, TransformError> {
        let writer = match sink {
            StreamSink::Stdout => system.stdout(),
            StreamSink::File(ref path) => system
                .create(path)
                .map_err(|e| TransformError::file_open(path.clone(), e))?,
        };
        debug!("Opened output {sink} in {mode} mode");
        Ok(Self { sink, mode, writer })
    }

    /// Wrap an arbitrary writer, mostly useful for tests
    #[inline]
    pub fn from_writer<W: Write + 'a>(writer: W, mode: StreamMode) -> Self {
        Self {
            sink: StreamSink::Stdout,
            mode,
            writer: Box::new(writer),
        }
    }

    #[must_use]
    #[inline]
    pub const fn sink(&self) -> &StreamSink {
        &self.sink
    }

    #[must_use]
    #[inline]
    pub const fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Write a payload
    ///
    /// A text-mode stream only accepts bytes that are valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or a binary payload is not valid
    /// UTF-8 on a text-mode stream
    #[inline]
    pub fn write_payload(&mut self, payload: &Payload) -> Result<()> {
        if let (StreamMode::Text, &Payload::Binary(ref bytes)) = (self.mode, payload)
            && core::str::from_utf8(bytes).is_err()
        {
            bail!(
                "Cannot write binary data to {} opened in text mode",
                self.sink
            );
        }
        self.writer
            .write_all(payload.as_bytes())
            .with_context(|| format!("Failed to write to {}", self.sink))
    }

    /// Flush and close the stream
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails
    #[inline]
    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.sink))
    }
}

impl Write for OutputStream<'_> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
