//! Processing contracts
//!
//! A processing function is a boxed `FnOnce` bundled with an optional
//! capability flag stating which [`StreamMode`] it needs. The transformer
//! reads the flags to decide how each stream is opened; it never inspects
//! the functions themselves.

use crate::cli::Invocation;
use crate::stream::{InputStream, OutputStream, Payload, StreamMode};
use anyhow::Result;

type LoadFn<'f, T> = Box<dyn for<'s> FnOnce(&mut InputStream<'s>, &Invocation) -> Result<T> + 'f>;
type ProcessFn<'f, T, U> = Box<dyn FnOnce(T, &Invocation) -> Result<U> + 'f>;
type DumpFn<'f, U> =
    Box<dyn for<'s> FnOnce(U, &mut OutputStream<'s>, &Invocation) -> Result<()> + 'f>;
type StreamFn<'f> = Box<
    dyn for<'i, 'o> FnOnce(&mut InputStream<'i>, &mut OutputStream<'o>, &Invocation) -> Result<()>
        + 'f,
>;

/// Turns the raw input stream into the value handed to a [`Processor`]
pub struct Loader<'f, T> {
    func: LoadFn<'f, T>,
    mode: Option<StreamMode>,
}

impl<'f, T> Loader<'f, T> {
    #[inline]
    pub fn new<F>(func: F) -> Self
    where
        F: for<'s> FnOnce(&mut InputStream<'s>, &Invocation) -> Result<T> + 'f,
    {
        Self {
            func: Box::new(func),
            mode: None,
        }
    }

    /// Require the input stream to be opened in `mode`
    #[must_use]
    #[inline]
    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    #[inline]
    pub fn binary(self) -> Self {
        self.with_mode(StreamMode::Binary)
    }

    #[must_use]
    #[inline]
    pub fn text(self) -> Self {
        self.with_mode(StreamMode::Text)
    }

    /// Capability flag, if one was declared
    #[must_use]
    #[inline]
    pub const fn mode(&self) -> Option<StreamMode> {
        self.mode
    }

    pub(crate) fn call(self, input: &mut InputStream<'_>, invocation: &Invocation) -> Result<T> {
        (self.func)(input, invocation)
    }
}

impl<'f> Loader<'f, Payload> {
    /// Read the whole stream as one [`Payload`], in whatever mode it was opened
    #[must_use]
    #[inline]
    pub fn read_all() -> Self {
        Self::new(|input, _| input.read_payload())
    }
}

/// The caller's transform in buffered mode: value in, value out
pub struct Processor<'f, T, U> {
    func: ProcessFn<'f, T, U>,
    mode: Option<StreamMode>,
}

impl<'f, T, U> Processor<'f, T, U> {
    #[inline]
    pub fn new<F>(func: F) -> Self
    where
        F: FnOnce(T, &Invocation) -> Result<U> + 'f,
    {
        Self {
            func: Box::new(func),
            mode: None,
        }
    }

    /// Require both streams to be opened in `mode`, unless the loader or
    /// dumper declares its own
    #[must_use]
    #[inline]
    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    #[inline]
    pub fn binary(self) -> Self {
        self.with_mode(StreamMode::Binary)
    }

    #[must_use]
    #[inline]
    pub fn text(self) -> Self {
        self.with_mode(StreamMode::Text)
    }

    #[must_use]
    #[inline]
    pub const fn mode(&self) -> Option<StreamMode> {
        self.mode
    }

    pub(crate) fn call(self, value: T, invocation: &Invocation) -> Result<U> {
        (self.func)(value, invocation)
    }
}

/// Writes the processor's result onto the output stream
pub struct Dumper<'f, U> {
    func: DumpFn<'f, U>,
    mode: Option<StreamMode>,
}

impl<'f, U> Dumper<'f, U> {
    #[inline]
    pub fn new<F>(func: F) -> Self
    where
        F: for<'s> FnOnce(U, &mut OutputStream<'s>, &Invocation) -> Result<()> + 'f,
    {
        Self {
            func: Box::new(func),
            mode: None,
        }
    }

    /// Require the output stream to be opened in `mode`
    #[must_use]
    #[inline]
    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    #[inline]
    pub fn binary(self) -> Self {
        self.with_mode(StreamMode::Binary)
    }

    #[must_use]
    #[inline]
    pub fn text(self) -> Self {
        self.with_mode(StreamMode::Text)
    }

    #[must_use]
    #[inline]
    pub const fn mode(&self) -> Option<StreamMode> {
        self.mode
    }

    pub(crate) fn call(
        self,
        value: U,
        output: &mut OutputStream<'_>,
        invocation: &Invocation,
    ) -> Result<()> {
        (self.func)(value, output, invocation)
    }
}

impl<'f> Dumper<'f, Payload> {
    /// Write the payload as-is
    #[must_use]
    #[inline]
    pub fn write_all() -> Self {
        Self::new(|payload: Payload, output, _| output.write_payload(&payload))
    }
}

/// The caller's transform in streaming mode: it reads and writes the streams itself
pub struct StreamProcessor<'f> {
    func: StreamFn<'f>,
    mode: Option<StreamMode>,
}

impl<'f> StreamProcessor<'f> {
    #[inline]
    pub fn new<F>(func: F) -> Self
    where
        F: for<'i, 'o> FnOnce(&mut InputStream<'i>, &mut OutputStream<'o>, &Invocation) -> Result<()>
            + 'f,
    {
        Self {
            func: Box::new(func),
            mode: None,
        }
    }

    #[must_use]
    #[inline]
    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    #[inline]
    pub fn binary(self) -> Self {
        self.with_mode(StreamMode::Binary)
    }

    #[must_use]
    #[inline]
    pub fn text(self) -> Self {
        self.with_mode(StreamMode::Text)
    }

    #[must_use]
    #[inline]
    pub const fn mode(&self) -> Option<StreamMode> {
        self.mode
    }

    pub(crate) fn call(
        self,
        input: &mut InputStream<'_>,
        output: &mut OutputStream<'_>,
        invocation: &Invocation,
    ) -> Result<()> {
        (self.func)(input, output, invocation)
    }
}

/// Explicit per-call mode choices, checked before any capability flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeOverrides {
    pub input: Option<StreamMode>,
    pub output: Option<StreamMode>,
}

/// Modes the two streams will be opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamModes {
    pub input: StreamMode,
    pub output: StreamMode,
}

impl StreamModes {
    /// Resolve each side independently: override, then the side's own
    /// function flag, then the processor's flag, then `default`
    #[must_use]
    #[inline]
    pub fn resolve(
        default: StreamMode,
        overrides: ModeOverrides,
        processor: Option<StreamMode>,
        loader: Option<StreamMode>,
        dumper: Option<StreamMode>,
    ) -> Self {
        Self {
            input: overrides
                .input
                .or(loader)
                .or(processor)
                .unwrap_or(default),
            output: overrides
                .output
                .or(dumper)
                .or(processor)
                .unwrap_or(default),
        }
    }
}
