//! `filexform` - entry points for programs that turn one file into another
//!
//! A program built on this library accepts
//!
//! ```text
//! prog [-i input_file] [-o output_file] [-q]
//! prog input_file [output_file]
//! ```
//!
//! reading stdin and writing stdout when no file is named. The caller
//! supplies the transform; the library resolves the streams, opens them in
//! the right mode and turns failures into exit codes: 1 for conflicting
//! arguments, 2 for files that cannot be opened, 3 when the transform fails.
//!
//! ```no_run
//! use filexform::{Dumper, Loader, Payload, Processor, TransformerOptions};
//!
//! let upcase = Processor::new(|payload: Payload, _| match payload {
//!     Payload::Text(text) => Ok(Payload::Text(text.to_uppercase())),
//!     other => Ok(other),
//! });
//! std::process::exit(filexform::run(
//!     upcase,
//!     Loader::read_all(),
//!     Dumper::write_all(),
//!     TransformerOptions::new(),
//! ));
//! ```

pub mod cli;
pub mod contract;
pub mod convert;
pub mod error;
pub mod formats;
pub mod stream;
pub mod system;
pub mod transform;

pub use cli::{Invocation, TransformerOptions};
pub use contract::{Dumper, Loader, Processor, StreamProcessor};
pub use error::TransformError;
pub use formats::{Format, json_io, json_io_pretty, yaml_io};
pub use stream::{InputStream, OutputStream, Payload, StreamMode};
pub use transform::{Transformer, report};

use system::{RealSystem, System};

/// Buffered mode on the real process: load, process, dump, return the exit code
#[must_use]
#[inline]
pub fn run<T, U>(
    processor: Processor<'_, T, U>,
    loader: Loader<'_, T>,
    dumper: Dumper<'_, U>,
    options: TransformerOptions<'_>,
) -> i32 {
    run_on(&RealSystem, processor, loader, dumper, options)
}

/// Buffered mode against an explicit [`System`]
#[must_use]
#[inline]
pub fn run_on<T, U>(
    system: &dyn System,
    processor: Processor<'_, T, U>,
    loader: Loader<'_, T>,
    dumper: Dumper<'_, U>,
    options: TransformerOptions<'_>,
) -> i32 {
    let quiet = options.quiet;
    match Transformer::new(system, options) {
        Ok(transformer) => {
            let result = transformer.run(processor, loader, dumper);
            transformer.finish(result)
        }
        Err(err) => report(system, Err(err), quiet),
    }
}

/// Streaming mode on the real process: the processor gets both open streams
#[must_use]
#[inline]
pub fn run_streaming(processor: StreamProcessor<'_>, options: TransformerOptions<'_>) -> i32 {
    run_streaming_on(&RealSystem, processor, options)
}

/// Streaming mode against an explicit [`System`]
#[must_use]
#[inline]
pub fn run_streaming_on(
    system: &dyn System,
    processor: StreamProcessor<'_>,
    options: TransformerOptions<'_>,
) -> i32 {
    let quiet = options.quiet;
    match Transformer::new(system, options) {
        Ok(transformer) => {
            let result = transformer.stream(processor);
            transformer.finish(result)
        }
        Err(err) => report(system, Err(err), quiet),
    }
}
