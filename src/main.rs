//! # `filexform`
//!
//! Converts a document between JSON and YAML, reading a file or stdin and
//! writing a file or stdout.
//!
//! ## Usage
//!
//! ```sh
//! filexform --from yaml --to json config.yaml config.json
//! curl -s https://example.com/data.json | filexform --to yaml --select /items
//! filexform -i data.json -o data.yaml --to yaml
//! ```
//!
//! Exit codes: 0 success, 1 conflicting arguments or an invalid
//! `FILEXFORM_DEFAULT_MODE`, 2 file could not be opened, 3 the document could
//! not be converted.
//!
//! Set `RUST_LOG=debug` to trace how the streams were resolved. Logs go to
//! stderr so they never mix with the converted output.

use filexform::cli::TransformerOptions;
use filexform::convert::run_conversion;
use filexform::system::real::RealSystem;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let system = RealSystem::new();
    let options = TransformerOptions::from_env(&system);

    std::process::exit(run_conversion(&system, options));
}
