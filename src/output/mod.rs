//! Output module
//!
//! Renders run results for the console and writes the structured dump.

mod formatter;
mod sink;

pub use formatter::{OutputFormat, ResultFormatter};
pub use sink::{sinks_for, ConsoleSink, JsonFileSink, ResultSink, StoredRun};
