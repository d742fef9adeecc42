//! CLI layer for pointstream.
//!
//! Provides the command-line interface using clap, with commands for
//! replaying recorded streams, repairing truncated JSON and inspecting
//! video URLs.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{ExtractOptions, WriterSink, execute, run_extract};
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
