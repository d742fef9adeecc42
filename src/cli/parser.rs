//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::session::THROTTLE_ENV;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pointstream: turn a streaming model response into stable point snapshots.
///
/// Replays a recorded response as a chunked byte stream, printing throttled
/// snapshots as points appear and the grouped final list at the end.
#[derive(Parser, Debug)]
#[command(name = "pointstream")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a recorded response through an extraction session.
    Extract {
        /// Path to the response text (`-` for stdin).
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Chunk size in bytes.
        #[arg(short, long, default_value = "16")]
        chunk_size: usize,

        /// Pause between chunks, in milliseconds.
        #[arg(short, long, default_value = "0")]
        delay_ms: u64,

        /// Minimum interval between snapshots, in milliseconds.
        #[arg(short, long, env = THROTTLE_ENV, default_value = "150")]
        throttle_ms: u64,

        /// Write the save payload for the final points to this path.
        #[arg(short, long, requires = "url")]
        save: Option<PathBuf>,

        /// Video URL the response was produced for.
        #[arg(short, long)]
        url: Option<String>,

        /// Video title stored with the save payload.
        #[arg(long, default_value = "Untitled video")]
        title: String,
    },

    /// Repair a truncated JSON document and print the result.
    Repair {
        /// Path to the document (`-` for stdin).
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Show the id, watch URL and thumbnail of a YouTube URL.
    Video {
        /// YouTube URL or bare video id.
        url: String,
    },
}
