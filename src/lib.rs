//! # pointstream
//!
//! Incremental partial-JSON stream parsing for AI-extracted video insights.
//!
//! A model streams a `{"points":[...]}` document a few bytes at a time.
//! pointstream turns that stream into a series of stable snapshots: every
//! chunk is re-parsed (repairing the truncated tail), the resulting list only
//! ever grows, and consumers hear about it at most once per throttle window,
//! followed by one authoritative final list.
//!
//! ## Features
//!
//! - **Repair**: closes any truncated JSON prefix into a parseable document
//! - **Ratchet merge**: snapshots never shrink when a re-parse backtracks
//! - **Throttle**: a single pending slot with an explicit deadline
//! - **Async driver**: `tokio` loop over a byte stream with cancellation
//!
//! ## Example
//!
//! ```
//! use pointstream::session::{CollectingSink, ExtractionSession, FinishReason};
//! use std::time::Instant;
//!
//! let mut session = ExtractionSession::new(CollectingSink::new());
//! let now = Instant::now();
//! session.feed(r#"{"points":[{"content":"Write tests first","#, now);
//! session.feed(r#""category":"action"},{"content":"Tes"#, now);
//!
//! let points = session.finalize(FinishReason::Completed).unwrap();
//! assert_eq!(points.len(), 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod merge;
pub mod parse;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Category, Point, PointGroups, SavePayload, VideoRef};

// Re-export the streaming pipeline
pub use merge::{PointMerger, Throttle};
pub use parse::{StreamAccumulator, extract, repair};
pub use session::{
    CollectingSink, ExtractionSession, FinishReason, SessionConfig, SessionState, SnapshotSink,
    drive,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
