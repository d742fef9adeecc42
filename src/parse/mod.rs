//! Incremental parsing of a streamed `{"points":[...]}` document.
//!
//! - [`repair`]: closes a truncated JSON prefix
//! - [`extract`]: direct parse, then repair, then candidate filtering
//! - [`StreamAccumulator`]: owns the raw buffer for one session

pub mod accumulator;
pub mod extract;
pub mod repair;

pub use accumulator::{AccumulatorState, AccumulatorStats, StreamAccumulator};
pub use extract::{Extraction, candidates, extract, extract_with_outcome};
pub use repair::repair;
