//! Raw buffer accumulation for one streaming session.

use crate::core::Point;
use crate::parse::extract::{Extraction, extract_with_outcome};
use serde::Serialize;
use tracing::{debug, trace};

/// Accumulator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccumulatorState {
    /// Chunks are still arriving.
    Accumulating,
    /// The stream ended or was aborted; the buffer is frozen.
    Finalized,
}

/// Counters describing how extraction went so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccumulatorStats {
    /// Chunks appended.
    pub chunks: usize,
    /// Bytes appended.
    pub bytes: usize,
    /// Steps where the raw buffer parsed directly.
    pub direct_parses: usize,
    /// Steps that needed [`crate::parse::repair`].
    pub repaired_parses: usize,
    /// Steps that produced no `points` array at all.
    pub misses: usize,
}

/// Owns the growing text buffer and turns it into candidates on each chunk.
///
/// The buffer is append-only and only ever read as a whole: every chunk
/// triggers a full re-parse, which is cheap at the tens-of-kilobytes sizes a
/// model response reaches.
///
/// # Examples
///
/// ```
/// use pointstream::parse::StreamAccumulator;
///
/// let mut acc = StreamAccumulator::new();
/// assert!(acc.feed(r#"{"points":[{"content":"Do X","#).is_empty());
/// let points = acc.feed(r#""category":"action"}"#);
/// assert_eq!(points.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StreamAccumulator {
    buffer: String,
    state: AccumulatorState,
    stats: AccumulatorStats,
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            state: AccumulatorState::Accumulating,
            stats: AccumulatorStats {
                chunks: 0,
                bytes: 0,
                direct_parses: 0,
                repaired_parses: 0,
                misses: 0,
            },
        }
    }

    /// Appends a chunk and extracts the current candidates.
    ///
    /// Never fails: an unparseable buffer just yields an empty list for this
    /// step. Chunks arriving after [`finish`](Self::finish) are ignored.
    pub fn feed(&mut self, chunk: &str) -> Vec<Point> {
        if self.state == AccumulatorState::Finalized {
            debug!(len = chunk.len(), "chunk after finalize ignored");
            return Vec::new();
        }
        self.buffer.push_str(chunk);
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len();
        self.extract_step()
    }

    /// Freezes the buffer and runs the last extraction over all of it.
    ///
    /// Safe to call more than once; later calls re-extract the same frozen
    /// buffer and return the same list.
    pub fn finish(&mut self) -> Vec<Point> {
        if self.state == AccumulatorState::Accumulating {
            self.state = AccumulatorState::Finalized;
            debug!(
                bytes = self.stats.bytes,
                chunks = self.stats.chunks,
                "accumulator finalized"
            );
        }
        self.extract_step()
    }

    fn extract_step(&mut self) -> Vec<Point> {
        let outcome = extract_with_outcome(&self.buffer);
        match &outcome {
            Extraction::Direct(points) => {
                self.stats.direct_parses += 1;
                trace!(count = points.len(), "direct parse");
            }
            Extraction::Repaired(points) => {
                self.stats.repaired_parses += 1;
                trace!(count = points.len(), "repaired parse");
            }
            Extraction::Unparsed => {
                self.stats.misses += 1;
                trace!(bytes = self.buffer.len(), "buffer not parseable yet");
            }
        }
        outcome.into_points()
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Returns extraction counters.
    #[must_use]
    pub const fn stats(&self) -> AccumulatorStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    const DOC: &str = r#"{"points":[{"content":"Do X","category":"action","timestamp":5},{"content":"Y","category":"remember"}]}"#;

    #[test]
    fn test_feed_grows_candidates() {
        let mut acc = StreamAccumulator::new();
        let (first, second) = DOC.split_at(60);
        let early = acc.feed(first);
        let late = acc.feed(second);
        assert!(early.len() <= late.len());
        assert_eq!(late.len(), 2);
        assert_eq!(acc.buffer(), DOC);
        assert_eq!(acc.stats().chunks, 2);
        assert_eq!(acc.stats().bytes, DOC.len());
    }

    #[test]
    fn test_failed_step_does_not_mutate_state() {
        let mut acc = StreamAccumulator::new();
        assert!(acc.feed("not json at all").is_empty());
        assert_eq!(acc.stats().misses, 1);
        assert_eq!(acc.state(), AccumulatorState::Accumulating);
    }

    #[test]
    fn test_stats_track_paths() {
        let mut acc = StreamAccumulator::new();
        acc.feed(r#"{"points":[{"content":"a","category":"insight"}"#);
        acc.feed("]}");
        let stats = acc.stats();
        assert_eq!(stats.repaired_parses, 1);
        assert_eq!(stats.direct_parses, 1);
    }

    #[test]
    fn test_misses_until_points_array_appears() {
        let mut acc = StreamAccumulator::new();
        assert!(acc.feed(r#"{"poi"#).is_empty());
        assert!(acc.feed(r#"nts":["#).is_empty());
        acc.finish();
        let stats = acc.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.repaired_parses, 2);
        assert_eq!(stats.direct_parses, 0);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut acc = StreamAccumulator::new();
        acc.feed(&DOC[..DOC.len() - 3]);
        let first = acc.finish();
        let second = acc.finish();
        assert_eq!(first, second);
        assert_eq!(acc.state(), AccumulatorState::Finalized);
    }

    #[test]
    fn test_feed_after_finish_ignored() {
        let mut acc = StreamAccumulator::new();
        acc.feed(DOC);
        acc.finish();
        assert!(acc.feed("garbage").is_empty());
        assert_eq!(acc.buffer(), DOC);
        assert_eq!(acc.finish().len(), 2);
    }

    #[test]
    fn test_finish_repairs_truncated_stream() {
        let mut acc = StreamAccumulator::new();
        acc.feed(r#"{"points":[{"content":"Only","category":"insight"},{"content":"Cut"#);
        let points = acc.finish();
        assert_eq!(points, vec![Point::new("Only", Category::Insight)]);
    }
}
