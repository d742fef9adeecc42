//! One extraction request, from first chunk to final snapshot.
//!
//! An [`ExtractionSession`] owns everything a request needs: the raw
//! buffer, the ratchet, the throttle slot and the consumer. Sessions share
//! nothing, so any number of them can run side by side.
//!
//! ```text
//! chunk ─► StreamAccumulator ─► PointMerger ─► Throttle ─► SnapshotSink
//!                                                  ▲
//!                          finalize ── unthrottled ┘
//! ```

pub mod config;
pub mod driver;
pub mod sink;

pub use config::{SessionConfig, THROTTLE_ENV};
pub use driver::{drive, sleep_until_deadline};
pub use sink::{CollectingSink, SnapshotSink};

use crate::core::{Point, point_key};
use crate::error::{ExtractionError, Result};
use crate::merge::{PointMerger, Throttle};
use crate::parse::{AccumulatorStats, StreamAccumulator};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting chunks.
    Streaming,
    /// Final snapshot delivered.
    Finalized,
    /// Torn down; nothing more is emitted.
    Cancelled,
}

/// Why a session is being finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The stream ended normally.
    Completed,
    /// The reader was asked to stop early.
    Aborted,
    /// The stream failed; whatever arrived is still extracted.
    UpstreamError,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::UpstreamError => "upstream error",
        })
    }
}

/// Per-request streaming extraction state.
///
/// # Examples
///
/// ```
/// use pointstream::session::{CollectingSink, ExtractionSession, FinishReason};
/// use std::time::Instant;
///
/// let mut session = ExtractionSession::new(CollectingSink::new());
/// session.feed(r#"{"points":[{"content":"Do X","category":"action"}]}"#, Instant::now());
/// let points = session.finalize(FinishReason::Completed).unwrap();
/// assert_eq!(points.len(), 1);
/// assert_eq!(session.sink().final_snapshot.as_ref(), Some(&points));
/// ```
#[derive(Debug)]
pub struct ExtractionSession<S> {
    config: SessionConfig,
    accumulator: StreamAccumulator,
    merger: PointMerger,
    throttle: Throttle<Vec<Point>>,
    sink: S,
    state: SessionState,
    emitted: usize,
}

impl<S: SnapshotSink> ExtractionSession<S> {
    /// Creates a session with the default configuration.
    pub fn new(sink: S) -> Self {
        Self::build(SessionConfig::default(), sink)
    }

    /// Creates a session with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_config(config: SessionConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, sink))
    }

    fn build(config: SessionConfig, sink: S) -> Self {
        Self {
            config,
            accumulator: StreamAccumulator::new(),
            merger: PointMerger::new(),
            throttle: Throttle::new(config.throttle),
            sink,
            state: SessionState::Streaming,
            emitted: 0,
        }
    }

    /// Feeds one decoded chunk.
    ///
    /// Returns true when the visible point set changed. A change schedules
    /// a throttled push; a due push is released first.
    pub fn feed(&mut self, chunk: &str, now: Instant) -> bool {
        if self.state != SessionState::Streaming {
            debug!(state = ?self.state, "chunk ignored");
            return false;
        }
        let candidates = self.accumulator.feed(chunk);
        self.offer(candidates, now)
    }

    /// Offers an already-extracted candidate list.
    ///
    /// This is the merge half of [`feed`](Self::feed), for callers that run
    /// their own tokenizer over the stream.
    pub fn offer(&mut self, candidates: Vec<Point>, now: Instant) -> bool {
        if self.state != SessionState::Streaming {
            return false;
        }
        self.poll(now);

        let changed = self.merger.update(candidates);
        if changed && !self.merger.is_empty() {
            self.throttle.schedule(self.merger.snapshot(), now);
        }
        changed
    }

    /// Releases the pending snapshot if its window has elapsed.
    ///
    /// Returns true when a snapshot was delivered.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Streaming {
            return false;
        }
        match self.throttle.poll(now) {
            Some(points) => {
                debug!(count = points.len(), "snapshot emitted");
                self.emitted += 1;
                self.sink.on_snapshot(points);
                true
            }
            None => false,
        }
    }

    /// Ends the session and delivers the final snapshot.
    ///
    /// The pending throttle window is dropped, one last extraction runs over
    /// the whole buffer, and the best list is handed to the sink without
    /// delay. Calling this again returns the same result without emitting.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::NoInsights`] when the final list is empty, and
    /// [`ExtractionError::Cancelled`] after [`cancel`](Self::cancel).
    pub fn finalize(&mut self, reason: FinishReason) -> Result<Vec<Point>> {
        match self.state {
            SessionState::Cancelled => return Err(ExtractionError::Cancelled.into()),
            SessionState::Finalized => return self.final_result(),
            SessionState::Streaming => {}
        }

        self.throttle.cancel();
        let candidates = self.accumulator.finish();
        self.merger.update(candidates);
        self.state = SessionState::Finalized;

        let points = self.merger.snapshot();
        let stats = self.accumulator.stats();
        info!(
            %reason,
            points = points.len(),
            snapshots = self.emitted,
            chunks = stats.chunks,
            bytes = stats.bytes,
            "extraction finalized"
        );
        self.sink.on_final(points);

        if self.merger.is_empty() {
            warn!(%reason, "stream produced no valid points");
        }
        self.final_result()
    }

    fn final_result(&self) -> Result<Vec<Point>> {
        if self.merger.is_empty() {
            Err(ExtractionError::NoInsights.into())
        } else {
            Ok(self.merger.snapshot())
        }
    }

    /// Tears the session down; no further snapshots are emitted.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Streaming {
            debug!("session cancelled");
            self.throttle.cancel();
            self.state = SessionState::Cancelled;
        }
    }

    /// Deadline of the pending snapshot, if one is buffered.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.throttle.next_deadline()
    }

    /// Current best point list.
    #[must_use]
    pub fn best(&self) -> &[Point] {
        self.merger.best()
    }

    /// Render keys for the current best list, in order.
    ///
    /// Keys stay stable while a point's content grows past the configured
    /// prefix, so a UI can update rows in place.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.merger
            .best()
            .iter()
            .enumerate()
            .map(|(i, p)| point_key(p, i, self.config.key_prefix_len))
            .collect()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of intermediate snapshots delivered.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    /// Accumulator counters.
    #[must_use]
    pub const fn stats(&self) -> AccumulatorStats {
        self.accumulator.stats()
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrows the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the session, returning its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
