//! High-watermark merge of candidate lists.

use crate::core::Point;

/// Keeps the best-known point list for a session.
///
/// Candidates are compared by length only and identified by position. A
/// list at least as long as the current best replaces it wholesale, which
/// also picks up in-place growth of the last point's text. A shorter list is
/// dropped entirely and never merged field by field, so a momentary parse
/// dip can not make rendered points disappear.
///
/// A model that genuinely rewrites an earlier point with a shorter list is
/// indistinguishable from one that is mid-retry; both lose to the ratchet.
///
/// # Examples
///
/// ```
/// use pointstream::core::{Category, Point};
/// use pointstream::merge::PointMerger;
///
/// let p = |s: &str| Point::new(s, Category::Action);
/// let mut merger = PointMerger::new();
/// assert!(merger.update(vec![p("a"), p("b")]));
/// assert!(!merger.update(vec![p("a")]));
/// assert_eq!(merger.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointMerger {
    best: Vec<Point>,
    high_watermark: usize,
    rejected: usize,
}

impl PointMerger {
    /// Creates an empty merger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            best: Vec::new(),
            high_watermark: 0,
            rejected: 0,
        }
    }

    /// Offers a candidate list; returns true when the visible set changed.
    pub fn update(&mut self, candidates: Vec<Point>) -> bool {
        if candidates.len() < self.best.len() {
            self.rejected += 1;
            tracing::trace!(
                offered = candidates.len(),
                kept = self.best.len(),
                "shorter candidate list dropped"
            );
            return false;
        }
        if candidates == self.best {
            return false;
        }
        self.high_watermark = self.high_watermark.max(candidates.len());
        self.best = candidates;
        true
    }

    /// Returns the current best list.
    #[must_use]
    pub fn best(&self) -> &[Point] {
        &self.best
    }

    /// Returns an owned copy of the current best list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Point> {
        self.best.clone()
    }

    /// Consumes the merger, yielding the best list.
    #[must_use]
    pub fn into_best(self) -> Vec<Point> {
        self.best
    }

    /// Number of points in the best list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// Returns true when no point has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Largest list length ever accepted.
    #[must_use]
    pub const fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    /// Number of shorter lists that were dropped.
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.rejected
    }
}
