//! Snapshot consumers.

use crate::core::Point;

/// Receives owned point snapshots from a session.
///
/// Intermediate snapshots arrive at most once per throttle window. The
/// final snapshot arrives exactly once and may repeat the last intermediate
/// one, so implementations must tolerate a duplicate at the end.
pub trait SnapshotSink {
    /// Handles an intermediate snapshot.
    fn on_snapshot(&mut self, points: Vec<Point>);

    /// Handles the final, authoritative snapshot.
    ///
    /// Defaults to [`on_snapshot`](Self::on_snapshot).
    fn on_final(&mut self, points: Vec<Point>) {
        self.on_snapshot(points);
    }
}

impl<F> SnapshotSink for F
where
    F: FnMut(Vec<Point>),
{
    fn on_snapshot(&mut self, points: Vec<Point>) {
        self(points);
    }
}

/// Sink that records every snapshot it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectingSink {
    /// Intermediate snapshots in arrival order.
    pub snapshots: Vec<Vec<Point>>,
    /// The final snapshot, once delivered.
    pub final_snapshot: Option<Vec<Point>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lengths of the intermediate snapshots.
    #[must_use]
    pub fn lengths(&self) -> Vec<usize> {
        self.snapshots.iter().map(Vec::len).collect()
    }
}

impl SnapshotSink for CollectingSink {
    fn on_snapshot(&mut self, points: Vec<Point>) {
        self.snapshots.push(points);
    }

    fn on_final(&mut self, points: Vec<Point>) {
        self.final_snapshot = Some(points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |points: Vec<Point>| seen.push(points.len());
            sink.on_snapshot(vec![Point::new("a", Category::Action)]);
            sink.on_final(Vec::new());
        }
        assert_eq!(seen, vec![1, 0]);
    }

    #[test]
    fn test_collecting_sink_separates_final() {
        let mut sink = CollectingSink::new();
        sink.on_snapshot(vec![Point::new("a", Category::Action)]);
        sink.on_final(vec![Point::new("a", Category::Action)]);
        assert_eq!(sink.lengths(), vec![1]);
        assert_eq!(sink.final_snapshot.map(|p| p.len()), Some(1));
    }
}
