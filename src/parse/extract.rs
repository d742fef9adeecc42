//! Pulling well-formed point candidates out of a (possibly partial) buffer.

use crate::core::{Category, Point};
use crate::parse::repair::repair;
use serde_json::Value;

/// How a buffer yielded its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The buffer parsed as-is.
    Direct(Vec<Point>),
    /// The buffer parsed after [`repair`].
    Repaired(Vec<Point>),
    /// Neither the buffer nor its repair produced a `points` array.
    Unparsed,
}

impl Extraction {
    /// Consumes the outcome, yielding the candidates (empty when unparsed).
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        match self {
            Self::Direct(points) | Self::Repaired(points) => points,
            Self::Unparsed => Vec::new(),
        }
    }
}

/// Runs the direct-parse-then-repair extraction over `buffer`.
///
/// This is a pure function: a failed attempt leaves nothing behind, so the
/// caller's previous best result is never disturbed.
#[must_use]
pub fn extract_with_outcome(buffer: &str) -> Extraction {
    if let Ok(value) = serde_json::from_str::<Value>(buffer) {
        return candidates(&value).map_or(Extraction::Unparsed, Extraction::Direct);
    }

    let Some(repaired) = repair(buffer) else {
        return Extraction::Unparsed;
    };
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => candidates(&value).map_or(Extraction::Unparsed, Extraction::Repaired),
        Err(e) => {
            tracing::trace!(error = %e, "repaired buffer still unparseable");
            Extraction::Unparsed
        }
    }
}

/// Returns the well-formed point candidates in `buffer`, or an empty list.
///
/// # Examples
///
/// ```
/// use pointstream::parse::extract;
///
/// let points = extract(r#"{"points":[{"content":"Do X","category":"action","time"#);
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].timestamp, None);
/// ```
#[must_use]
pub fn extract(buffer: &str) -> Vec<Point> {
    extract_with_outcome(buffer).into_points()
}

/// Filters the `points` array of a parsed document.
///
/// Returns `None` when the document has no `points` array.
#[must_use]
pub fn candidates(document: &Value) -> Option<Vec<Point>> {
    let points = document.get("points")?.as_array()?;
    Some(points.iter().filter_map(candidate).collect())
}

/// Converts one array element into a point if it is well-formed.
///
/// Requires a non-empty string `content` and a non-empty string `category`;
/// labels outside the known categories are kept as [`Category::Other`]. A
/// `timestamp` that is not a non-negative number is ignored.
fn candidate(value: &Value) -> Option<Point> {
    let content = value.get("content")?.as_str()?;
    if content.is_empty() {
        return None;
    }
    let category = value.get("category")?.as_str()?.parse::<Category>().ok()?;
    Some(Point {
        content: content.to_string(),
        category,
        timestamp: value.get("timestamp").and_then(timestamp_seconds),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timestamp_seconds(value: &Value) -> Option<u64> {
    if let Some(seconds) = value.as_u64() {
        return Some(seconds);
    }
    let seconds = value.as_f64()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| seconds.trunc() as u64)
}
