//! Output formatting for CLI commands.
//!
//! Supports text, pretty JSON and NDJSON output formats. Snapshots are
//! written as they arrive, so in the JSON formats each one is a single
//! compact line.

use crate::core::{Category, Point, PointGroups, VideoRef, point_key};
use crate::error::Error;
use crate::io::ellipsize;
use serde::Serialize;
use std::fmt::Write;

/// Maximum graphemes of point content shown in a text snapshot line.
const PREVIEW_LEN: usize = 60;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON, one compact object per line.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// True for the JSON-based formats.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::Ndjson)
    }
}

#[derive(Serialize)]
struct KeyedPoint<'a> {
    key: String,
    #[serde(flatten)]
    point: &'a Point,
}

fn keyed(points: &[Point], key_prefix_len: usize) -> Vec<KeyedPoint<'_>> {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| KeyedPoint {
            key: point_key(point, i, key_prefix_len),
            point,
        })
        .collect()
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Event<'a> {
    Snapshot {
        seq: usize,
        count: usize,
        points: Vec<KeyedPoint<'a>>,
    },
    Final {
        count: usize,
        points: Vec<KeyedPoint<'a>>,
    },
}

/// Formats one intermediate snapshot as a single line.
#[must_use]
pub fn format_snapshot(
    seq: usize,
    points: &[Point],
    key_prefix_len: usize,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let latest = points
                .last()
                .map(|p| format!(": [{}] {}", p.category, ellipsize(&p.content, PREVIEW_LEN)))
                .unwrap_or_default();
            format!(
                "snapshot {seq}: {} point{}{latest}",
                points.len(),
                if points.len() == 1 { "" } else { "s" }
            )
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json_line(&Event::Snapshot {
            seq,
            count: points.len(),
            points: keyed(points, key_prefix_len),
        }),
    }
}

/// Formats the final point list.
///
/// Text output groups points under their category headings, in the fixed
/// category order, with timestamps where the model supplied them. Points
/// with unknown labels come last, each tagged with its label.
#[must_use]
pub fn format_points(points: &[Point], key_prefix_len: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_points_text(points),
        OutputFormat::Json => {
            let mut output = format_json(&Event::Final {
                count: points.len(),
                points: keyed(points, key_prefix_len),
            });
            output.push('\n');
            output
        }
        OutputFormat::Ndjson => {
            let mut output = format_json_line(&Event::Final {
                count: points.len(),
                points: keyed(points, key_prefix_len),
            });
            output.push('\n');
            output
        }
    }
}

fn format_points_text(points: &[Point]) -> String {
    if points.is_empty() {
        return "No points extracted.\n".to_string();
    }

    let groups = PointGroups::from_points(points);
    let mut output = String::new();
    for (heading, group) in groups.sections() {
        if !output.is_empty() {
            output.push('\n');
        }
        let _ = writeln!(output, "{heading} ({})", group.len());
        for point in group {
            output.push_str("  - ");
            if let Some(ts) = point.formatted_timestamp() {
                let _ = write!(output, "[{ts}] ");
            }
            output.push_str(&point.content);
            if let Category::Other(label) = &point.category {
                let _ = write!(output, " ({label})");
            }
            output.push('\n');
        }
    }
    output
}

/// Formats the outcome of a repair.
#[must_use]
pub fn format_repair(repaired: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match repaired {
            Some(text) => format!("{text}\n"),
            None => "Nothing to repair.\n".to_string(),
        },
        OutputFormat::Json | OutputFormat::Ndjson => {
            #[derive(Serialize)]
            struct RepairOutput<'a> {
                repaired: Option<&'a str>,
                parseable: bool,
            }
            let parseable = repaired
                .is_some_and(|text| serde_json::from_str::<serde_json::Value>(text).is_ok());
            let output = RepairOutput {
                repaired,
                parseable,
            };
            let mut text = if format == OutputFormat::Json {
                format_json(&output)
            } else {
                format_json_line(&output)
            };
            text.push('\n');
            text
        }
    }
}

/// Formats a parsed video reference.
#[must_use]
pub fn format_video(video: &VideoRef, format: OutputFormat) -> String {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct VideoOutput<'a> {
        video_id: &'a str,
        url: String,
        thumbnail_url: String,
    }

    let output = VideoOutput {
        video_id: &video.video_id,
        url: video.watch_url(),
        thumbnail_url: video.thumbnail_url(),
    };
    match format {
        OutputFormat::Text => {
            let mut text = String::new();
            let _ = writeln!(text, "Video ID:   {}", output.video_id);
            let _ = writeln!(text, "URL:        {}", output.url);
            let _ = writeln!(text, "Thumbnail:  {}", output.thumbnail_url);
            text
        }
        OutputFormat::Json => format!("{}\n", format_json(&output)),
        OutputFormat::Ndjson => format!("{}\n", format_json_line(&output)),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json_line(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as pretty JSON.
pub(crate) fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn format_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
