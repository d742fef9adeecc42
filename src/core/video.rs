//! YouTube video references and the persistence hand-off payload.
//!
//! Storage itself lives outside this crate. Once a session is finalized the
//! caller builds a [`SavePayload`] and passes it on.

use crate::core::point::{Category, Point};
use crate::error::{Result, VideoError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A validated YouTube video reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// The 11-character YouTube id (or whatever followed the URL prefix).
    pub video_id: String,
}

impl VideoRef {
    /// Parses a YouTube URL or bare video id.
    ///
    /// Accepts `youtube.com/watch?v=`, `youtu.be/` and `youtube.com/embed/`
    /// URLs, or an 11-character id on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use pointstream::core::VideoRef;
    ///
    /// let video = VideoRef::parse("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
    /// assert_eq!(video.video_id, "dQw4w9WgXcQ");
    /// ```
    pub fn parse(url: &str) -> Result<Self> {
        extract_video_id(url)
            .map(|video_id| Self { video_id })
            .ok_or_else(|| {
                VideoError::InvalidUrl {
                    url: url.to_string(),
                }
                .into()
            })
    }

    /// Canonical watch URL sent to the model.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Full resolution thumbnail URL.
    #[must_use]
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", self.video_id)
    }
}

fn url_pattern() -> Option<&'static Regex> {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)").ok()
    })
    .as_ref()
}

fn bare_id_pattern() -> Option<&'static Regex> {
    static BARE_ID: OnceLock<Option<Regex>> = OnceLock::new();
    BARE_ID
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").ok())
        .as_ref()
}

/// Extracts the video id from a YouTube URL or bare id.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some(caps) = url_pattern().and_then(|re| re.captures(url))
        && let Some(id) = caps.get(1)
    {
        return Some(id.as_str().to_string());
    }
    bare_id_pattern()
        .filter(|re| re.is_match(url))
        .map(|_| url.to_string())
}

/// A point as handed to persistence, with its display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPoint {
    /// Point text.
    pub content: String,
    /// Point category.
    pub category: Category,
    /// Timestamp in seconds; serialized as `null` when absent.
    pub timestamp: Option<u64>,
    /// Position in the final snapshot.
    pub order: usize,
}

/// Everything the persistence collaborator needs to store one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    /// Canonical video URL.
    pub url: String,
    /// YouTube video id.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Thumbnail URL.
    pub thumbnail_url: String,
    /// Final points in order.
    pub points: Vec<SavedPoint>,
}

impl SavePayload {
    /// Builds the payload from a video and the final point list.
    #[must_use]
    pub fn new(video: &VideoRef, title: impl Into<String>, points: &[Point]) -> Self {
        Self {
            url: video.watch_url(),
            video_id: video.video_id.clone(),
            title: title.into(),
            thumbnail_url: video.thumbnail_url(),
            points: points
                .iter()
                .enumerate()
                .map(|(order, p)| SavedPoint {
                    content: p.content.clone(),
                    category: p.category.clone(),
                    timestamp: p.timestamp,
                    order,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ") ; "watch url")]
    #[test_case("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s", Some("dQw4w9WgXcQ") ; "watch url with query")]
    #[test_case("https://youtu.be/dQw4w9WgXcQ", Some("dQw4w9WgXcQ") ; "short url")]
    #[test_case("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1", Some("dQw4w9WgXcQ") ; "embed url")]
    #[test_case("dQw4w9WgXcQ", Some("dQw4w9WgXcQ") ; "bare id")]
    #[test_case("dQw4w9WgXc", None ; "bare id too short")]
    #[test_case("https://vimeo.com/12345", None ; "other host")]
    fn test_extract_video_id(url: &str, expected: Option<&str>) {
        assert_eq!(extract_video_id(url).as_deref(), expected);
    }

    #[test]
    fn test_video_ref_urls() {
        let video = VideoRef::parse("https://youtu.be/abcdefghijk").unwrap();
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=abcdefghijk");
        assert_eq!(
            video.thumbnail_url(),
            "https://img.youtube.com/vi/abcdefghijk/maxresdefault.jpg"
        );
    }

    #[test]
    fn test_video_ref_invalid() {
        let err = VideoRef::parse("not a url").unwrap_err();
        assert!(err.to_string().contains("invalid YouTube URL"));
    }

    #[test]
    fn test_save_payload() {
        let video = VideoRef::parse("abcdefghijk").unwrap();
        let points = vec![
            Point::new("Do X", Category::Action).with_timestamp(30),
            Point::new("Y matters", Category::Remember),
        ];
        let payload = SavePayload::new(&video, "A talk", &points);
        assert_eq!(payload.points.len(), 2);
        assert_eq!(payload.points[1].order, 1);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["videoId"], "abcdefghijk");
        assert_eq!(json["points"][0]["timestamp"], 30);
        assert!(json["points"][1]["timestamp"].is_null());
    }
}
