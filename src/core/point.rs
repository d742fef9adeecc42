//! Actionable points extracted from a model response.
//!
//! A [`Point`] is the unit the whole pipeline moves around: the accumulator
//! produces them, the merger ratchets them, and sinks receive owned copies.

use crate::error::ParseCategoryError;
use crate::io::unicode::truncate_graphemes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of content graphemes used when building a [`point_key`].
pub const DEFAULT_KEY_PREFIX_LEN: usize = 40;

/// Kind of actionable point.
///
/// The model is asked for one of three labels but may send anything, and
/// mid-stream a label can be cut short (`"act"`). Any other non-empty label
/// is kept verbatim as [`Category::Other`], so nothing is lost and a partial
/// label settles into its final value once the string completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Something the viewer should do.
    Action,
    /// A fact or concept worth remembering.
    Remember,
    /// A deeper "aha" observation.
    Insight,
    /// Any other label.
    Other(String),
}

/// Heading for points whose label is not a known category.
pub const OTHER_HEADING: &str = "Other";

impl Category {
    /// Returns the wire name of the category.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "action",
            Self::Remember => "remember",
            Self::Insight => "insight",
            Self::Other(label) => label,
        }
    }

    /// Returns the heading used when rendering a group of points.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::Action => "Action Items",
            Self::Remember => "Key Takeaways",
            Self::Insight => "Insights",
            Self::Other(_) => OTHER_HEADING,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Maps the exact lowercase wire names to the known categories; any
    /// other non-empty label becomes [`Category::Other`].
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" => Err(ParseCategoryError::Empty),
            "action" => Ok(Self::Action),
            "remember" => Ok(Self::Remember),
            "insight" => Ok(Self::Insight),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = ParseCategoryError;

    fn try_from(label: String) -> std::result::Result<Self, Self::Error> {
        match label.parse::<Self>()? {
            Self::Other(_) => Ok(Self::Other(label)),
            known => Ok(known),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A well-formed point candidate.
///
/// # Examples
///
/// ```
/// use pointstream::core::{Category, Point};
///
/// let point = Point::new("Write down your goals", Category::Action).with_timestamp(75);
/// assert_eq!(point.timestamp, Some(75));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Point text, never empty.
    pub content: String,

    /// Point category.
    pub category: Category,

    /// Offset into the video in whole seconds, when the model supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Point {
    /// Creates a point without a timestamp.
    #[must_use]
    pub fn new(content: impl Into<String>, category: Category) -> Self {
        Self {
            content: content.into(),
            category,
            timestamp: None,
        }
    }

    /// Sets the timestamp in seconds.
    #[must_use]
    pub const fn with_timestamp(mut self, seconds: u64) -> Self {
        self.timestamp = Some(seconds);
        self
    }

    /// Returns the timestamp formatted as `M:SS`, if present.
    #[must_use]
    pub fn formatted_timestamp(&self) -> Option<String> {
        self.timestamp.map(format_timestamp)
    }
}

/// Formats seconds as `M:SS` (minutes are not wrapped into hours).
///
/// # Examples
///
/// ```
/// use pointstream::core::format_timestamp;
///
/// assert_eq!(format_timestamp(0), "0:00");
/// assert_eq!(format_timestamp(754), "12:34");
/// ```
#[must_use]
pub fn format_timestamp(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Builds the stable list key for a point at `index`.
///
/// Keys only matter to renderers: the merge logic identifies points by
/// position. A card keeps its key while siblings further down the list keep
/// changing, so it is not remounted.
#[must_use]
pub fn point_key(point: &Point, index: usize, prefix_len: usize) -> String {
    format!(
        "{}-{}-{index}",
        point.category,
        truncate_graphemes(&point.content, prefix_len)
    )
}

/// Points of a snapshot partitioned by category.
///
/// Order inside each group follows the snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PointGroups<'a> {
    /// Action items.
    pub action: Vec<&'a Point>,
    /// Key takeaways.
    pub remember: Vec<&'a Point>,
    /// Insights.
    pub insight: Vec<&'a Point>,
    /// Points with any other label.
    pub other: Vec<&'a Point>,
}

impl<'a> PointGroups<'a> {
    /// Groups the given points by category.
    #[must_use]
    pub fn from_points(points: &'a [Point]) -> Self {
        let mut groups = Self::default();
        for point in points {
            match point.category {
                Category::Action => groups.action.push(point),
                Category::Remember => groups.remember.push(point),
                Category::Insight => groups.insight.push(point),
                Category::Other(_) => groups.other.push(point),
            }
        }
        groups
    }

    /// Returns the group for a category. Every [`Category::Other`] label
    /// maps to the same group.
    #[must_use]
    pub fn get(&self, category: &Category) -> &[&'a Point] {
        match category {
            Category::Action => &self.action,
            Category::Remember => &self.remember,
            Category::Insight => &self.insight,
            Category::Other(_) => &self.other,
        }
    }

    /// Non-empty groups with their headings, known categories first.
    pub fn sections(&self) -> impl Iterator<Item = (&'static str, &[&'a Point])> {
        [
            (Category::Action.heading(), self.action.as_slice()),
            (Category::Remember.heading(), self.remember.as_slice()),
            (Category::Insight.heading(), self.insight.as_slice()),
            (OTHER_HEADING, self.other.as_slice()),
        ]
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
    }

    /// Total number of grouped points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.action.len() + self.remember.len() + self.insight.len() + self.other.len()
    }

    /// Returns true when no group holds a point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("action", Category::Action)]
    #[test_case("remember", Category::Remember)]
    #[test_case("insight", Category::Insight)]
    #[test_case("act", Category::Other("act".to_string()) ; "partial name")]
    #[test_case("Action", Category::Other("Action".to_string()) ; "wrong case")]
    #[test_case("tip", Category::Other("tip".to_string()) ; "unknown label")]
    fn test_category_from_str(input: &str, expected: Category) {
        assert_eq!(input.parse::<Category>(), Ok(expected));
    }

    #[test]
    fn test_category_from_str_rejects_empty() {
        let err = "".parse::<Category>().unwrap_err();
        assert_eq!(err, ParseCategoryError::Empty);
        assert_eq!(err.to_string(), "category label is empty");
    }

    #[test]
    fn test_category_serde_keeps_label() {
        let other = Category::Other("Tip".to_string());
        assert_eq!(serde_json::to_string(&other).unwrap(), r#""Tip""#);
        assert_eq!(serde_json::to_string(&Category::Remember).unwrap(), r#""remember""#);

        let back: Category = serde_json::from_str(r#""Tip""#).unwrap();
        assert_eq!(back, other);
        let known: Category = serde_json::from_str(r#""insight""#).unwrap();
        assert_eq!(known, Category::Insight);
        assert!(serde_json::from_str::<Category>(r#""""#).is_err());
    }

    #[test]
    fn test_category_headings() {
        assert_eq!(Category::Remember.heading(), "Key Takeaways");
        assert_eq!(Category::Other("tip".to_string()).heading(), OTHER_HEADING);
    }

    #[test_case(0, "0:00")]
    #[test_case(9, "0:09")]
    #[test_case(60, "1:00")]
    #[test_case(754, "12:34")]
    #[test_case(3725, "62:05" ; "over an hour")]
    fn test_format_timestamp(seconds: u64, expected: &str) {
        assert_eq!(format_timestamp(seconds), expected);
    }

    #[test]
    fn test_point_serialization_omits_missing_timestamp() {
        let point = Point::new("Do X", Category::Action);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"content":"Do X","category":"action"}"#);

        let point = point.with_timestamp(12);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains(r#""timestamp":12"#));
    }

    #[test]
    fn test_point_key_truncates_content() {
        let long = "a".repeat(100);
        let point = Point::new(long, Category::Insight);
        let key = point_key(&point, 3, DEFAULT_KEY_PREFIX_LEN);
        assert_eq!(key, format!("insight-{}-3", "a".repeat(40)));
    }

    #[test]
    fn test_point_key_grapheme_safe() {
        let point = Point::new("世界世界", Category::Remember);
        assert_eq!(point_key(&point, 0, 2), "remember-世界-0");
    }

    #[test]
    fn test_point_groups() {
        let points = vec![
            Point::new("a", Category::Action),
            Point::new("b", Category::Insight),
            Point::new("c", Category::Action),
            Point::new("d", Category::Remember),
        ];
        let groups = PointGroups::from_points(&points);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.action.len(), 2);
        assert_eq!(groups.action[1].content, "c");
        assert_eq!(groups.get(&Category::Remember)[0].content, "d");
        assert!(!groups.is_empty());
        assert!(PointGroups::from_points(&[]).is_empty());
    }

    #[test]
    fn test_point_groups_other_labels() {
        let points = vec![
            Point::new("a", Category::Other("tip".to_string())),
            Point::new("b", Category::Insight),
            Point::new("c", Category::Other("Action".to_string())),
        ];
        let groups = PointGroups::from_points(&points);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.get(&Category::Other("anything".to_string())).len(), 2);

        let headings: Vec<&str> = groups.sections().map(|(heading, _)| heading).collect();
        assert_eq!(headings, vec!["Insights", OTHER_HEADING]);
    }

    #[test]
    fn test_point_key_other_label() {
        let point = Point::new("Do X", Category::Other("act".to_string()));
        assert_eq!(point_key(&point, 0, DEFAULT_KEY_PREFIX_LEN), "act-Do X-0");
    }
}
