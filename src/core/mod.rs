//! Core domain models for pointstream.
//!
//! Points, their categories, and the video reference handed to persistence.
//! These are plain data types with no streaming state.

pub mod point;
pub mod video;

pub use point::{
    Category, DEFAULT_KEY_PREFIX_LEN, OTHER_HEADING, Point, PointGroups, format_timestamp, point_key,
};
pub use video::{SavePayload, SavedPoint, VideoRef, extract_video_id};
