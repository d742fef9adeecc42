//! Turning fluctuating candidate lists into a stable, rate-limited feed.
//!
//! [`PointMerger`] applies the never-shrink ratchet and [`Throttle`] caps how
//! often the result is pushed to consumers.

pub mod merger;
pub mod throttle;

pub use merger::PointMerger;
pub use throttle::{DEFAULT_THROTTLE, Throttle, ThrottleState};
