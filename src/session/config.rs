//! Session configuration.

use crate::core::DEFAULT_KEY_PREFIX_LEN;
use crate::error::{Error, Result};
use crate::merge::DEFAULT_THROTTLE;
use std::time::Duration;

/// Environment variable overriding the throttle window in milliseconds.
pub const THROTTLE_ENV: &str = "POINTSTREAM_THROTTLE_MS";

/// Tunables for one extraction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum spacing between intermediate snapshots.
    pub throttle: Duration,
    /// Content graphemes used in rendered point keys.
    pub key_prefix_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            key_prefix_len: DEFAULT_KEY_PREFIX_LEN,
        }
    }
}

impl SessionConfig {
    /// Creates a config with the given throttle window.
    #[must_use]
    pub fn with_throttle(throttle: Duration) -> Self {
        Self {
            throttle,
            ..Self::default()
        }
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero throttle window or a zero key
    /// prefix length.
    pub fn validate(&self) -> Result<()> {
        if self.throttle.is_zero() {
            return Err(Error::Config {
                message: "throttle window must be > 0".to_string(),
            });
        }
        if self.key_prefix_len == 0 {
            return Err(Error::Config {
                message: "key prefix length must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
