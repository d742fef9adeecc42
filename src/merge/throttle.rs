//! Single-slot throttle for UI pushes.

use std::time::{Duration, Instant};

/// Default delay between a first pending update and its emission.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(150);

/// Throttle state. There is at most one armed deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleState<T> {
    /// Nothing buffered, no deadline.
    Idle,
    /// A value is buffered and will be released at `deadline`.
    Pending {
        /// When the buffered value becomes due.
        deadline: Instant,
        /// Latest value offered during the window.
        value: T,
    },
}

/// Caps pushes to one per window while always delivering the latest value.
///
/// Time is passed in by the caller, so the state machine has no clock or
/// timer of its own; the async driver sleeps until [`next_deadline`] and
/// then calls [`poll`].
///
/// [`next_deadline`]: Throttle::next_deadline
/// [`poll`]: Throttle::poll
///
/// # Examples
///
/// ```
/// use pointstream::merge::Throttle;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut throttle = Throttle::new(Duration::from_millis(150));
/// throttle.schedule(1, start);
/// throttle.schedule(2, start + Duration::from_millis(10));
/// assert_eq!(throttle.poll(start + Duration::from_millis(100)), None);
/// assert_eq!(throttle.poll(start + Duration::from_millis(150)), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    delay: Duration,
    state: ThrottleState<T>,
}

impl<T> Throttle<T> {
    /// Creates an idle throttle with the given window.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: ThrottleState::Idle,
        }
    }

    /// Buffers `value`, arming the deadline only if none is armed.
    pub fn schedule(&mut self, value: T, now: Instant) {
        match &mut self.state {
            ThrottleState::Idle => {
                self.state = ThrottleState::Pending {
                    deadline: now + self.delay,
                    value,
                };
            }
            ThrottleState::Pending { value: pending, .. } => *pending = value,
        }
    }

    /// Releases the buffered value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.state {
            ThrottleState::Pending { deadline, .. } if now >= *deadline => self.take(),
            _ => None,
        }
    }

    /// Drops any buffered value and returns to idle.
    pub fn cancel(&mut self) {
        self.state = ThrottleState::Idle;
    }

    /// Takes the buffered value regardless of its deadline.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, ThrottleState::Idle) {
            ThrottleState::Pending { value, .. } => Some(value),
            ThrottleState::Idle => None,
        }
    }

    /// Returns the armed deadline, if any.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            ThrottleState::Pending { deadline, .. } => Some(*deadline),
            ThrottleState::Idle => None,
        }
    }

    /// Returns true when a value is buffered.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, ThrottleState::Pending { .. })
    }

    /// Returns the configured window.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &ThrottleState<T> {
        &self.state
    }
}

impl<T> Default for Throttle<T> {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}
