use std::time::{Duration, Instant};

pub const DEFAULT_WARNING_DURATION: Duration = Duration::from_millis(1000);

/// One transient notice with a one-shot deadline.
///
/// Raising it again while visible pushes the deadline out instead of
/// stacking a second notice.
#[derive(Clone, Debug)]
pub struct WarningBanner {
    duration: Duration,
    visible_until: Option<Instant>,
}

impl Default for WarningBanner {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_DURATION)
    }
}

impl WarningBanner {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            visible_until: None,
        }
    }

    pub fn raise(&mut self, now: Instant) {
        self.visible_until = Some(now + self.duration);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.is_some_and(|deadline| now < deadline)
    }

    /// Clears the banner once its deadline has passed. Returns `true` if it was dismissed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.visible_until {
            Some(deadline) if now >= deadline => {
                self.visible_until = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the banner goes away, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.visible_until
            .and_then(|deadline| deadline.checked_duration_since(now))
            .filter(|d| !d.is_zero())
    }
}
