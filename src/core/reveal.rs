//! # Progressive Reveal
//!
//! A fixed-rate "typewriter" timer for bot replies that contain no code.
//! One character becomes visible per interval. The timer is a plain value
//! owned by whoever displays the message: dropping or cancelling it stops
//! the reveal, and nothing is scheduled outside of it.

use std::time::{Duration, Instant};

/// Delay between two revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone)]
pub struct RevealTimer {
    started_at: Instant,
    interval: Duration,
    total_chars: usize,
    cancelled: bool,
}

impl RevealTimer {
    pub fn start(text: &str, interval: Duration, now: Instant) -> Self {
        Self {
            started_at: now,
            interval,
            total_chars: text.chars().count(),
            cancelled: false,
        }
    }

    /// Characters visible at `now`. Cancelled or finished timers show all.
    pub fn visible_chars(&self, now: Instant) -> usize {
        if self.cancelled || self.interval.is_zero() {
            return self.total_chars;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let ticks = elapsed.as_millis() / self.interval.as_millis().max(1);
        (ticks as usize).min(self.total_chars)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.visible_chars(now) >= self.total_chars
    }

    /// Stops the animation; the full text is shown from now on.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The visible prefix of `text` at `now`, cut on a char boundary.
    pub fn visible<'t>(&self, text: &'t str, now: Instant) -> &'t str {
        let n = self.visible_chars(now);
        match text.char_indices().nth(n) {
            Some((byte, _)) => &text[..byte],
            None => text,
        }
    }
}
