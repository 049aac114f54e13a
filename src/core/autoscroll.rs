//! # Auto-Scroll
//!
//! Decides, when a message is appended, whether to follow the conversation
//! to the bottom or leave the reader where they are and offer a
//! "jump to latest" affordance instead.
//!
//! Measurements are unit-agnostic: pixels in a browser, rows in a terminal.

/// Default distance from the bottom still counted as "at the bottom".
pub const DEFAULT_SLACK: u32 = 100;

/// A snapshot of the message viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Total content height.
    pub scroll_height: u32,
    /// Offset of the first visible unit.
    pub scroll_top: u32,
    /// Visible height.
    pub client_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Smoothly follow to the newest message.
    ScrollToBottom,
    /// Stay put and show the jump affordance.
    ShowJump,
}

#[derive(Debug, Clone)]
pub struct AutoScroll {
    slack: u32,
    show_jump: bool,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::new(DEFAULT_SLACK)
    }
}

impl AutoScroll {
    pub fn new(slack: u32) -> Self {
        Self {
            slack,
            show_jump: false,
        }
    }

    pub fn slack(&self) -> u32 {
        self.slack
    }

    /// `scroll_height - scroll_top <= client_height + slack`
    pub fn is_near_bottom(&self, v: Viewport) -> bool {
        v.scroll_height.saturating_sub(v.scroll_top) <= v.client_height.saturating_add(self.slack)
    }

    /// Scroll position changed: the affordance tracks whether we left the bottom.
    pub fn on_scroll(&mut self, v: Viewport) {
        self.show_jump = !self.is_near_bottom(v);
    }

    /// A message was appended; `before` is the viewport just prior to it.
    pub fn on_append(&mut self, before: Viewport) -> ScrollDecision {
        if self.is_near_bottom(before) {
            self.show_jump = false;
            ScrollDecision::ScrollToBottom
        } else {
            self.show_jump = true;
            ScrollDecision::ShowJump
        }
    }

    /// The affordance was activated.
    pub fn jump_to_latest(&mut self) -> ScrollDecision {
        self.show_jump = false;
        ScrollDecision::ScrollToBottom
    }

    pub fn shows_jump(&self) -> bool {
        self.show_jump
    }

    pub fn reset(&mut self) {
        self.show_jump = false;
    }
}
