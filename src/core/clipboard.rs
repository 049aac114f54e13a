//! # Copy Acknowledgments
//!
//! Writes code to the system clipboard and remembers, per code segment, that
//! a "Copied!" acknowledgment should be shown until a short window expires.
//!
//! Clipboard failures are swallowed here: the caller gets `false`, a warning
//! is logged, and no acknowledgment state changes.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, warn};

/// How long "Copied!" stays visible after a successful copy.
pub const DEFAULT_ACK_WINDOW: Duration = Duration::from_secs(2);

/// Identity of a code segment on screen: which message, which segment in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub message: usize,
    pub segment: usize,
}

#[derive(Debug)]
pub enum ClipboardError {
    /// No clipboard could be opened on this platform/session.
    Unavailable(String),
    /// The clipboard exists but refused the write.
    Denied(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "clipboard unavailable: {msg}"),
            ClipboardError::Denied(msg) => write!(f, "clipboard write denied: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Write-only text clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The platform clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError::Denied(e.to_string())),
            None => Err(ClipboardError::Unavailable("not initialized".to_string())),
        }
    }
}

/// Tracks at most one live acknowledgment per code segment.
pub struct CopyController {
    clipboard: Box<dyn Clipboard>,
    window: Duration,
    acks: HashMap<SegmentKey, Instant>,
}

impl CopyController {
    pub fn new(clipboard: Box<dyn Clipboard>, window: Duration) -> Self {
        Self {
            clipboard,
            window,
            acks: HashMap::new(),
        }
    }

    /// Copies `text` and (re)starts the acknowledgment for `key`.
    ///
    /// Returns whether the clipboard write succeeded. A repeated copy on the
    /// same key replaces its expiry instead of adding a second entry.
    pub fn request_copy(&mut self, key: SegmentKey, text: &str, now: Instant) -> bool {
        match self.clipboard.write_text(text) {
            Ok(()) => {
                debug!(
                    "Copied {} bytes from message {} segment {}",
                    text.len(),
                    key.message,
                    key.segment
                );
                self.acks.insert(key, now + self.window);
                true
            }
            Err(e) => {
                warn!("Copy failed: {}", e);
                false
            }
        }
    }

    pub fn is_copied(&self, key: SegmentKey, now: Instant) -> bool {
        self.acks.get(&key).is_some_and(|&expires| now < expires)
    }

    pub fn expires_at(&self, key: SegmentKey) -> Option<Instant> {
        self.acks.get(&key).copied()
    }

    pub fn active_count(&self, now: Instant) -> usize {
        self.acks.values().filter(|&&expires| now < expires).count()
    }

    pub fn has_active(&self, now: Instant) -> bool {
        self.active_count(now) > 0
    }

    /// Drops expired acknowledgments. Returns true if anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.acks.len();
        self.acks.retain(|_, expires| now < *expires);
        self.acks.len() != before
    }

    /// Forgets every acknowledgment (view teardown).
    pub fn clear(&mut self) {
        self.acks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records writes; fails when `deny` is set.
    #[derive(Clone, Default)]
    struct FakeClipboard {
        writes: Rc<RefCell<Vec<String>>>,
        deny: bool,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.deny {
                return Err(ClipboardError::Denied("no permission".to_string()));
            }
            self.writes.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    const KEY: SegmentKey = SegmentKey {
        message: 3,
        segment: 1,
    };

    #[test]
    fn test_copy_writes_and_acknowledges() {
        let fake = FakeClipboard::default();
        let mut ctl = CopyController::new(Box::new(fake.clone()), DEFAULT_ACK_WINDOW);
        let now = Instant::now();

        assert!(ctl.request_copy(KEY, "print(1)", now));
        assert_eq!(*fake.writes.borrow(), vec!["print(1)".to_string()]);
        assert!(ctl.is_copied(KEY, now));
        assert!(ctl.is_copied(KEY, now + Duration::from_millis(1999)));
        assert!(!ctl.is_copied(KEY, now + DEFAULT_ACK_WINDOW));
    }

    #[test]
    fn test_rapid_double_copy_resets_single_ack() {
        let mut ctl = CopyController::new(Box::new(FakeClipboard::default()), DEFAULT_ACK_WINDOW);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(500);

        ctl.request_copy(KEY, "x", t0);
        ctl.request_copy(KEY, "x", t1);

        assert_eq!(ctl.active_count(t1), 1);
        assert_eq!(ctl.expires_at(KEY), Some(t1 + DEFAULT_ACK_WINDOW));
        // Still visible past the first copy's window
        assert!(ctl.is_copied(KEY, t0 + DEFAULT_ACK_WINDOW + Duration::from_millis(100)));
    }

    #[test]
    fn test_denied_clipboard_leaves_state_unchanged() {
        let other = SegmentKey {
            message: 5,
            segment: 1,
        };
        let fake = FakeClipboard::default();
        let mut ctl = CopyController::new(Box::new(fake), DEFAULT_ACK_WINDOW);
        let now = Instant::now();
        ctl.request_copy(other, "kept", now);

        ctl.clipboard = Box::new(FakeClipboard {
            deny: true,
            ..Default::default()
        });
        assert!(!ctl.request_copy(KEY, "lost", now));
        assert!(!ctl.is_copied(KEY, now));
        assert!(ctl.is_copied(other, now));
        assert_eq!(ctl.active_count(now), 1);
    }

    #[test]
    fn test_prune_and_clear() {
        let mut ctl = CopyController::new(Box::new(FakeClipboard::default()), DEFAULT_ACK_WINDOW);
        let now = Instant::now();
        ctl.request_copy(KEY, "x", now);

        assert!(!ctl.prune(now));
        assert!(ctl.prune(now + DEFAULT_ACK_WINDOW));
        assert_eq!(ctl.expires_at(KEY), None);

        ctl.request_copy(KEY, "x", now);
        ctl.clear();
        assert!(!ctl.has_active(now));
    }
}
