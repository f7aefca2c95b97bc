//! Utilities module for Easy Notes
//!
//! Shared helper functions and utilities including:
//! - Trailing-edge debouncing
//! - Path utilities
//! - Text utilities

use tokio::time::{Duration, Instant};

/// Trailing-edge debouncer: holds the latest scheduled value and releases
/// it once `delay` has passed without a newer one
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value; the quiet window restarts at `now`
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value if its quiet window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Take the pending value regardless of the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Path utilities
pub mod path {
    use std::path::{Path, PathBuf};

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    /// First `max_chars` characters, with "..." appended when cut
    pub fn preview(s: &str, max_chars: usize) -> String {
        let mut chars = s.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    /// Length in chars, the unit cursor offsets are measured in
    pub fn char_len(s: &str) -> usize {
        s.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_debouncer_releases_after_quiet_window() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::from_millis(100);

        debouncer.schedule("a", t0);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(99)), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(100)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debouncer_last_value_wins() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::from_millis(100);

        debouncer.schedule(1, t0);
        debouncer.schedule(2, t0 + Duration::from_millis(60));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(120)), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(160)), Some(2));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::from_millis(100);
        debouncer.schedule(1, t0);
        assert_eq!(debouncer.flush(), Some(1));

        debouncer.schedule(2, t0);
        debouncer.cancel();
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(path::expand_tilde(Path::new("/tmp/x")), Path::new("/tmp/x"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(text::preview("hello", 20), "hello");
        assert_eq!(text::preview("héllo wörld", 5), "héllo...");
        assert_eq!(text::char_len("héllo"), 5);
    }
}
