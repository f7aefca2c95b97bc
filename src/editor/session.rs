//! Note editing session
//!
//! `EditSession` owns the live title/content fields of the note being
//! edited, its undo history and the capture debouncer. It is clock-driven:
//! callers pass `now` and call `poll` when the debounce deadline passes.
//! `SessionDriver` does that polling with a tokio timer task that is
//! aborted and respawned on every keystroke.

use super::undo::{EditHistory, EditState};
use crate::config::Config;
use crate::error::{EditorResult, NoteError};
use crate::notes::Note;
use crate::utils::{text, Debouncer};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Characters of content used as the title of an untitled note
const TITLE_PREVIEW_CHARS: usize = 20;

/// Live state of one note being edited
#[derive(Debug)]
pub struct EditSession {
    /// Field values as the user currently sees them
    fields: EditState,

    history: EditHistory,

    /// Pending capture; only the latest one survives
    capture: Debouncer<EditState>,

    /// Note loaded for editing, `None` for a new note
    note: Option<Note>,

    /// Date picked in the calendar for a new note
    selected_date: Option<i64>,

    category: String,

    color: u32,

    default_category: String,

    default_color: u32,
}

impl EditSession {
    /// Blank session for a new note
    pub fn new(config: &Config) -> Self {
        Self {
            fields: EditState::default(),
            history: EditHistory::new(EditState::default(), config.editor.max_undo_history),
            capture: Debouncer::from_millis(config.editor.debounce_ms),
            note: None,
            selected_date: None,
            category: config.notes.default_category.clone(),
            color: config.notes.default_color,
            default_category: config.notes.default_category.clone(),
            default_color: config.notes.default_color,
        }
    }

    /// Start a blank note, optionally dated from the calendar
    pub fn start_new(&mut self, selected_date: Option<i64>) {
        self.note = None;
        self.selected_date = selected_date;
        self.category = self.default_category.clone();
        self.color = self.default_color;
        self.reset(EditState::default());
    }

    /// Start editing an existing note
    pub fn load_note(&mut self, note: &Note) {
        log::debug!("Editing note {}", note.id);
        self.note = Some(note.clone());
        self.selected_date = None;
        self.category = note.category.clone();
        self.color = note.color;
        self.reset(EditState::new(note.title.clone(), note.content.clone()));
    }

    fn reset(&mut self, seed: EditState) {
        self.capture.cancel();
        self.fields = seed.clone();
        self.history.reset(seed);
    }

    /// Title field changed; returns whether a capture was scheduled
    pub fn set_title(&mut self, title: &str, cursor: usize, now: Instant) -> bool {
        if self.fields.title == title {
            self.fields.title_cursor = cursor.min(text::char_len(title));
            return false;
        }
        self.fields.title = title.to_string();
        self.fields.title_cursor = cursor;
        self.schedule_capture(now);
        true
    }

    /// Content field changed; returns whether a capture was scheduled
    pub fn set_content(&mut self, content: &str, cursor: usize, now: Instant) -> bool {
        if self.fields.content == content {
            self.fields.content_cursor = cursor.min(text::char_len(content));
            return false;
        }
        self.fields.content = content.to_string();
        self.fields.content_cursor = cursor;
        self.schedule_capture(now);
        true
    }

    fn schedule_capture(&mut self, now: Instant) {
        self.capture.schedule(self.fields.clone(), now);
    }

    /// Commit the pending capture if its quiet window has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.capture.poll(now) {
            Some(state) => self.history.capture(state),
            None => false,
        }
    }

    /// Commit the pending capture now
    pub fn flush(&mut self) -> bool {
        match self.capture.flush() {
            Some(state) => self.history.capture(state),
            None => false,
        }
    }

    /// When the pending capture is due
    pub fn capture_deadline(&self) -> Option<Instant> {
        self.capture.deadline()
    }

    /// Restore the previous state into the fields
    ///
    /// Typing still waiting for its quiet window is committed first so it
    /// is what gets undone. The restore itself is never captured: the
    /// fields already hold the restored text, so the view echoing it back
    /// through `set_title`/`set_content` is a no-op.
    pub fn undo(&mut self) -> EditorResult<EditState> {
        self.flush();
        let restored = self.history.undo()?;
        self.fields = restored.clone();
        Ok(restored)
    }

    /// Re-apply the last undone state
    pub fn redo(&mut self) -> EditorResult<EditState> {
        self.flush();
        let restored = self.history.redo()?;
        self.fields = restored.clone();
        Ok(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo(self.fields.has_content())
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn fields(&self) -> &EditState {
        &self.fields
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn is_editing_existing(&self) -> bool {
        self.note.is_some()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    /// Build the note to save from the current fields
    ///
    /// Blank notes are rejected. An empty title is replaced by the start of
    /// the content. An edited note keeps its id, a new note gets id 0. The
    /// date is the calendar date picked for a new note, else `now_millis`,
    /// so a saved edit moves the note to the top of date-ordered lists.
    pub fn build_note(&self, now_millis: i64) -> Result<Note, NoteError> {
        let title = self.fields.title.trim();
        let content = self.fields.content.trim();

        if title.is_empty() && content.is_empty() {
            return Err(NoteError::Empty);
        }

        let title = if title.is_empty() {
            text::preview(content, TITLE_PREVIEW_CHARS)
        } else {
            title.to_string()
        };

        let date = self.selected_date.unwrap_or(now_millis);

        let mut note = Note::new(title, content, self.category.clone(), date, self.color);
        if let Some(existing) = &self.note {
            note.id = existing.id;
        }
        Ok(note)
    }
}

/// Runs an `EditSession` against the tokio clock
///
/// Each field change aborts the pending timer task and spawns a new one
/// that sleeps until the session's capture deadline and then polls it.
/// Must be used from inside a tokio runtime.
pub struct SessionDriver {
    session: Arc<Mutex<EditSession>>,
    timer: Option<JoinHandle<()>>,
}

impl SessionDriver {
    pub fn new(session: EditSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            timer: None,
        }
    }

    /// Driver over a blank session built from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(EditSession::new(config))
    }

    pub fn set_title(&mut self, title: &str, cursor: usize) {
        let scheduled = lock(&self.session).set_title(title, cursor, Instant::now());
        if scheduled {
            self.restart_timer();
        }
    }

    pub fn set_content(&mut self, content: &str, cursor: usize) {
        let scheduled = lock(&self.session).set_content(content, cursor, Instant::now());
        if scheduled {
            self.restart_timer();
        }
    }

    pub fn undo(&mut self) -> EditorResult<EditState> {
        self.cancel_timer();
        lock(&self.session).undo()
    }

    pub fn redo(&mut self) -> EditorResult<EditState> {
        self.cancel_timer();
        lock(&self.session).redo()
    }

    pub fn start_new(&mut self, selected_date: Option<i64>) {
        self.cancel_timer();
        lock(&self.session).start_new(selected_date);
    }

    pub fn load_note(&mut self, note: &Note) {
        self.cancel_timer();
        lock(&self.session).load_note(note);
    }

    /// Read session state
    pub fn with_session<R>(&self, f: impl FnOnce(&EditSession) -> R) -> R {
        f(&lock(&self.session))
    }

    /// Modify session state that does not involve capture timing
    pub fn with_session_mut<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        f(&mut lock(&self.session))
    }

    fn restart_timer(&mut self) {
        self.cancel_timer();

        let Some(deadline) = lock(&self.session).capture_deadline() else {
            return;
        };
        let session = Arc::clone(&self.session);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if lock(&session).poll(Instant::now()) {
                log::trace!("Captured edit state");
            }
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Lock the session, recovering from a poisoned lock
fn lock(session: &Mutex<EditSession>) -> MutexGuard<'_, EditSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    const MS: Duration = Duration::from_millis(1);

    fn session() -> EditSession {
        EditSession::new(&Config::default())
    }

    fn contents(session: &EditSession) -> Vec<String> {
        // Walk the undo stack through undo/redo on a clone
        let mut history = session.history().clone();
        let mut seen = vec![history.current().content.clone()];
        while let Ok(state) = history.undo() {
            seen.push(state.content);
        }
        seen.reverse();
        seen
    }

    #[test]
    fn test_typing_then_undo_redo() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_content("A", 1, t0);
        assert!(s.poll(t0 + 100 * MS));
        s.set_content("AB", 2, t0 + 200 * MS);
        assert!(s.poll(t0 + 300 * MS));
        assert_eq!(contents(&s), vec!["", "A", "AB"]);

        let restored = s.undo().unwrap();
        assert_eq!(restored.content, "A");
        assert_eq!(s.fields().content, "A");
        assert_eq!(s.history().redo_count(), 1);

        let restored = s.redo().unwrap();
        assert_eq!(restored.content, "AB");
        assert_eq!(s.history().redo_count(), 0);
    }

    #[test]
    fn test_rapid_keystrokes_make_one_capture() {
        let mut s = session();
        let t0 = Instant::now();

        for (i, text) in ["h", "he", "hel", "hell", "hello"].iter().enumerate() {
            s.set_content(text, i + 1, t0 + (i as u32 * 30) * MS);
            assert!(!s.poll(t0 + (i as u32 * 30 + 29) * MS));
        }
        assert!(s.poll(t0 + 220 * MS));
        assert_eq!(s.history().undo_count(), 2);
        assert_eq!(s.history().current().content, "hello");
    }

    #[test]
    fn test_title_and_content_share_one_window() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_title("T", 1, t0);
        s.set_content("body", 4, t0 + 50 * MS);
        assert!(!s.poll(t0 + 120 * MS));
        assert!(s.poll(t0 + 150 * MS));

        let current = s.history().current();
        assert_eq!((current.title.as_str(), current.content.as_str()), ("T", "body"));
    }

    #[test]
    fn test_restore_echo_is_not_captured() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_content("A", 1, t0);
        s.poll(t0 + 100 * MS);
        s.set_content("AB", 2, t0 + 200 * MS);
        s.poll(t0 + 300 * MS);

        let restored = s.undo().unwrap();
        // The view applies the restored text and reports it back
        assert!(!s.set_title(&restored.title, 0, t0 + 400 * MS));
        assert!(!s.set_content(&restored.content, 1, t0 + 400 * MS));
        assert!(s.capture_deadline().is_none());
        assert!(s.can_redo());
    }

    #[test]
    fn test_undo_commits_pending_typing_first() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_content("draft", 5, t0);

        let restored = s.undo().unwrap();
        assert_eq!(restored.content, "");
        assert_eq!(s.history().redo_count(), 1);
        assert_eq!(s.redo().unwrap().content, "draft");
    }

    #[test]
    fn test_loaded_note_cannot_undo() {
        let mut s = session();
        let mut note = Note::new("Title", "Loaded body", "Work", 1_000, 0x112233);
        note.id = 7;
        s.load_note(&note);

        assert!(s.fields().has_content());
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert_eq!(s.category(), "Work");
    }

    #[test]
    fn test_load_drops_pending_capture() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_content("unsaved", 7, t0);

        s.load_note(&Note::new("Other", "text", "Home", 1_000, 0));
        assert!(!s.poll(t0 + 500 * MS));
        assert_eq!(s.history().undo_count(), 1);
        assert_eq!(s.fields().content, "text");
    }

    #[test]
    fn test_can_undo_needs_content() {
        let mut s = session();
        let t0 = Instant::now();
        s.set_content("x", 1, t0);
        s.poll(t0 + 100 * MS);
        assert!(s.can_undo());

        s.set_content("", 0, t0 + 200 * MS);
        s.poll(t0 + 300 * MS);
        assert!(!s.can_undo());
    }

    #[test]
    fn test_build_note_rejects_blank() {
        let mut s = session();
        s.set_title("   ", 3, Instant::now());
        assert_eq!(s.build_note(5), Err(NoteError::Empty));
    }

    #[test]
    fn test_build_new_note_uses_content_preview() {
        let mut s = session();
        s.start_new(Some(1_700_000_000_000));
        s.set_content("  The quick brown fox jumps over  ", 0, Instant::now());
        s.set_category("Home");

        let note = s.build_note(42).unwrap();
        assert_eq!(note.id, Note::UNASSIGNED_ID);
        assert_eq!(note.title, "The quick brown fox ...");
        assert_eq!(note.content, "The quick brown fox jumps over");
        assert_eq!(note.date, 1_700_000_000_000);
        assert_eq!(note.category, "Home");
    }

    #[test]
    fn test_build_edited_note_keeps_id_and_restamps_date() {
        let mut s = session();
        let mut original = Note::new("Title", "body", "Work", 1_000, 0x112233);
        original.id = 9;
        s.load_note(&original);
        s.set_title("New title", 9, Instant::now());

        let note = s.build_note(99_999).unwrap();
        assert_eq!(note.id, 9);
        assert_eq!(note.date, 99_999);
        assert_eq!(note.title, "New title");
        assert_eq!(note.color, 0x112233);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_debounces_with_timer() {
        let mut driver = SessionDriver::from_config(&Config::default());

        driver.set_content("h", 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        driver.set_content("hi", 2);
        tokio::time::sleep(Duration::from_millis(40)).await;
        driver.set_content("hi!", 3);

        tokio::time::sleep(Duration::from_millis(150)).await;
        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 2);
            assert_eq!(s.history().current().content, "hi!");
            assert!(s.can_undo());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_follows_session_debounce() {
        let mut config = Config::default();
        config.editor.debounce_ms = 300;
        let mut driver = SessionDriver::new(EditSession::new(&config));

        driver.set_content("hello", 5);
        tokio::time::sleep(Duration::from_millis(250)).await;
        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 1);
            assert!(s.capture_deadline().is_some());
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 2);
            assert_eq!(s.history().current().content, "hello");
            assert!(s.capture_deadline().is_none());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_commits_after_long_pause() {
        let mut driver = SessionDriver::new(EditSession::new(&Config::default()));

        driver.set_content("hello", 5);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 2);
            assert!(s.can_undo());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_undo_cancels_timer() {
        let mut driver = SessionDriver::from_config(&Config::default());

        driver.set_content("A", 1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        driver.set_content("AB", 2);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(driver.undo().unwrap().content, "A");
        tokio::time::sleep(Duration::from_millis(150)).await;
        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 2);
            assert!(s.can_redo());
        });

        assert_eq!(driver.redo().unwrap().content, "AB");
        driver.with_session(|s| assert!(!s.can_redo()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_session_reset() {
        let mut driver = SessionDriver::from_config(&Config::default());
        driver.set_content("typing", 6);
        driver.start_new(None);
        tokio::time::sleep(Duration::from_millis(150)).await;

        driver.with_session(|s| {
            assert_eq!(s.history().undo_count(), 1);
            assert!(!s.can_undo());
        });
    }
}
