//! Undo/Redo history for a note editing session
//!
//! Snapshot based: every entry is the full (title, content) pair plus the
//! cursors at capture time. The undo stack is never empty; its bottom entry
//! is the state the session started from.

use crate::config::MAX_UNDO_HISTORY;
use crate::error::{EditorError, EditorResult};

/// A captured (title, content) pair with cursor offsets in chars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    pub title: String,
    pub content: String,
    pub title_cursor: usize,
    pub content_cursor: usize,
}

impl EditState {
    /// Snapshot with both cursors at the end of their field
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let content = content.into();
        let title_cursor = title.chars().count();
        let content_cursor = content.chars().count();
        Self {
            title,
            content,
            title_cursor,
            content_cursor,
        }
    }

    /// Whether the text (not the cursors) differs from `other`
    pub fn text_differs(&self, other: &EditState) -> bool {
        self.title != other.title || self.content != other.content
    }

    pub fn has_content(&self) -> bool {
        !self.title.is_empty() || !self.content.is_empty()
    }

    /// Copy with cursors clamped to `[0, char length]` of their field
    pub fn clamped(&self) -> Self {
        Self {
            title: self.title.clone(),
            content: self.content.clone(),
            title_cursor: self.title_cursor.min(self.title.chars().count()),
            content_cursor: self.content_cursor.min(self.content.chars().count()),
        }
    }
}

/// A stack that always holds at least one entry
#[derive(Debug, Clone)]
struct NonEmptyStack<T> {
    bottom: T,
    rest: Vec<T>,
}

impl<T> NonEmptyStack<T> {
    fn new(bottom: T) -> Self {
        Self {
            bottom,
            rest: Vec::new(),
        }
    }

    fn top(&self) -> &T {
        self.rest.last().unwrap_or(&self.bottom)
    }

    fn push(&mut self, value: T) {
        self.rest.push(value);
    }

    /// Pop the top unless it is the last entry
    fn pop(&mut self) -> Option<T> {
        self.rest.pop()
    }

    fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Drop the oldest entries above the bottom until `len() <= max`
    fn trim_to(&mut self, max: usize) {
        let max_rest = max.saturating_sub(1);
        if self.rest.len() > max_rest {
            let excess = self.rest.len() - max_rest;
            self.rest.drain(..excess);
        }
    }
}

/// Manages undo and redo stacks for one editing session
#[derive(Debug, Clone)]
pub struct EditHistory {
    /// States that can be returned to; top is the current state
    undo_stack: NonEmptyStack<EditState>,
    /// States that were undone
    redo_stack: Vec<EditState>,
    /// Maximum number of entries on the undo stack
    max_history: usize,
}

impl EditHistory {
    /// Start a history from `seed` with the given bound (at least 1)
    pub fn new(seed: EditState, max_history: usize) -> Self {
        Self {
            undo_stack: NonEmptyStack::new(seed),
            redo_stack: Vec::new(),
            max_history: max_history.max(1),
        }
    }

    /// Create with default max history
    pub fn with_default_history(seed: EditState) -> Self {
        Self::new(seed, MAX_UNDO_HISTORY)
    }

    /// Clear both stacks and start over from `seed`
    pub fn reset(&mut self, seed: EditState) {
        self.undo_stack = NonEmptyStack::new(seed);
        self.redo_stack.clear();
    }

    /// Record `state` if its text differs from the current top
    ///
    /// Returns whether anything was pushed. A push clears the redo stack.
    pub fn capture(&mut self, state: EditState) -> bool {
        if !state.text_differs(self.undo_stack.top()) {
            return false;
        }

        self.undo_stack.push(state);
        self.undo_stack.trim_to(self.max_history);
        self.redo_stack.clear();
        true
    }

    /// Step back; returns the state to show, cursors clamped
    pub fn undo(&mut self) -> EditorResult<EditState> {
        let undone = self.undo_stack.pop().ok_or(EditorError::NothingToUndo)?;
        self.redo_stack.push(undone);
        Ok(self.undo_stack.top().clamped())
    }

    /// Step forward; returns the state to show, cursors clamped
    pub fn redo(&mut self) -> EditorResult<EditState> {
        let redone = self.redo_stack.pop().ok_or(EditorError::NothingToRedo)?;
        let restored = redone.clamped();
        self.undo_stack.push(redone);
        self.undo_stack.trim_to(self.max_history);
        Ok(restored)
    }

    /// Current state (top of the undo stack)
    pub fn current(&self) -> &EditState {
        self.undo_stack.top()
    }

    /// Undo is offered only when the fields hold something and there is
    /// more than the seed on the stack
    pub fn can_undo(&self, has_content: bool) -> bool {
        has_content && self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack size (includes the seed)
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack size
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
