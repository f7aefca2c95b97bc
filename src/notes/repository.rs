//! Note repository
//!
//! `NoteRepository` is the boundary to note persistence. The in-memory
//! implementation keeps notes keyed by id and publishes the full list to
//! subscribers after every change.

use super::note::Note;
use crate::error::NoteError;
use std::collections::BTreeMap;
use tokio::sync::watch;

/// Which notes a list view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    /// Every note
    All,
    /// Notes filed under a category
    Category(String),
    /// Notes created on a local `yyyy-MM-dd` date
    Date(String),
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            NoteFilter::All => true,
            NoteFilter::Category(category) => note.category == *category,
            NoteFilter::Date(date) => note.date_string == *date,
        }
    }
}

/// Note persistence operations
pub trait NoteRepository {
    /// Insert a note. Id 0 gets a fresh id; an existing id is replaced.
    fn insert(&mut self, note: Note) -> i64;

    /// Replace a stored note
    fn update(&mut self, note: Note) -> Result<(), NoteError>;

    /// Delete by id, returning the removed note
    fn delete(&mut self, id: i64) -> Option<Note>;

    fn by_id(&self, id: i64) -> Option<Note>;

    /// Notes matching `filter`, newest first
    fn query(&self, filter: &NoteFilter) -> Vec<Note>;

    fn all(&self) -> Vec<Note> {
        self.query(&NoteFilter::All)
    }

    fn by_category(&self, category: &str) -> Vec<Note> {
        self.query(&NoteFilter::Category(category.to_string()))
    }

    fn by_date(&self, date_string: &str) -> Vec<Note> {
        self.query(&NoteFilter::Date(date_string.to_string()))
    }
}

/// In-memory repository with change notifications
pub struct MemoryNoteRepository {
    notes: BTreeMap<i64, Note>,
    next_id: i64,
    changes: watch::Sender<Vec<Note>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            notes: BTreeMap::new(),
            next_id: 1,
            changes,
        }
    }

    /// Receive the full note list (newest first) after every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Note>> {
        self.changes.subscribe()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn publish(&self) {
        self.changes.send_replace(self.all());
    }
}

impl Default for MemoryNoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteRepository for MemoryNoteRepository {
    fn insert(&mut self, mut note: Note) -> i64 {
        if note.is_new() {
            note.id = self.next_id;
        }
        self.next_id = self.next_id.max(note.id + 1);

        let id = note.id;
        log::debug!("Note inserted with id {}", id);
        self.notes.insert(id, note);
        self.publish();
        id
    }

    fn update(&mut self, note: Note) -> Result<(), NoteError> {
        match self.notes.get_mut(&note.id) {
            Some(stored) => {
                *stored = note;
                self.publish();
                Ok(())
            }
            None => Err(NoteError::NotFound { id: note.id }),
        }
    }

    fn delete(&mut self, id: i64) -> Option<Note> {
        let removed = self.notes.remove(&id);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    fn by_id(&self, id: i64) -> Option<Note> {
        self.notes.get(&id).cloned()
    }

    fn query(&self, filter: &NoteFilter) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        notes
    }
}
