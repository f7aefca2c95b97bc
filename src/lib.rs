//! Easy Notes core
//!
//! State engines for a small note-taking app: the tab registry with its
//! persisted tab list, the debounced undo/redo editing session, and the
//! note model with an observable in-memory repository.

pub mod config;
pub mod editor;
pub mod error;
pub mod notes;
pub mod state;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use editor::{EditHistory, EditSession, EditState, SessionDriver};
pub use error::{AppError, AppResult};
pub use notes::{MemoryNoteRepository, Note, NoteFilter, NoteRepository};
pub use state::{TabDescriptor, TabKind, TabRegistry};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StoreWriter};
