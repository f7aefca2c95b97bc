//! Editor module for Easy Notes
//!
//! Contains the note editing core:
//! - Snapshot undo/redo history over the title and content fields
//! - The editing session with debounced capture of typing bursts

pub mod session;
pub mod undo;

pub use session::{EditSession, SessionDriver};
pub use undo::{EditHistory, EditState};
