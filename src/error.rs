//! Error types for Easy Notes
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category: storage failures are logged and
//! recovered from, validation failures are shown to the user as blocking
//! messages and leave state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Key-value storage errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tab registry errors
    #[error(transparent)]
    Tab(#[from] TabError),

    /// Note errors
    #[error(transparent)]
    Note(#[from] NoteError),

    /// Edit history errors
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// Key-value storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reading the backing file
    #[error("Could not read store: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not write store: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during atomic write (temp file creation)
    #[error("Could not create temporary file for safe save: {path}")]
    AtomicWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but is not a JSON object of strings
    #[error("Store file is corrupted: {path}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded
    #[error("Could not encode value for key {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The background writer has shut down
    #[error("Store writer is closed")]
    WriterClosed,
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Tab registry errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TabError {
    /// User entered an empty (or whitespace-only) tab name
    #[error("Tab name cannot be empty")]
    EmptyName,

    /// No tab with the given id
    #[error("Tab not found: {id}")]
    NotFound { id: String },
}

/// Note errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NoteError {
    /// Both title and content are blank
    #[error("Note cannot be empty")]
    Empty,

    /// No note with the given id
    #[error("Note not found: {id}")]
    NotFound { id: i64 },
}

/// Edit history errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorError {
    /// Only the session seed is left on the undo stack
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for edit history operations
pub type EditorResult<T> = Result<T, EditorError>;

impl TabError {
    /// Create a user-friendly error message suitable for a blocking prompt
    pub fn user_message(&self) -> String {
        match self {
            TabError::EmptyName => "Tab name cannot be empty".to_string(),
            TabError::NotFound { .. } => {
                "This tab no longer exists. It may have been deleted.".to_string()
            }
        }
    }
}

impl NoteError {
    /// Create a user-friendly error message suitable for a blocking prompt
    pub fn user_message(&self) -> String {
        match self {
            NoteError::Empty => "Note cannot be empty".to_string(),
            NoteError::NotFound { .. } => {
                "This note no longer exists. It may have been deleted.".to_string()
            }
        }
    }
}

impl StoreError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StoreError::WriteError { .. } | StoreError::AtomicWriteError { .. } => {
                "Could not save your tabs. Check disk space and permissions.".to_string()
            }
            StoreError::Corrupted { .. } => {
                "Saved tabs could not be read. Default tabs were restored.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
