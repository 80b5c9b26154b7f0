//! Error handling types for edit-suggest
//!
//! Extraction and validation never fail: they degrade to "no suggestions".
//! The only hard failures come from applying a single edit to the buffer.

use thiserror::Error;

use crate::edit::EditId;

/// Errors raised by a [`DocumentBuffer`](crate::buffer::DocumentBuffer) transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Position does not exist in the current document
    #[error("position {line}:{column} is out of bounds")]
    OutOfBounds { line: usize, column: usize },

    /// Range end precedes its start
    #[error("range {start_line}:{start_column}..{end_line}:{end_column} is inverted")]
    InvertedRange {
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    },

    /// Two ranges in one transaction overlap
    #[error("ranges in one transaction overlap at line {line}")]
    OverlappingRanges { line: usize },
}

/// Comprehensive error type for suggestion review operations
#[derive(Debug, Error)]
pub enum SuggestError {
    /// No edit with this id is part of the current edit set
    #[error("Edit not found: {id}")]
    EditNotFound { id: EditId },

    /// The edit was already resolved
    #[error("Edit {id} is not pending")]
    NotPending { id: EditId },

    /// The edit exists but sits in the backlog, not the visible batch
    #[error("Edit {id} is not in the visible batch")]
    NotVisible { id: EditId },

    /// The edit's coordinates no longer fit the live document
    #[error("Edit {id} no longer applies: {reason}")]
    StaleEdit { id: EditId, reason: String },

    /// The buffer refused the transaction
    #[error("Buffer rejected edit: {0}")]
    Buffer(#[from] BufferError),

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

/// Result type for suggestion review operations
pub type SuggestResult<T> = Result<T, SuggestError>;

impl SuggestError {
    /// Create a stale edit error
    pub fn stale(id: EditId, reason: impl Into<String>) -> Self {
        SuggestError::StaleEdit {
            id,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        SuggestError::Config {
            message: message.into(),
        }
    }
}
