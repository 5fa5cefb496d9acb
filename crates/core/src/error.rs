// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use booth_map_domain::DomainError;

use crate::session::SessionPhase;

/// Errors raised by preview selection and editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The row index does not exist in the session.
    RowOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of rows in the session.
        len: usize,
    },
    /// The row has validation errors and cannot be selected.
    RowHasErrors {
        /// The 1-based file row number.
        row_number: usize,
    },
    /// The session is not in the preview phase.
    SessionLocked {
        /// The current phase.
        phase: SessionPhase,
    },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { index, len } => {
                write!(f, "Row index {index} is out of range (session has {len} rows)")
            }
            Self::RowHasErrors { row_number } => {
                write!(f, "Row {row_number} has validation errors and cannot be selected")
            }
            Self::SessionLocked { phase } => {
                write!(f, "Import session cannot be changed while {phase}")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Errors reported by a `RecordStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    Conflict(String),
    /// A referenced record does not exist.
    NotFound(String),
    /// The write was rejected or failed.
    WriteFailed(String),
    /// The store could not be reached or queried.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::WriteFailed(msg) => write!(f, "Write failed: {msg}"),
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors that can occur in the import pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A selection or edit was rejected.
    Selection(SelectionError),
    /// The record store failed outside of per-row commit handling.
    Store(StoreError),
    /// The operation is not allowed in the current session phase.
    InvalidPhase {
        /// The operation that was attempted.
        operation: &'static str,
        /// The current phase.
        phase: SessionPhase,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Selection(err) => write!(f, "Selection rejected: {err}"),
            Self::Store(err) => write!(f, "Store error: {err}"),
            Self::InvalidPhase { operation, phase } => {
                write!(f, "Cannot {operation} while the import session is {phase}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<SelectionError> for CoreError {
    fn from(err: SelectionError) -> Self {
        Self::Selection(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
