// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use booth_map::{CoreError, SelectionError, StoreError};
use booth_map_domain::DomainError;

use crate::export::ExportError;
use crate::parse::ParseError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The uploaded file could not be parsed.
    InvalidFile {
        /// Why the file was rejected.
        reason: String,
    },
    /// A selection change or cell edit was rejected.
    SelectionRejected {
        /// A human-readable description of the rejection.
        message: String,
    },
    /// The import session is in the wrong phase for the operation.
    InvalidState {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The record store cannot be reached.
    ServiceUnavailable {
        /// A description of the outage.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidFile { reason } => write!(f, "Invalid file: {reason}"),
            Self::SelectionRejected { message } => write!(f, "Selection rejected: {message}"),
            Self::InvalidState { message } => write!(f, "Invalid state: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFormat { format } => Self::InvalidInput {
                field: String::from("format"),
                message: format!("unsupported file format '{format}'"),
            },
            other => Self::InvalidFile {
                reason: other.to_string(),
            },
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => Self::DomainRuleViolation {
                rule: String::from("unique_natural_key"),
                message,
            },
            StoreError::NotFound(message) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message,
            },
            StoreError::WriteFailed(message) => Self::Internal { message },
            StoreError::Unavailable(message) => Self::ServiceUnavailable { message },
        }
    }
}

/// Translates a domain error into an API error.
///
/// Field-format errors become `InvalidInput` on the offending field.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let field: &str = match &err {
        DomainError::MissingField(field)
        | DomainError::InvalidFlag { field, .. }
        | DomainError::InvalidNumber { field, .. } => field,
        DomainError::InvalidEventYear(_) => "year",
        DomainError::InvalidEmail(_) => "email",
        DomainError::InvalidPhone(_) => "phone",
        DomainError::UnknownRecordKind(_) => "kind",
    };
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a selection error into an API error.
#[must_use]
pub fn translate_selection_error(err: SelectionError) -> ApiError {
    match err {
        SelectionError::RowOutOfRange { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Row"),
            message: err.to_string(),
        },
        SelectionError::RowHasErrors { .. } => ApiError::SelectionRejected {
            message: err.to_string(),
        },
        SelectionError::SessionLocked { .. } => ApiError::InvalidState {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Selection(selection_err) => translate_selection_error(selection_err),
        CoreError::Store(store_err) => ApiError::from(store_err),
        CoreError::InvalidPhase { .. } => ApiError::InvalidState {
            message: err.to_string(),
        },
    }
}
