// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is missing or empty.
    MissingField(&'static str),
    /// The event year could not be parsed or is out of range.
    InvalidEventYear(String),
    /// The email address is malformed.
    InvalidEmail(String),
    /// The phone number does not reduce to a plausible digit sequence.
    InvalidPhone(String),
    /// A strictly typed boolean field holds an unrecognized token.
    InvalidFlag {
        /// The field name.
        field: &'static str,
        /// The unrecognized token.
        token: String,
    },
    /// A numeric field could not be parsed.
    InvalidNumber {
        /// The field name.
        field: &'static str,
        /// The unparseable value.
        value: String,
    },
    /// The record kind name is not recognized.
    UnknownRecordKind(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field}: required field is missing or empty"),
            Self::InvalidEventYear(msg) => write!(f, "year: {msg}"),
            Self::InvalidEmail(value) => {
                write!(f, "email: '{value}' is not a valid email address")
            }
            Self::InvalidPhone(value) => {
                write!(f, "phone: '{value}' is not a valid phone number")
            }
            Self::InvalidFlag { field, token } => {
                write!(
                    f,
                    "{field}: '{token}' is not a recognized yes/no value"
                )
            }
            Self::InvalidNumber { field, value } => {
                write!(f, "{field}: invalid number '{value}'")
            }
            Self::UnknownRecordKind(kind) => write!(f, "Unknown record kind: '{kind}'"),
        }
    }
}

impl std::error::Error for DomainError {}
