// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{EventYear, Flag, Numeric};

/// Validates that an event year is a reasonable calendar year.
///
/// # Arguments
///
/// * `year` - The year to validate
///
/// # Errors
///
/// Returns an error if the year is not between 1900 and 2200.
pub fn validate_event_year(year: u16) -> Result<EventYear, DomainError> {
    if !(1900..=2200).contains(&year) {
        return Err(DomainError::InvalidEventYear(format!(
            "event year must be between 1900 and 2200, got {year}"
        )));
    }
    Ok(EventYear::new(year))
}

/// Parses and validates an event year cell.
///
/// # Errors
///
/// Returns an error if the cell is not an integer in range.
pub fn parse_event_year(raw: &str) -> Result<EventYear, DomainError> {
    let trimmed: &str = raw.trim();
    let integral: &str = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    let year: u16 = integral
        .parse::<u16>()
        .map_err(|_| DomainError::InvalidEventYear(format!("'{trimmed}' is not a year")))?;
    validate_event_year(year)
}

/// Validates a normalized email address.
///
/// The address must contain `@` with a non-empty local part and a domain
/// of at least two non-empty dot-separated labels.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` when the address is malformed.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a normalized phone number.
///
/// Only digits, spaces and one leading `+` may remain after normalization,
/// and the number must hold between 6 and 15 digits.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhone` when the number is implausible.
pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let body: &str = phone.strip_prefix('+').unwrap_or(phone);
    if !body.chars().all(|c| c.is_ascii_digit() || c == ' ') {
        return Err(DomainError::InvalidPhone(phone.to_string()));
    }
    let digits: usize = body.chars().filter(char::is_ascii_digit).count();
    if !(6..=15).contains(&digits) {
        return Err(DomainError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

/// Validates a strictly typed boolean field.
///
/// # Errors
///
/// Returns `DomainError::InvalidFlag` for unrecognized tokens.
pub fn validate_flag(field: &'static str, flag: &Flag) -> Result<(), DomainError> {
    match flag {
        Flag::Set(_) => Ok(()),
        Flag::Unrecognized(token) => Err(DomainError::InvalidFlag {
            field,
            token: token.clone(),
        }),
    }
}

/// Validates a count field.
///
/// # Errors
///
/// Returns `DomainError::InvalidNumber` for unparseable values.
pub fn validate_count(field: &'static str, value: &Numeric) -> Result<(), DomainError> {
    match value {
        Numeric::Value(_) => Ok(()),
        Numeric::Invalid(raw) => Err(DomainError::InvalidNumber {
            field,
            value: raw.clone(),
        }),
    }
}
