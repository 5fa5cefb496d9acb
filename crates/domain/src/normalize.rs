// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-field normalization.
//!
//! Every function here is pure and infallible. Input that cannot be
//! normalized is passed through unchanged and reported later by the
//! validators.

use crate::types::{Flag, Numeric};

/// Tokens recognized as `true`, compared case-insensitively.
pub const TRUE_TOKENS: &[&str] = &["true", "yes", "1", "+", "x", "✓"];

/// Tokens recognized as `false`, compared case-insensitively.
pub const FALSE_TOKENS: &[&str] = &["false", "no", "0", "-", ""];

/// ITU calling codes that are recognized after a leading `+` or `00`.
///
/// Matched longest first. No three-digit code here starts with a one- or
/// two-digit code from the same table.
const CALLING_CODES: &[&str] = &[
    // three digits
    "212", "213", "216", "234", "254", "255", "256", "260", "263", "351", "352", "353", "354",
    "355", "356", "357", "358", "359", "370", "371", "372", "373", "374", "375", "376", "377",
    "378", "380", "381", "382", "385", "386", "387", "389", "420", "421", "423", "852", "853",
    "855", "880", "886", "960", "961", "962", "963", "964", "965", "966", "967", "968", "970",
    "971", "972", "973", "974", "975", "976", "977", "992", "993", "994", "995", "996", "998",
    // two digits
    "20", "27", "30", "31", "32", "33", "34", "36", "39", "40", "41", "43", "44", "45", "46",
    "47", "48", "49", "51", "52", "53", "54", "55", "56", "57", "58", "60", "61", "62", "63",
    "64", "65", "66", "81", "82", "84", "86", "90", "91", "92", "93", "94", "95", "98",
    // one digit
    "1", "7",
];

/// Phone numbering conventions of the deployment region.
///
/// National numbers written with the trunk prefix (e.g. `06 1234 5678`)
/// are rewritten into international form using the region's calling code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRegion {
    country_code: String,
    trunk_prefix: String,
}

impl PhoneRegion {
    /// Creates a new phone region.
    ///
    /// # Arguments
    ///
    /// * `country_code` - The calling code, with or without a leading `+`
    /// * `trunk_prefix` - The national trunk prefix (empty for none)
    #[must_use]
    pub fn new(country_code: &str, trunk_prefix: &str) -> Self {
        Self {
            country_code: country_code.trim().trim_start_matches('+').to_string(),
            trunk_prefix: trunk_prefix.trim().to_string(),
        }
    }

    /// Returns the calling code without the `+`.
    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Returns the national trunk prefix.
    #[must_use]
    pub fn trunk_prefix(&self) -> &str {
        &self.trunk_prefix
    }
}

impl Default for PhoneRegion {
    fn default() -> Self {
        Self::new("31", "0")
    }
}

/// Returns the case-insensitive, trimmed natural key form of a name or label.
#[must_use]
pub fn natural_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trims a free-text cell, mapping blank values to `None`.
#[must_use]
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalizes an email address: trimmed and lowercased.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Interprets a yes/no token.
#[must_use]
pub fn parse_flag(raw: &str) -> Flag {
    let token: String = raw.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Flag::Set(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Flag::Set(false)
    } else {
        Flag::Unrecognized(raw.trim().to_string())
    }
}

/// Interprets a count cell. Blank cells are zero.
///
/// Spreadsheet exports sometimes render integers as `3.0`; an all-zero
/// fraction is accepted.
#[must_use]
pub fn parse_count(raw: &str) -> Numeric {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return Numeric::Value(0);
    }
    let integral: &str = trimmed
        .split_once('.')
        .filter(|(_, fraction)| !fraction.is_empty() && fraction.chars().all(|c| c == '0'))
        .map_or(trimmed, |(whole, _)| whole);
    integral
        .parse::<u32>()
        .map_or_else(|_| Numeric::Invalid(trimmed.to_string()), Numeric::Value)
}

/// Finds the calling code at the start of an international digit string.
fn calling_code_prefix(digits: &str) -> Option<&'static str> {
    (1..=3)
        .rev()
        .filter(|len| digits.len() > *len)
        .find_map(|len| {
            CALLING_CODES
                .iter()
                .find(|code| code.len() == len && digits.starts_with(**code))
                .copied()
        })
}

/// Normalizes a phone number into `+<country code> <national number>`.
///
/// Spaces, dashes, dots, slashes and parentheses are stripped first. A `00`
/// prefix is read as `+`. A national number starting with the region's
/// trunk prefix gets the region's calling code. Anything else is returned
/// trimmed but otherwise untouched.
#[must_use]
pub fn normalize_phone(raw: &str, region: &PhoneRegion) -> String {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.' | '/' | '\u{a0}'))
        .collect();

    let international: Option<&str> = compact
        .strip_prefix('+')
        .or_else(|| compact.strip_prefix("00"));

    if let Some(digits) = international {
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return trimmed.to_string();
        }
        let Some(code) = calling_code_prefix(digits) else {
            return trimmed.to_string();
        };
        let mut national: &str = &digits[code.len()..];
        // "+31 (0)6 ..." style: the trunk prefix written after our own code
        if code == region.country_code
            && !region.trunk_prefix.is_empty()
            && let Some(rest) = national.strip_prefix(region.trunk_prefix.as_str())
            && !rest.is_empty()
        {
            national = rest;
        }
        return format!("+{code} {national}");
    }

    if !region.trunk_prefix.is_empty()
        && compact.chars().all(|c| c.is_ascii_digit())
        && let Some(national) = compact.strip_prefix(region.trunk_prefix.as_str())
        && !national.is_empty()
    {
        return format!("+{} {national}", region.country_code);
    }

    trimmed.to_string()
}
