// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row validation.
//!
//! Every rule runs, so a row reports all of its problems at once. Messages
//! are ordered: required fields, referenced records, booth availability,
//! field formats, then in-file duplicates.

use std::collections::{HashMap, HashSet};

use booth_map_domain::{
    DomainError, EventYear, natural_key, parse_event_year, validate_count, validate_email,
    validate_flag, validate_phone,
};

use crate::index::ExistingIndex;
use crate::row::{
    AssignmentFields, CompanyFields, MatchKey, NormalizedFields, SubscriptionFields, YearField,
};

/// Keys and booth claims seen so far in the file being validated.
#[derive(Debug, Default)]
pub struct SeenKeys {
    keys: HashSet<MatchKey>,
    booths: HashMap<(String, EventYear), String>,
}

impl SeenKeys {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn require(errors: &mut Vec<String>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(DomainError::MissingField(field).to_string());
    }
}

fn require_year(errors: &mut Vec<String>, year: &YearField) {
    if matches!(year, YearField::Missing) {
        errors.push(DomainError::MissingField("year").to_string());
    }
}

fn check_company_exists(errors: &mut Vec<String>, company: &str, index: &ExistingIndex) {
    if !company.trim().is_empty() && index.company_id(company).is_none() {
        errors.push(format!("company: '{}' not found", company.trim()));
    }
}

fn check_contact_formats(errors: &mut Vec<String>, email: Option<&str>, phone: Option<&str>) {
    if let Some(email) = email
        && let Err(err) = validate_email(email)
    {
        errors.push(err.to_string());
    }
    if let Some(phone) = phone
        && let Err(err) = validate_phone(phone)
    {
        errors.push(err.to_string());
    }
}

fn check_year_format(errors: &mut Vec<String>, year: &YearField) {
    if let YearField::Invalid(raw) = year
        && let Err(err) = parse_event_year(raw)
    {
        errors.push(err.to_string());
    }
}

fn validate_company(fields: &CompanyFields, errors: &mut Vec<String>) {
    require(errors, "name", &fields.name);
    check_contact_formats(errors, fields.email.as_deref(), fields.phone.as_deref());
    for name in &fields.unknown_categories {
        errors.push(format!("categories: unknown category '{name}'"));
    }
}

fn validate_subscription(
    fields: &SubscriptionFields,
    index: &ExistingIndex,
    errors: &mut Vec<String>,
) {
    require(errors, "company", &fields.company);
    require_year(errors, &fields.year);
    check_company_exists(errors, &fields.company, index);
    check_contact_formats(errors, fields.email.as_deref(), fields.phone.as_deref());
    check_year_format(errors, &fields.year);
    if let Err(err) = validate_flag("breakfast", &fields.breakfast) {
        errors.push(err.to_string());
    }
    if let Err(err) = validate_count("booths", &fields.booth_count) {
        errors.push(err.to_string());
    }
    if let Err(err) = validate_count("coins", &fields.coins) {
        errors.push(err.to_string());
    }
}

fn validate_assignment(
    fields: &AssignmentFields,
    index: &ExistingIndex,
    seen: &mut SeenKeys,
    errors: &mut Vec<String>,
) {
    require(errors, "company", &fields.company);
    require(errors, "booth", &fields.booth);
    require_year(errors, &fields.year);
    check_company_exists(errors, &fields.company, index);

    if let Some(year) = fields.year.year()
        && !fields.booth.is_empty()
    {
        let company: String = natural_key(&fields.company);
        if index.booth_marker(&fields.booth, year).is_none() {
            errors.push(format!(
                "booth: '{}' does not exist in {year}",
                fields.booth
            ));
        } else if let Some(occupant) = index.booth_occupant(&fields.booth, year)
            && occupant != company
        {
            errors.push(format!(
                "booth: '{}' is already assigned to another company in {year}",
                fields.booth
            ));
        } else {
            let claim: (String, EventYear) = (natural_key(&fields.booth), year);
            match seen.booths.get(&claim) {
                Some(claimed_by) if *claimed_by != company => errors.push(format!(
                    "booth: '{}' is assigned to another company earlier in this file",
                    fields.booth
                )),
                Some(_) => {}
                None => {
                    seen.booths.insert(claim, company);
                }
            }
        }
    }

    check_year_format(errors, &fields.year);
}

/// Validates one row and records its key for duplicate detection.
///
/// Rows must be validated in file order with a single `SeenKeys` so the
/// second occurrence of a key is the one reported.
///
/// # Arguments
///
/// * `fields` - The normalized fields of the row
/// * `key` - The natural key built by the matcher
/// * `index` - The session's existing index
/// * `seen` - Keys seen earlier in the same file
///
/// # Returns
///
/// The error messages for this row; empty when the row is valid.
#[must_use]
pub fn validate_row(
    fields: &NormalizedFields,
    key: Option<&MatchKey>,
    index: &ExistingIndex,
    seen: &mut SeenKeys,
) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    match fields {
        NormalizedFields::Company(f) => validate_company(f, &mut errors),
        NormalizedFields::Subscription(f) => validate_subscription(f, index, &mut errors),
        NormalizedFields::Assignment(f) => validate_assignment(f, index, seen, &mut errors),
    }

    if let Some(key) = key
        && !seen.keys.insert(key.clone())
    {
        errors.push(format!("duplicate row: key '{key}' already appears earlier in this file"));
    }

    errors
}
