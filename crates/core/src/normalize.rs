// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Raw row to typed fields.

use booth_map_domain::{
    Flag, PhoneRegion, RecordKind, natural_key, normalize_email, normalize_phone, optional_text,
    parse_count, parse_event_year, parse_flag,
};

use crate::config::ImportContext;
use crate::index::ExistingIndex;
use crate::row::{
    AssignmentFields, CompanyFields, NormalizedFields, RawRow, SubscriptionFields, YearField,
    normalize_header,
};

pub(crate) const NAME_HEADERS: &[&str] = &["name", "company", "company_name"];
pub(crate) const CONTACT_HEADERS: &[&str] = &["contact", "contact_person"];
pub(crate) const PHONE_HEADERS: &[&str] = &["phone", "telephone", "phone_number"];
pub(crate) const EMAIL_HEADERS: &[&str] = &["email", "e_mail", "email_address"];
pub(crate) const WEBSITE_HEADERS: &[&str] = &["website", "url", "web"];
pub(crate) const INFO_HEADERS: &[&str] = &["info", "information", "description"];
pub(crate) const CATEGORY_LIST_HEADERS: &[&str] = &["categories", "category"];
pub(crate) const YEAR_HEADERS: &[&str] = &["year", "event_year"];
pub(crate) const BOOTH_COUNT_HEADERS: &[&str] = &["booths", "booth_count"];
pub(crate) const BREAKFAST_HEADERS: &[&str] = &["breakfast"];
pub(crate) const COINS_HEADERS: &[&str] = &["coins"];
pub(crate) const NOTES_HEADERS: &[&str] = &["notes", "note", "remarks"];
pub(crate) const BOOTH_HEADERS: &[&str] = &["booth", "booth_label", "marker", "stand"];

/// Headers with a fixed meaning for companies; never read as category columns.
const COMPANY_HEADERS: &[&[&str]] = &[
    NAME_HEADERS,
    CONTACT_HEADERS,
    PHONE_HEADERS,
    EMAIL_HEADERS,
    WEBSITE_HEADERS,
    INFO_HEADERS,
    CATEGORY_LIST_HEADERS,
];

fn text(raw: &RawRow, aliases: &[&str]) -> Option<String> {
    raw.get_any(aliases).and_then(optional_text)
}

fn required_text(raw: &RawRow, aliases: &[&str]) -> String {
    raw.get_any(aliases).map(str::trim).unwrap_or_default().to_string()
}

fn phone(raw: &RawRow, region: &PhoneRegion) -> Option<String> {
    text(raw, PHONE_HEADERS).map(|value| normalize_phone(&value, region))
}

fn email(raw: &RawRow) -> Option<String> {
    text(raw, EMAIL_HEADERS).map(|value| normalize_email(&value))
}

fn year(raw: &RawRow, context: &ImportContext) -> YearField {
    match text(raw, YEAR_HEADERS) {
        Some(value) => parse_event_year(&value).map_or(YearField::Invalid(value), YearField::Value),
        None => context
            .target_year
            .map_or(YearField::Missing, YearField::Value),
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    let key: String = natural_key(name);
    if !list.iter().any(|existing| natural_key(existing) == key) {
        list.push(name.to_string());
    }
}

/// One entry of the legacy categories column.
#[derive(Debug, PartialEq, Eq)]
enum CategoryToken<'a> {
    /// A catalogue category, in catalogue spelling.
    Known(&'a str),
    /// Text that names no known category.
    Unknown(&'a str),
}

const fn is_list_separator(c: char) -> bool {
    c == ',' || c == ';'
}

/// Whether `rest` opens with `name` followed by the end or a separator.
fn opens_with_category(rest: &str, name: &str) -> bool {
    let Some(head) = rest.get(..name.len()) else {
        return false;
    };
    natural_key(head) == natural_key(name)
        && rest[name.len()..]
            .trim_start()
            .chars()
            .next()
            .is_none_or(is_list_separator)
}

/// Splits the legacy categories column on `,` and `;`.
///
/// Known category names are matched first, longest name first, so a name
/// that itself contains a separator stays whole.
fn split_category_list<'a>(value: &'a str, index: &'a ExistingIndex) -> Vec<CategoryToken<'a>> {
    let mut known: Vec<&str> = index.categories().iter().map(String::as_str).collect();
    known.sort_by_key(|name| std::cmp::Reverse(name.len()));

    let mut tokens: Vec<CategoryToken<'a>> = Vec::new();
    let mut rest: &str = value;
    loop {
        rest = rest.trim_start_matches(|c: char| is_list_separator(c) || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        if let Some(name) = known.iter().copied().find(|name| opens_with_category(rest, name)) {
            tokens.push(CategoryToken::Known(name));
            rest = &rest[name.len()..];
            continue;
        }
        let end: usize = rest.find(is_list_separator).unwrap_or(rest.len());
        let name: &str = rest[..end].trim();
        if !name.is_empty() {
            tokens.push(CategoryToken::Unknown(name));
        }
        rest = &rest[end..];
    }
    tokens
}

fn is_company_header(header: &str) -> bool {
    let normalized: String = normalize_header(header);
    COMPANY_HEADERS
        .iter()
        .flat_map(|aliases| aliases.iter())
        .any(|alias| *alias == normalized)
}

fn company_fields(raw: &RawRow, context: &ImportContext, index: &ExistingIndex) -> CompanyFields {
    let mut categories: Vec<String> = Vec::new();
    let mut unknown_categories: Vec<String> = Vec::new();

    if let Some(list) = raw.get_any(CATEGORY_LIST_HEADERS) {
        for token in split_category_list(list, index) {
            match token {
                CategoryToken::Known(known) => push_unique(&mut categories, known),
                CategoryToken::Unknown(name) => push_unique(&mut unknown_categories, name),
            }
        }
    }

    // Per-category columns: an unrecognized token means "not selected".
    for (header, value) in raw.cells() {
        if is_company_header(header) {
            continue;
        }
        if let Some(known) = index.category_named(header)
            && matches!(parse_flag(value), Flag::Set(true))
        {
            push_unique(&mut categories, known);
        }
    }

    CompanyFields {
        name: required_text(raw, NAME_HEADERS),
        contact: text(raw, CONTACT_HEADERS),
        phone: phone(raw, &context.phone_region),
        email: email(raw),
        website: text(raw, WEBSITE_HEADERS),
        info: text(raw, INFO_HEADERS),
        categories,
        unknown_categories,
    }
}

fn subscription_fields(raw: &RawRow, context: &ImportContext) -> SubscriptionFields {
    SubscriptionFields {
        company: required_text(raw, NAME_HEADERS),
        year: year(raw, context),
        contact: text(raw, CONTACT_HEADERS),
        phone: phone(raw, &context.phone_region),
        email: email(raw),
        booth_count: parse_count(raw.get_any(BOOTH_COUNT_HEADERS).unwrap_or_default()),
        breakfast: parse_flag(raw.get_any(BREAKFAST_HEADERS).unwrap_or_default()),
        coins: parse_count(raw.get_any(COINS_HEADERS).unwrap_or_default()),
        notes: text(raw, NOTES_HEADERS),
    }
}

fn assignment_fields(raw: &RawRow, context: &ImportContext) -> AssignmentFields {
    AssignmentFields {
        company: required_text(raw, NAME_HEADERS),
        booth: required_text(raw, BOOTH_HEADERS),
        year: year(raw, context),
        info: text(raw, INFO_HEADERS),
    }
}

/// Converts a raw row into the typed fields of `kind`.
///
/// Never fails: values that cannot be interpreted are carried in the
/// returned fields and reported by the validator.
///
/// # Arguments
///
/// * `kind` - The record kind of the session
/// * `raw` - The row as read from the file
/// * `context` - Phone region and default event year
/// * `index` - Supplies the known category names
#[must_use]
pub fn normalize_row(
    kind: RecordKind,
    raw: &RawRow,
    context: &ImportContext,
    index: &ExistingIndex,
) -> NormalizedFields {
    match kind {
        RecordKind::Company => NormalizedFields::Company(company_fields(raw, context, index)),
        RecordKind::Subscription => {
            NormalizedFields::Subscription(subscription_fields(raw, context))
        }
        RecordKind::Assignment => NormalizedFields::Assignment(assignment_fields(raw, context)),
    }
}
