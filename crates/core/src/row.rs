// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Import row model.

use booth_map_domain::{EventYear, Flag, Numeric, RecordKind};
use serde::{Deserialize, Serialize};

/// Normalizes a column header for case-insensitive, whitespace-tolerant matching.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// A parsed file row: `(header, value)` pairs in file column order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Appends a cell.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.push((header.into(), value.into()));
    }

    /// Returns the value of the first column whose normalized header matches.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        let wanted: String = normalize_header(header);
        self.cells
            .iter()
            .find(|(h, _)| normalize_header(h) == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of the first header in `aliases` that is present.
    #[must_use]
    pub fn get_any(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| self.get(alias))
    }

    /// Replaces a cell value, appending the column when it is absent.
    pub fn set(&mut self, header: &str, value: impl Into<String>) {
        let wanted: String = normalize_header(header);
        let value: String = value.into();
        match self
            .cells
            .iter_mut()
            .find(|(h, _)| normalize_header(h) == wanted)
        {
            Some(cell) => cell.1 = value,
            None => self.cells.push((header.trim().to_string(), value)),
        }
    }

    /// Returns all cells in column order.
    #[must_use]
    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    /// Returns whether every cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(h, v)| (h.into(), v.into()))
                .collect(),
        }
    }
}

/// The event year of a year-scoped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearField {
    /// No year column and no session default.
    Missing,
    /// A valid year.
    Value(EventYear),
    /// The raw text that is not a valid year.
    Invalid(String),
}

impl YearField {
    /// Returns the year when valid.
    #[must_use]
    pub const fn year(&self) -> Option<EventYear> {
        match self {
            Self::Value(year) => Some(*year),
            Self::Missing | Self::Invalid(_) => None,
        }
    }
}

/// Normalized company fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanyFields {
    /// Trimmed company name.
    pub name: String,
    /// Contact person.
    pub contact: Option<String>,
    /// Canonical phone number.
    pub phone: Option<String>,
    /// Lowercased email address.
    pub email: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-form information.
    pub info: Option<String>,
    /// Assigned categories, spelled as in the category catalogue.
    pub categories: Vec<String>,
    /// Names in the legacy categories column that match no known category.
    pub unknown_categories: Vec<String>,
}

/// Normalized subscription fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFields {
    /// Trimmed company name.
    pub company: String,
    /// The event year.
    pub year: YearField,
    /// Contact person.
    pub contact: Option<String>,
    /// Canonical phone number.
    pub phone: Option<String>,
    /// Lowercased email address.
    pub email: Option<String>,
    /// Number of booths.
    pub booth_count: Numeric,
    /// Breakfast ordered.
    pub breakfast: Flag,
    /// Number of coins.
    pub coins: Numeric,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Normalized assignment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFields {
    /// Trimmed company name.
    pub company: String,
    /// Trimmed booth label.
    pub booth: String,
    /// The event year.
    pub year: YearField,
    /// Free-form information.
    pub info: Option<String>,
}

/// Typed fields of a row, per record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedFields {
    /// Company fields.
    Company(CompanyFields),
    /// Subscription fields.
    Subscription(SubscriptionFields),
    /// Assignment fields.
    Assignment(AssignmentFields),
}

impl NormalizedFields {
    /// Returns the record kind of these fields.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Company(_) => RecordKind::Company,
            Self::Subscription(_) => RecordKind::Subscription,
            Self::Assignment(_) => RecordKind::Assignment,
        }
    }

    /// Returns the company name the row refers to.
    #[must_use]
    pub fn company_name(&self) -> &str {
        match self {
            Self::Company(f) => &f.name,
            Self::Subscription(f) => &f.company,
            Self::Assignment(f) => &f.company,
        }
    }
}

/// The natural key used to reconcile a row with existing records.
///
/// Name and booth parts are stored in natural-key form (trimmed, lowercased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchKey {
    /// Company name.
    Company {
        /// Company name key.
        company: String,
    },
    /// Company name and event year.
    Subscription {
        /// Company name key.
        company: String,
        /// Event year.
        year: EventYear,
    },
    /// Company name, booth label and event year.
    Assignment {
        /// Company name key.
        company: String,
        /// Booth label key.
        booth: String,
        /// Event year.
        year: EventYear,
    },
}

impl MatchKey {
    /// Returns the company name key.
    #[must_use]
    pub fn company(&self) -> &str {
        match self {
            Self::Company { company }
            | Self::Subscription { company, .. }
            | Self::Assignment { company, .. } => company,
        }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Company { company } => write!(f, "{company}"),
            Self::Subscription { company, year } => write!(f, "{company}|{year}"),
            Self::Assignment {
                company,
                booth,
                year,
            } => write!(f, "{company}|{booth}|{year}"),
        }
    }
}

/// What committing a row will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowAction {
    /// A new record will be created.
    Create,
    /// An existing record will be overwritten.
    Update,
    /// The row has validation errors and will not be committed.
    Error,
}

impl RowAction {
    /// Returns the display name of this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for RowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single row of an import session.
///
/// `action`, `errors` and `selected` are derived by the session; callers
/// only read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRow {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The record kind.
    pub kind: RecordKind,
    /// The cells as read from the file.
    pub raw: RawRow,
    /// The normalized fields.
    pub fields: NormalizedFields,
    pub(crate) match_key: Option<MatchKey>,
    pub(crate) existing_id: Option<i64>,
    pub(crate) action: RowAction,
    pub(crate) errors: Vec<String>,
    pub(crate) selected: bool,
}

impl ImportRow {
    /// Returns the natural key, when one could be formed.
    #[must_use]
    pub const fn match_key(&self) -> Option<&MatchKey> {
        self.match_key.as_ref()
    }

    /// Returns the id of the matched existing record.
    #[must_use]
    pub const fn existing_id(&self) -> Option<i64> {
        self.existing_id
    }

    /// Returns the derived action.
    #[must_use]
    pub const fn action(&self) -> RowAction {
        self.action
    }

    /// Returns the validation errors, in rule order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns whether the row is selected for commit.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }
}
