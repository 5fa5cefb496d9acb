// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The three record kinds handled by the import/export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Exhibiting companies. Global, not scoped to an event year.
    Company,
    /// A company's subscription to one event year.
    Subscription,
    /// A company occupying a booth in one event year.
    Assignment,
}

impl RecordKind {
    /// All record kinds, in dependency order.
    pub const ALL: [Self; 3] = [Self::Company, Self::Subscription, Self::Assignment];

    /// Returns the URL and file name slug for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Subscription => "subscriptions",
            Self::Assignment => "assignments",
        }
    }

    /// Returns whether records of this kind belong to an event year.
    #[must_use]
    pub const fn is_year_scoped(&self) -> bool {
        matches!(self, Self::Subscription | Self::Assignment)
    }
}

impl FromStr for RecordKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "companies" | "company" => Ok(Self::Company),
            "subscriptions" | "subscription" => Ok(Self::Subscription),
            "assignments" | "assignment" => Ok(Self::Assignment),
            _ => Err(DomainError::UnknownRecordKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event year (e.g., 2026).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventYear {
    year: u16,
}

impl EventYear {
    /// Creates a new `EventYear`.
    ///
    /// Range checks happen in `validate_event_year`.
    #[must_use]
    pub const fn new(year: u16) -> Self {
        Self { year }
    }

    /// Returns the year value.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }
}

impl std::fmt::Display for EventYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.year)
    }
}

/// A yes/no value read from a spreadsheet cell.
///
/// Unrecognized tokens are carried as-is so the validator can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    /// A recognized token.
    Set(bool),
    /// A token that is neither a known true nor a known false value.
    Unrecognized(String),
}

impl Flag {
    /// Returns the boolean value, treating unrecognized tokens as `false`.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(true))
    }
}

/// A non-negative integer read from a spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Numeric {
    /// A parsed value.
    Value(u32),
    /// The raw text that could not be parsed.
    Invalid(String),
}

impl Numeric {
    /// Returns the parsed value, or zero when unparseable.
    #[must_use]
    pub const fn value_or_zero(&self) -> u32 {
        match self {
            Self::Value(v) => *v,
            Self::Invalid(_) => 0,
        }
    }
}

/// A category companies can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The persisted identifier.
    pub id: i64,
    /// The display name, also used as the export column header.
    pub name: String,
}

/// A company record as stored and exported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// The persisted identifier, `None` before creation.
    pub id: Option<i64>,
    /// The company name (natural key, case-insensitive).
    pub name: String,
    /// Contact person.
    pub contact: Option<String>,
    /// Canonical phone number.
    pub phone: Option<String>,
    /// Lowercased email address.
    pub email: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-form information shown on the map.
    pub info: Option<String>,
    /// Assigned category names.
    pub categories: Vec<String>,
}

/// A company's subscription to an event year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// The persisted identifier, `None` before creation.
    pub id: Option<i64>,
    /// The subscribed company's identifier.
    pub company_id: Option<i64>,
    /// The subscribed company's name.
    pub company_name: String,
    /// The event year.
    pub year: EventYear,
    /// Contact person for this event.
    pub contact: Option<String>,
    /// Canonical phone number for this event.
    pub phone: Option<String>,
    /// Lowercased email address for this event.
    pub email: Option<String>,
    /// Number of booths requested.
    pub booth_count: u32,
    /// Whether breakfast is ordered.
    pub breakfast: bool,
    /// Number of coins handed out.
    pub coins: u32,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A company assigned to a booth for an event year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// The persisted identifier, `None` before creation.
    pub id: Option<i64>,
    /// The assigned company's identifier.
    pub company_id: Option<i64>,
    /// The assigned company's name.
    pub company_name: String,
    /// The booth marker identifier.
    pub marker_id: Option<i64>,
    /// The booth label as shown on the map.
    pub booth: String,
    /// The event year.
    pub year: EventYear,
    /// Free-form information.
    pub info: Option<String>,
}

/// Any record handled by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// A company.
    Company(CompanyRecord),
    /// A subscription.
    Subscription(SubscriptionRecord),
    /// An assignment.
    Assignment(AssignmentRecord),
}

impl Record {
    /// Returns the kind of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Company(_) => RecordKind::Company,
            Self::Subscription(_) => RecordKind::Subscription,
            Self::Assignment(_) => RecordKind::Assignment,
        }
    }
}
