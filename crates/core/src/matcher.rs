// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use booth_map_domain::natural_key;

use crate::index::ExistingIndex;
use crate::row::{MatchKey, NormalizedFields, RowAction};

/// The result of reconciling one row with the existing index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// The natural key, `None` when a key part is missing or invalid.
    pub key: Option<MatchKey>,
    /// The id of the matching existing record.
    pub existing_id: Option<i64>,
    /// `Update` when the key exists, `Create` otherwise.
    pub action: RowAction,
}

/// Builds the natural key of a row.
///
/// Returns `None` when the company name, booth label or year is missing.
#[must_use]
pub fn match_key(fields: &NormalizedFields) -> Option<MatchKey> {
    let non_empty = |value: &str| {
        let key: String = natural_key(value);
        (!key.is_empty()).then_some(key)
    };

    match fields {
        NormalizedFields::Company(f) => Some(MatchKey::Company {
            company: non_empty(&f.name)?,
        }),
        NormalizedFields::Subscription(f) => Some(MatchKey::Subscription {
            company: non_empty(&f.company)?,
            year: f.year.year()?,
        }),
        NormalizedFields::Assignment(f) => Some(MatchKey::Assignment {
            company: non_empty(&f.company)?,
            booth: non_empty(&f.booth)?,
            year: f.year.year()?,
        }),
    }
}

/// Reconciles a row against the existing index.
///
/// Deterministic: the same fields and index always produce the same outcome.
/// A row without a key is classified `Create` here and forced to `Error`
/// by the validator.
#[must_use]
pub fn match_row(fields: &NormalizedFields, index: &ExistingIndex) -> MatchOutcome {
    let key: Option<MatchKey> = match_key(fields);
    let existing_id: Option<i64> = key.as_ref().and_then(|k| index.lookup(k));
    let action: RowAction = if existing_id.is_some() {
        RowAction::Update
    } else {
        RowAction::Create
    };
    MatchOutcome {
        key,
        existing_id,
        action,
    }
}
