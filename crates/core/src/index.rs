// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use booth_map_domain::{EventYear, natural_key};

use crate::row::MatchKey;

/// A read-only snapshot of existing natural keys, built once per session.
///
/// All names and booth labels are stored in natural-key form, so lookups
/// are case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingIndex {
    companies: HashMap<String, i64>,
    subscriptions: HashMap<(String, EventYear), i64>,
    assignments: HashMap<(String, String, EventYear), i64>,
    booths: HashMap<(String, EventYear), i64>,
    occupants: HashMap<(String, EventYear), String>,
    categories: Vec<String>,
}

impl ExistingIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an existing company.
    pub fn insert_company(&mut self, name: &str, id: i64) {
        self.companies.insert(natural_key(name), id);
    }

    /// Records an existing subscription.
    pub fn insert_subscription(&mut self, company: &str, year: EventYear, id: i64) {
        self.subscriptions.insert((natural_key(company), year), id);
    }

    /// Records an existing assignment. The booth becomes occupied by `company`.
    pub fn insert_assignment(&mut self, company: &str, booth: &str, year: EventYear, id: i64) {
        let company: String = natural_key(company);
        let booth: String = natural_key(booth);
        self.occupants
            .insert((booth.clone(), year), company.clone());
        self.assignments.insert((company, booth, year), id);
    }

    /// Records a booth that exists for the given year.
    pub fn insert_booth(&mut self, booth: &str, year: EventYear, marker_id: i64) {
        self.booths.insert((natural_key(booth), year), marker_id);
    }

    /// Records a known category. Duplicates (case-insensitive) are ignored.
    pub fn insert_category(&mut self, name: &str) {
        let trimmed: &str = name.trim();
        if trimmed.is_empty() || self.category_named(trimmed).is_some() {
            return;
        }
        self.categories.push(trimmed.to_string());
    }

    /// Looks up the id of the record identified by `key`.
    #[must_use]
    pub fn lookup(&self, key: &MatchKey) -> Option<i64> {
        match key {
            MatchKey::Company { company } => self.companies.get(company).copied(),
            MatchKey::Subscription { company, year } => self
                .subscriptions
                .get(&(company.clone(), *year))
                .copied(),
            MatchKey::Assignment {
                company,
                booth,
                year,
            } => self
                .assignments
                .get(&(company.clone(), booth.clone(), *year))
                .copied(),
        }
    }

    /// Returns the id of the company with this name.
    #[must_use]
    pub fn company_id(&self, name: &str) -> Option<i64> {
        self.companies.get(&natural_key(name)).copied()
    }

    /// Returns the marker id of a booth in a year.
    #[must_use]
    pub fn booth_marker(&self, booth: &str, year: EventYear) -> Option<i64> {
        self.booths.get(&(natural_key(booth), year)).copied()
    }

    /// Returns the natural key of the company occupying a booth in a year.
    #[must_use]
    pub fn booth_occupant(&self, booth: &str, year: EventYear) -> Option<&str> {
        self.occupants
            .get(&(natural_key(booth), year))
            .map(String::as_str)
    }

    /// Returns the catalogue spelling of a category, matched case-insensitively.
    #[must_use]
    pub fn category_named(&self, name: &str) -> Option<&str> {
        let wanted: String = natural_key(name);
        self.categories
            .iter()
            .find(|known| natural_key(known) == wanted)
            .map(String::as_str)
    }

    /// Returns the known categories in catalogue order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the number of indexed companies.
    #[must_use]
    pub fn company_count(&self) -> usize {
        self.companies.len()
    }
}
