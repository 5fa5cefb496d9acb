// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::future::Future;

use booth_map_domain::{
    AssignmentRecord, Category, CompanyRecord, EventYear, Record, RecordKind, SubscriptionRecord,
};

use crate::error::StoreError;
use crate::index::ExistingIndex;
use crate::row::{ImportRow, MatchKey, NormalizedFields};

/// Per-record results of a bulk write, in input order.
pub type WriteResults = Vec<Result<i64, StoreError>>;

/// The persistence seam of the import pipeline.
///
/// Bulk writes return one result per record so a single bad record does
/// not fail its neighbours. An outer `Err` means the whole request failed.
pub trait RecordStore: Send + Sync {
    /// Loads the natural keys needed to classify rows of `kind`.
    fn load_index(
        &self,
        kind: RecordKind,
    ) -> impl Future<Output = Result<ExistingIndex, StoreError>> + Send;

    /// Looks up the id of the record identified by `key`.
    fn find_by_key(
        &self,
        key: &MatchKey,
    ) -> impl Future<Output = Result<Option<i64>, StoreError>> + Send;

    /// Creates records, returning the new ids.
    fn create_many(
        &self,
        records: Vec<Record>,
    ) -> impl Future<Output = Result<WriteResults, StoreError>> + Send;

    /// Overwrites existing records identified by their `id`.
    fn update_many(
        &self,
        records: Vec<Record>,
    ) -> impl Future<Output = Result<WriteResults, StoreError>> + Send;

    /// Lists the records of `kind`, restricted to `year` for year-scoped kinds.
    fn list_records(
        &self,
        kind: RecordKind,
        year: Option<EventYear>,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Lists the category catalogue.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;
}

/// Builds the record a committed row writes.
///
/// Company and booth references are resolved through the session index.
/// Returns `None` for rows without a valid year, which never pass
/// validation.
#[must_use]
pub fn record_from_row(row: &ImportRow, index: &ExistingIndex) -> Option<Record> {
    let id: Option<i64> = row.existing_id();
    let record: Record = match &row.fields {
        NormalizedFields::Company(f) => Record::Company(CompanyRecord {
            id,
            name: f.name.clone(),
            contact: f.contact.clone(),
            phone: f.phone.clone(),
            email: f.email.clone(),
            website: f.website.clone(),
            info: f.info.clone(),
            categories: f.categories.clone(),
        }),
        NormalizedFields::Subscription(f) => Record::Subscription(SubscriptionRecord {
            id,
            company_id: index.company_id(&f.company),
            company_name: f.company.clone(),
            year: f.year.year()?,
            contact: f.contact.clone(),
            phone: f.phone.clone(),
            email: f.email.clone(),
            booth_count: f.booth_count.value_or_zero(),
            breakfast: f.breakfast.is_set(),
            coins: f.coins.value_or_zero(),
            notes: f.notes.clone(),
        }),
        NormalizedFields::Assignment(f) => {
            let year: EventYear = f.year.year()?;
            Record::Assignment(AssignmentRecord {
                id,
                company_id: index.company_id(&f.company),
                company_name: f.company.clone(),
                marker_id: index.booth_marker(&f.booth, year),
                booth: f.booth.clone(),
                year,
                info: f.info.clone(),
            })
        }
    };
    Some(record)
}
