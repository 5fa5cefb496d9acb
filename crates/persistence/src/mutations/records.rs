// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record writes.
//!
//! Each write runs in its own transaction so a failed record leaves no
//! partial state (e.g. a company without its categories).

use booth_map_domain::{
    AssignmentRecord, CompanyRecord, EventYear, Record, SubscriptionRecord, natural_key,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::{assignments, companies, company_categories, subscriptions};
use crate::error::PersistenceError;
use crate::queries::catalogue::{category_id_by_name, company_id_by_name, marker_id_by_label};

fn count_to_db(field: &str, value: u32) -> Result<i32, PersistenceError> {
    i32::try_from(value).map_err(|_| PersistenceError::InvalidValue(format!("{field} {value}")))
}

fn year_to_db(year: EventYear) -> i32 {
    i32::from(year.year())
}

fn require_id(record: &Record) -> Result<i64, PersistenceError> {
    let id: Option<i64> = match record {
        Record::Company(c) => c.id,
        Record::Subscription(s) => s.id,
        Record::Assignment(a) => a.id,
    };
    id.ok_or_else(|| PersistenceError::NotFound(format!("{} record without id", record.kind())))
}

fn ensure_updated(updated: usize, what: &str, id: i64) -> Result<(), PersistenceError> {
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("{what} {id}")));
    }
    Ok(())
}

fn resolve_company(
    conn: &mut SqliteConnection,
    company_id: Option<i64>,
    company_name: &str,
) -> Result<i64, PersistenceError> {
    match company_id {
        Some(id) => Ok(id),
        None => company_id_by_name(conn, company_name)?
            .ok_or_else(|| PersistenceError::NotFound(format!("company '{company_name}'"))),
    }
}

fn resolve_marker(
    conn: &mut SqliteConnection,
    marker_id: Option<i64>,
    booth: &str,
    year: EventYear,
) -> Result<i64, PersistenceError> {
    match marker_id {
        Some(id) => Ok(id),
        None => marker_id_by_label(conn, booth, year)?
            .ok_or_else(|| PersistenceError::NotFound(format!("booth '{booth}' in {year}"))),
    }
}

/// Replaces the category links of a company.
fn replace_categories(
    conn: &mut SqliteConnection,
    company_id: i64,
    names: &[String],
) -> Result<(), PersistenceError> {
    diesel::delete(company_categories::table.filter(company_categories::company_id.eq(company_id)))
        .execute(conn)?;

    let mut category_ids: Vec<i64> = Vec::with_capacity(names.len());
    for name in names {
        let category_id: i64 = category_id_by_name(conn, name)?
            .ok_or_else(|| PersistenceError::NotFound(format!("category '{name}'")))?;
        if !category_ids.contains(&category_id) {
            category_ids.push(category_id);
        }
    }

    let links: Vec<_> = category_ids
        .iter()
        .map(|category_id| {
            (
                company_categories::company_id.eq(company_id),
                company_categories::category_id.eq(*category_id),
            )
        })
        .collect();
    if !links.is_empty() {
        diesel::insert_into(company_categories::table)
            .values(links)
            .execute(conn)?;
    }
    Ok(())
}

fn insert_company(
    conn: &mut SqliteConnection,
    record: &CompanyRecord,
) -> Result<i64, PersistenceError> {
    let company_id: i64 = diesel::insert_into(companies::table)
        .values((
            companies::name.eq(record.name.trim()),
            companies::name_key.eq(natural_key(&record.name)),
            companies::contact.eq(record.contact.as_deref()),
            companies::phone.eq(record.phone.as_deref()),
            companies::email.eq(record.email.as_deref()),
            companies::website.eq(record.website.as_deref()),
            companies::info.eq(record.info.as_deref()),
        ))
        .returning(companies::company_id)
        .get_result(conn)?;
    replace_categories(conn, company_id, &record.categories)?;
    Ok(company_id)
}

fn overwrite_company(
    conn: &mut SqliteConnection,
    id: i64,
    record: &CompanyRecord,
) -> Result<i64, PersistenceError> {
    let updated: usize = diesel::update(companies::table.filter(companies::company_id.eq(id)))
        .set((
            companies::name.eq(record.name.trim()),
            companies::name_key.eq(natural_key(&record.name)),
            companies::contact.eq(record.contact.as_deref()),
            companies::phone.eq(record.phone.as_deref()),
            companies::email.eq(record.email.as_deref()),
            companies::website.eq(record.website.as_deref()),
            companies::info.eq(record.info.as_deref()),
        ))
        .execute(conn)?;
    ensure_updated(updated, "company", id)?;
    replace_categories(conn, id, &record.categories)?;
    Ok(id)
}

fn insert_subscription(
    conn: &mut SqliteConnection,
    record: &SubscriptionRecord,
) -> Result<i64, PersistenceError> {
    let company_id: i64 = resolve_company(conn, record.company_id, &record.company_name)?;
    Ok(diesel::insert_into(subscriptions::table)
        .values((
            subscriptions::company_id.eq(company_id),
            subscriptions::year.eq(year_to_db(record.year)),
            subscriptions::contact.eq(record.contact.as_deref()),
            subscriptions::phone.eq(record.phone.as_deref()),
            subscriptions::email.eq(record.email.as_deref()),
            subscriptions::booth_count.eq(count_to_db("booth_count", record.booth_count)?),
            subscriptions::breakfast.eq(i32::from(record.breakfast)),
            subscriptions::coins.eq(count_to_db("coins", record.coins)?),
            subscriptions::notes.eq(record.notes.as_deref()),
        ))
        .returning(subscriptions::subscription_id)
        .get_result(conn)?)
}

fn overwrite_subscription(
    conn: &mut SqliteConnection,
    id: i64,
    record: &SubscriptionRecord,
) -> Result<i64, PersistenceError> {
    let company_id: i64 = resolve_company(conn, record.company_id, &record.company_name)?;
    let updated: usize = diesel::update(
        subscriptions::table.filter(subscriptions::subscription_id.eq(id)),
    )
    .set((
        subscriptions::company_id.eq(company_id),
        subscriptions::year.eq(year_to_db(record.year)),
        subscriptions::contact.eq(record.contact.as_deref()),
        subscriptions::phone.eq(record.phone.as_deref()),
        subscriptions::email.eq(record.email.as_deref()),
        subscriptions::booth_count.eq(count_to_db("booth_count", record.booth_count)?),
        subscriptions::breakfast.eq(i32::from(record.breakfast)),
        subscriptions::coins.eq(count_to_db("coins", record.coins)?),
        subscriptions::notes.eq(record.notes.as_deref()),
    ))
    .execute(conn)?;
    ensure_updated(updated, "subscription", id)?;
    Ok(id)
}

fn insert_assignment(
    conn: &mut SqliteConnection,
    record: &AssignmentRecord,
) -> Result<i64, PersistenceError> {
    let company_id: i64 = resolve_company(conn, record.company_id, &record.company_name)?;
    let marker_id: i64 = resolve_marker(conn, record.marker_id, &record.booth, record.year)?;
    Ok(diesel::insert_into(assignments::table)
        .values((
            assignments::company_id.eq(company_id),
            assignments::marker_id.eq(marker_id),
            assignments::year.eq(year_to_db(record.year)),
            assignments::info.eq(record.info.as_deref()),
        ))
        .returning(assignments::assignment_id)
        .get_result(conn)?)
}

fn overwrite_assignment(
    conn: &mut SqliteConnection,
    id: i64,
    record: &AssignmentRecord,
) -> Result<i64, PersistenceError> {
    let company_id: i64 = resolve_company(conn, record.company_id, &record.company_name)?;
    let marker_id: i64 = resolve_marker(conn, record.marker_id, &record.booth, record.year)?;
    let updated: usize =
        diesel::update(assignments::table.filter(assignments::assignment_id.eq(id)))
            .set((
                assignments::company_id.eq(company_id),
                assignments::marker_id.eq(marker_id),
                assignments::year.eq(year_to_db(record.year)),
                assignments::info.eq(record.info.as_deref()),
            ))
            .execute(conn)?;
    ensure_updated(updated, "assignment", id)?;
    Ok(id)
}

/// Creates a record and returns its id.
///
/// # Errors
///
/// Returns an error if a uniqueness or reference constraint rejects the
/// record, or the database write fails.
pub fn create_record(conn: &mut SqliteConnection, record: &Record) -> Result<i64, PersistenceError> {
    debug!(kind = %record.kind(), "Creating record");
    conn.transaction::<i64, PersistenceError, _>(|conn| match record {
        Record::Company(company) => insert_company(conn, company),
        Record::Subscription(subscription) => insert_subscription(conn, subscription),
        Record::Assignment(assignment) => insert_assignment(conn, assignment),
    })
}

/// Overwrites the record identified by its `id` with every field of `record`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the record has no id or no row
/// matches it, or another error if the write is rejected.
pub fn update_record(conn: &mut SqliteConnection, record: &Record) -> Result<i64, PersistenceError> {
    let id: i64 = require_id(record)?;
    debug!(kind = %record.kind(), id, "Updating record");
    conn.transaction::<i64, PersistenceError, _>(|conn| match record {
        Record::Company(company) => overwrite_company(conn, id, company),
        Record::Subscription(subscription) => overwrite_subscription(conn, id, subscription),
        Record::Assignment(assignment) => overwrite_assignment(conn, id, assignment),
    })
}
