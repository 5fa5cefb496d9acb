// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record listing and natural-key lookups.

use std::collections::HashMap;

use booth_map::MatchKey;
use booth_map_domain::{AssignmentRecord, CompanyRecord, EventYear, SubscriptionRecord};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::{
    assignments, categories, companies, company_categories, markers, subscriptions,
};
use crate::error::PersistenceError;
use crate::queries::{count_from_db, event_year_from_db};

/// Diesel Queryable struct for company rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = companies)]
struct CompanyRow {
    company_id: i64,
    name: String,
    contact: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    info: Option<String>,
}

/// Diesel Queryable struct for subscription rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
struct SubscriptionRow {
    subscription_id: i64,
    company_id: i64,
    year: i32,
    contact: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    booth_count: i32,
    breakfast: i32,
    coins: i32,
    notes: Option<String>,
}

/// Diesel Queryable struct for assignment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = assignments)]
struct AssignmentRow {
    assignment_id: i64,
    company_id: i64,
    marker_id: i64,
    year: i32,
    info: Option<String>,
}

fn category_names_by_company(
    conn: &mut SqliteConnection,
) -> Result<HashMap<i64, Vec<String>>, PersistenceError> {
    let pairs: Vec<(i64, String)> = company_categories::table
        .inner_join(categories::table)
        .select((company_categories::company_id, categories::name))
        .order(categories::category_id.asc())
        .load(conn)?;

    let mut by_company: HashMap<i64, Vec<String>> = HashMap::new();
    for (company_id, name) in pairs {
        by_company.entry(company_id).or_default().push(name);
    }
    Ok(by_company)
}

/// Lists all companies ordered by name, with their categories.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_companies(conn: &mut SqliteConnection) -> Result<Vec<CompanyRecord>, PersistenceError> {
    let rows: Vec<CompanyRow> = companies::table
        .select(CompanyRow::as_select())
        .order(companies::name_key.asc())
        .load(conn)?;
    let mut categories_by_company: HashMap<i64, Vec<String>> = category_names_by_company(conn)?;

    debug!(count = rows.len(), "Loaded companies");

    Ok(rows
        .into_iter()
        .map(|row| CompanyRecord {
            id: Some(row.company_id),
            categories: categories_by_company
                .remove(&row.company_id)
                .unwrap_or_default(),
            name: row.name,
            contact: row.contact,
            phone: row.phone,
            email: row.email,
            website: row.website,
            info: row.info,
        })
        .collect())
}

/// Lists subscriptions ordered by company name and year.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `year` - Restricts the result to one event year when set
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is
/// out of range.
pub fn list_subscriptions(
    conn: &mut SqliteConnection,
    year: Option<EventYear>,
) -> Result<Vec<SubscriptionRecord>, PersistenceError> {
    let mut query = subscriptions::table
        .inner_join(companies::table)
        .select((SubscriptionRow::as_select(), companies::name))
        .order((companies::name_key.asc(), subscriptions::year.asc()))
        .into_boxed();
    if let Some(year) = year {
        query = query.filter(subscriptions::year.eq(i32::from(year.year())));
    }
    let rows: Vec<(SubscriptionRow, String)> = query.load(conn)?;

    debug!(count = rows.len(), ?year, "Loaded subscriptions");

    rows.into_iter()
        .map(|(row, company_name)| {
            Ok(SubscriptionRecord {
                id: Some(row.subscription_id),
                company_id: Some(row.company_id),
                company_name,
                year: event_year_from_db(row.year)?,
                contact: row.contact,
                phone: row.phone,
                email: row.email,
                booth_count: count_from_db("booth_count", row.booth_count)?,
                breakfast: row.breakfast != 0,
                coins: count_from_db("coins", row.coins)?,
                notes: row.notes,
            })
        })
        .collect()
}

/// Lists assignments ordered by company name, year and booth.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `year` - Restricts the result to one event year when set
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is
/// out of range.
pub fn list_assignments(
    conn: &mut SqliteConnection,
    year: Option<EventYear>,
) -> Result<Vec<AssignmentRecord>, PersistenceError> {
    let mut query = assignments::table
        .inner_join(companies::table)
        .inner_join(markers::table)
        .select((AssignmentRow::as_select(), companies::name, markers::label))
        .order((
            companies::name_key.asc(),
            assignments::year.asc(),
            markers::label_key.asc(),
        ))
        .into_boxed();
    if let Some(year) = year {
        query = query.filter(assignments::year.eq(i32::from(year.year())));
    }
    let rows: Vec<(AssignmentRow, String, String)> = query.load(conn)?;

    debug!(count = rows.len(), ?year, "Loaded assignments");

    rows.into_iter()
        .map(|(row, company_name, booth)| {
            Ok(AssignmentRecord {
                id: Some(row.assignment_id),
                company_id: Some(row.company_id),
                company_name,
                marker_id: Some(row.marker_id),
                booth,
                year: event_year_from_db(row.year)?,
                info: row.info,
            })
        })
        .collect()
}

/// Looks up the id of the record identified by a natural key.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_by_key(
    conn: &mut SqliteConnection,
    key: &MatchKey,
) -> Result<Option<i64>, PersistenceError> {
    let id: Option<i64> = match key {
        MatchKey::Company { company } => companies::table
            .filter(companies::name_key.eq(company))
            .select(companies::company_id)
            .first::<i64>(conn)
            .optional()?,
        MatchKey::Subscription { company, year } => subscriptions::table
            .inner_join(companies::table)
            .filter(companies::name_key.eq(company))
            .filter(subscriptions::year.eq(i32::from(year.year())))
            .select(subscriptions::subscription_id)
            .first::<i64>(conn)
            .optional()?,
        MatchKey::Assignment {
            company,
            booth,
            year,
        } => assignments::table
            .inner_join(companies::table)
            .inner_join(markers::table)
            .filter(companies::name_key.eq(company))
            .filter(markers::label_key.eq(booth))
            .filter(assignments::year.eq(i32::from(year.year())))
            .select(assignments::assignment_id)
            .first::<i64>(conn)
            .optional()?,
    };
    Ok(id)
}
