// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use booth_map_domain::{EventYear, natural_key};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::diesel_schema::{categories, companies, markers};
use crate::error::PersistenceError;

/// Creates a category.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if a category with the same
/// name (case-insensitive) exists.
pub fn create_category(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    let name: &str = name.trim();
    let category_id: i64 = diesel::insert_into(categories::table)
        .values((
            categories::name.eq(name),
            categories::name_key.eq(natural_key(name)),
        ))
        .returning(categories::category_id)
        .get_result(conn)?;

    info!(category_id, name, "Created category");
    Ok(category_id)
}

/// Creates a booth marker for an event year.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the label already exists
/// in that year.
pub fn create_marker(
    conn: &mut SqliteConnection,
    label: &str,
    year: EventYear,
) -> Result<i64, PersistenceError> {
    let label: &str = label.trim();
    let marker_id: i64 = diesel::insert_into(markers::table)
        .values((
            markers::year.eq(i32::from(year.year())),
            markers::label.eq(label),
            markers::label_key.eq(natural_key(label)),
        ))
        .returning(markers::marker_id)
        .get_result(conn)?;

    info!(marker_id, label, %year, "Created marker");
    Ok(marker_id)
}

/// Creates a company with only a name.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the name is taken.
pub fn create_company(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    let name: &str = name.trim();
    let company_id: i64 = diesel::insert_into(companies::table)
        .values((
            companies::name.eq(name),
            companies::name_key.eq(natural_key(name)),
        ))
        .returning(companies::company_id)
        .get_result(conn)?;

    info!(company_id, name, "Created company");
    Ok(company_id)
}
