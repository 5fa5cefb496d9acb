// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Category, company and marker lookups.

use booth_map_domain::{Category, EventYear, natural_key};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::diesel_schema::{categories, companies, markers};
use crate::error::PersistenceError;

/// Diesel Queryable struct for category rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = categories)]
struct CategoryRow {
    category_id: i64,
    name: String,
}

/// Lists the category catalogue in creation order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, PersistenceError> {
    let rows: Vec<CategoryRow> = categories::table
        .select(CategoryRow::as_select())
        .order(categories::category_id.asc())
        .load(conn)?;

    debug!(count = rows.len(), "Loaded categories");

    Ok(rows
        .into_iter()
        .map(|row| Category {
            id: row.category_id,
            name: row.name,
        })
        .collect())
}

/// Finds a category by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn category_id_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(categories::table
        .filter(categories::name_key.eq(natural_key(name)))
        .select(categories::category_id)
        .first::<i64>(conn)
        .optional()?)
}

/// Finds a company by name, case-insensitively.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn company_id_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(companies::table
        .filter(companies::name_key.eq(natural_key(name)))
        .select(companies::company_id)
        .first::<i64>(conn)
        .optional()?)
}

/// Finds the marker of a booth label in a year.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn marker_id_by_label(
    conn: &mut SqliteConnection,
    label: &str,
    year: EventYear,
) -> Result<Option<i64>, PersistenceError> {
    Ok(markers::table
        .filter(markers::label_key.eq(natural_key(label)))
        .filter(markers::year.eq(i32::from(year.year())))
        .select(markers::marker_id)
        .first::<i64>(conn)
        .optional()?)
}
