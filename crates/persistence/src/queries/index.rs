// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Existing index construction.
//!
//! One bulk query per table, regardless of file size.

use booth_map::ExistingIndex;
use booth_map_domain::RecordKind;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::{assignments, categories, companies, markers, subscriptions};
use crate::error::PersistenceError;
use crate::queries::event_year_from_db;

fn index_companies(
    conn: &mut SqliteConnection,
    index: &mut ExistingIndex,
) -> Result<(), PersistenceError> {
    let rows: Vec<(i64, String)> = companies::table
        .select((companies::company_id, companies::name))
        .load(conn)?;
    for (id, name) in rows {
        index.insert_company(&name, id);
    }
    Ok(())
}

fn index_categories(
    conn: &mut SqliteConnection,
    index: &mut ExistingIndex,
) -> Result<(), PersistenceError> {
    let names: Vec<String> = categories::table
        .select(categories::name)
        .order(categories::category_id.asc())
        .load(conn)?;
    for name in names {
        index.insert_category(&name);
    }
    Ok(())
}

fn index_subscriptions(
    conn: &mut SqliteConnection,
    index: &mut ExistingIndex,
) -> Result<(), PersistenceError> {
    let rows: Vec<(i64, i32, String)> = subscriptions::table
        .inner_join(companies::table)
        .select((
            subscriptions::subscription_id,
            subscriptions::year,
            companies::name,
        ))
        .load(conn)?;
    for (id, year, company) in rows {
        index.insert_subscription(&company, event_year_from_db(year)?, id);
    }
    Ok(())
}

fn index_booths(
    conn: &mut SqliteConnection,
    index: &mut ExistingIndex,
) -> Result<(), PersistenceError> {
    let booths: Vec<(i64, i32, String)> = markers::table
        .select((markers::marker_id, markers::year, markers::label))
        .load(conn)?;
    for (id, year, label) in booths {
        index.insert_booth(&label, event_year_from_db(year)?, id);
    }

    let rows: Vec<(i64, i32, String, String)> = assignments::table
        .inner_join(companies::table)
        .inner_join(markers::table)
        .select((
            assignments::assignment_id,
            assignments::year,
            companies::name,
            markers::label,
        ))
        .load(conn)?;
    for (id, year, company, booth) in rows {
        index.insert_assignment(&company, &booth, event_year_from_db(year)?, id);
    }
    Ok(())
}

/// Builds the existing index needed to classify rows of `kind`.
///
/// Companies are always indexed since every kind references them.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn load_index(
    conn: &mut SqliteConnection,
    kind: RecordKind,
) -> Result<ExistingIndex, PersistenceError> {
    let mut index: ExistingIndex = ExistingIndex::new();
    index_companies(conn, &mut index)?;

    match kind {
        RecordKind::Company => index_categories(conn, &mut index)?,
        RecordKind::Subscription => index_subscriptions(conn, &mut index)?,
        RecordKind::Assignment => index_booths(conn, &mut index)?,
    }

    debug!(%kind, companies = index.company_count(), "Loaded existing index");
    Ok(index)
}
