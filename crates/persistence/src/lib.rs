// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the Booth Map import pipeline.
//!
//! Built on Diesel with embedded migrations. Natural keys are enforced by
//! unique constraints on normalized key columns (`name_key`,
//! `label_key`), so concurrent writers surface as per-row conflicts.
//!
//! ## Testing
//!
//! Every `Persistence::new_in_memory()` call opens its own shared-cache
//! in-memory database, so tests are isolated without temp files.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use booth_map::{ExistingIndex, MatchKey};
use booth_map_domain::{Category, EventYear, Record, RecordKind};
use diesel::SqliteConnection;

mod backend;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use store::SqliteStore;

/// Atomic counter for unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Synchronous persistence adapter over one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates an isolated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:booth_map_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Opens (or creates) a file-based database in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8 or the database
    /// cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the write fails.
    pub fn create_category(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::catalogue::create_category(&mut self.conn, name)
    }

    /// Creates a booth marker for an event year.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is taken for that year or the write fails.
    pub fn create_marker(&mut self, label: &str, year: EventYear) -> Result<i64, PersistenceError> {
        mutations::catalogue::create_marker(&mut self.conn, label, year)
    }

    /// Creates a company with only a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the write fails.
    pub fn create_company(&mut self, name: &str) -> Result<i64, PersistenceError> {
        mutations::catalogue::create_company(&mut self.conn, name)
    }

    /// Lists the category catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_categories(&mut self) -> Result<Vec<Category>, PersistenceError> {
        queries::catalogue::list_categories(&mut self.conn)
    }

    /// Builds the existing index for an import of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_index(&mut self, kind: RecordKind) -> Result<ExistingIndex, PersistenceError> {
        queries::index::load_index(&mut self.conn, kind)
    }

    /// Looks up a record id by natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_key(&mut self, key: &MatchKey) -> Result<Option<i64>, PersistenceError> {
        queries::records::find_by_key(&mut self.conn, key)
    }

    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    pub fn create_record(&mut self, record: &Record) -> Result<i64, PersistenceError> {
        mutations::records::create_record(&mut self.conn, record)
    }

    /// Overwrites an existing record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write is rejected.
    pub fn update_record(&mut self, record: &Record) -> Result<i64, PersistenceError> {
        mutations::records::update_record(&mut self.conn, record)
    }

    /// Lists the records of `kind`, restricted to `year` for year-scoped kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_records(
        &mut self,
        kind: RecordKind,
        year: Option<EventYear>,
    ) -> Result<Vec<Record>, PersistenceError> {
        Ok(match kind {
            RecordKind::Company => queries::records::list_companies(&mut self.conn)?
                .into_iter()
                .map(Record::Company)
                .collect(),
            RecordKind::Subscription => queries::records::list_subscriptions(&mut self.conn, year)?
                .into_iter()
                .map(Record::Subscription)
                .collect(),
            RecordKind::Assignment => queries::records::list_assignments(&mut self.conn, year)?
                .into_iter()
                .map(Record::Assignment)
                .collect(),
        })
    }
}
