// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use booth_map::{ExistingIndex, MatchKey, RecordStore, StoreError, WriteResults};
use booth_map_domain::{Category, EventYear, Record, RecordKind};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Persistence;

/// `RecordStore` backed by a shared `Persistence` connection.
///
/// Calls are serialized on the connection mutex.
#[derive(Clone)]
pub struct SqliteStore {
    persistence: Arc<Mutex<Persistence>>,
}

impl SqliteStore {
    /// Wraps a persistence adapter.
    #[must_use]
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
        }
    }

    /// Returns the shared adapter, for catalogue maintenance.
    #[must_use]
    pub fn persistence(&self) -> Arc<Mutex<Persistence>> {
        Arc::clone(&self.persistence)
    }
}

impl RecordStore for SqliteStore {
    async fn load_index(&self, kind: RecordKind) -> Result<ExistingIndex, StoreError> {
        let mut persistence = self.persistence.lock().await;
        Ok(persistence.load_index(kind)?)
    }

    async fn find_by_key(&self, key: &MatchKey) -> Result<Option<i64>, StoreError> {
        let mut persistence = self.persistence.lock().await;
        Ok(persistence.find_by_key(key)?)
    }

    async fn create_many(&self, records: Vec<Record>) -> Result<WriteResults, StoreError> {
        let mut persistence = self.persistence.lock().await;
        debug!(count = records.len(), "Creating records");
        Ok(records
            .iter()
            .map(|record| {
                persistence.create_record(record).map_err(|err| {
                    warn!(error = %err, "Record create rejected");
                    StoreError::from(err)
                })
            })
            .collect())
    }

    async fn update_many(&self, records: Vec<Record>) -> Result<WriteResults, StoreError> {
        let mut persistence = self.persistence.lock().await;
        debug!(count = records.len(), "Updating records");
        Ok(records
            .iter()
            .map(|record| {
                persistence.update_record(record).map_err(|err| {
                    warn!(error = %err, "Record update rejected");
                    StoreError::from(err)
                })
            })
            .collect())
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        year: Option<EventYear>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut persistence = self.persistence.lock().await;
        Ok(persistence.list_records(kind, year)?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut persistence = self.persistence.lock().await;
        Ok(persistence.list_categories()?)
    }
}
