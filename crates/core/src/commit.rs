// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batched commit of selected rows.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use booth_map_domain::Record;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_BATCH_SIZE, ImportConfig};
use crate::error::{CoreError, StoreError};
use crate::index::ExistingIndex;
use crate::row::{ImportRow, MatchKey, RowAction};
use crate::session::ImportSession;
use crate::store::{RecordStore, WriteResults, record_from_row};

/// Reason recorded for rows skipped by cancellation.
pub const CANCELLED_REASON: &str = "cancelled before commit";

/// Cooperative cancellation flag, checked before each batch.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates a handle that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The batch in flight still completes.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress emitted after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitProgress {
    /// The 1-based number of the batch just finished.
    pub batch: usize,
    /// Total number of batches.
    pub batches: usize,
    /// Rows processed so far.
    pub processed: usize,
    /// Rows selected for commit.
    pub total: usize,
    /// Rows written so far.
    pub succeeded: usize,
    /// Rows failed so far.
    pub failed: usize,
}

/// Final state of a committed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    /// A record was created.
    Created,
    /// A record was overwritten.
    Updated,
    /// The write failed.
    Failed,
}

/// Per-row result of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// The 1-based file row number.
    pub row_number: usize,
    /// The natural key in display form.
    pub key: Option<String>,
    /// The action the row was committed with.
    pub action: RowAction,
    /// What happened.
    pub status: OutcomeStatus,
    /// The id of the written record, or of the conflicting one.
    pub record_id: Option<i64>,
    /// Why the write failed.
    pub reason: Option<String>,
}

/// A row that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRow {
    /// The 1-based file row number.
    pub row_number: usize,
    /// The natural key in display form.
    pub key: Option<String>,
    /// Why the write failed.
    pub reason: String,
}

/// Summary of a commit run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CommitReport {
    /// Rows written.
    pub succeeded: usize,
    /// Rows not written, in file order.
    pub failed: Vec<FailedRow>,
    /// Rows selected for commit.
    pub total: usize,
    /// Every selected row's outcome, in file order.
    pub outcomes: Vec<RowOutcome>,
    /// Whether the run stopped early.
    pub cancelled: bool,
}

impl CommitReport {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome.status {
            OutcomeStatus::Created | OutcomeStatus::Updated => self.succeeded += 1,
            OutcomeStatus::Failed => self.failed.push(FailedRow {
                row_number: outcome.row_number,
                key: outcome.key.clone(),
                reason: outcome.reason.clone().unwrap_or_default(),
            }),
        }
        self.outcomes.push(outcome);
    }
}

/// A selected row ready to be written.
struct Pending {
    row_number: usize,
    key: Option<MatchKey>,
    action: RowAction,
    record: Option<Record>,
}

impl Pending {
    fn from_row(row: &ImportRow, index: &ExistingIndex) -> Self {
        Self {
            row_number: row.row_number,
            key: row.match_key().cloned(),
            action: row.action(),
            record: record_from_row(row, index),
        }
    }

    fn failed(&self, reason: String, record_id: Option<i64>) -> RowOutcome {
        RowOutcome {
            row_number: self.row_number,
            key: self.key.as_ref().map(ToString::to_string),
            action: self.action,
            status: OutcomeStatus::Failed,
            record_id,
            reason: Some(reason),
        }
    }

    fn written(&self, record_id: i64) -> RowOutcome {
        let status: OutcomeStatus = if self.action == RowAction::Update {
            OutcomeStatus::Updated
        } else {
            OutcomeStatus::Created
        };
        RowOutcome {
            row_number: self.row_number,
            key: self.key.as_ref().map(ToString::to_string),
            action: self.action,
            status,
            record_id: Some(record_id),
            reason: None,
        }
    }
}

/// Writes the selected rows of a session in sequential, fixed-size batches.
#[derive(Debug, Clone)]
pub struct BatchCommitter {
    batch_size: usize,
    cancel: Option<CancelHandle>,
}

impl Default for BatchCommitter {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchCommitter {
    /// Creates a committer. A batch size of zero is treated as one.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            cancel: None,
        }
    }

    /// Creates a committer from the pipeline configuration.
    #[must_use]
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.effective_batch_size())
    }

    /// Attaches a cancellation handle.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Returns the batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled)
    }

    /// Commits the selected rows of `session`.
    ///
    /// Batches run one after another in file order. A failed row or a
    /// failed batch is recorded in the report and the run continues.
    /// `on_progress` is called once after every batch.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPhase` unless the session is `PreviewReady`.
    /// Store failures never surface here; they are part of the report.
    pub async fn commit<S, F>(
        &self,
        session: &mut ImportSession,
        store: &S,
        mut on_progress: F,
    ) -> Result<CommitReport, CoreError>
    where
        S: RecordStore,
        F: FnMut(&CommitProgress) + Send,
    {
        session.begin_commit()?;

        let pending: Vec<Pending> = session
            .selected_rows()
            .map(|row| Pending::from_row(row, session.index()))
            .collect();
        let total: usize = pending.len();
        let batches: usize = total.div_ceil(self.batch_size);

        info!(
            kind = %session.kind(),
            total,
            batches,
            batch_size = self.batch_size,
            "Starting import commit"
        );

        let mut report: CommitReport = CommitReport {
            total,
            ..CommitReport::default()
        };

        for (number, batch) in pending.chunks(self.batch_size).enumerate() {
            if self.is_cancelled() {
                let skipped: usize = total - report.outcomes.len();
                warn!(batch = number + 1, skipped, "Import commit cancelled");
                report.cancelled = true;
                for row in &pending[report.outcomes.len()..] {
                    report.record(row.failed(CANCELLED_REASON.to_string(), None));
                }
                break;
            }

            for outcome in commit_batch(store, batch, number + 1).await {
                report.record(outcome);
            }

            let progress: CommitProgress = CommitProgress {
                batch: number + 1,
                batches,
                processed: report.outcomes.len(),
                total,
                succeeded: report.succeeded,
                failed: report.failed.len(),
            };
            debug!(?progress, "Batch committed");
            on_progress(&progress);
        }

        session.finish_commit();

        info!(
            succeeded = report.succeeded,
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "Import commit finished"
        );
        Ok(report)
    }
}

/// Writes one batch and returns its outcomes in input order.
///
/// Consecutive rows with the same action share one store request, so
/// records reach the store in file order.
async fn commit_batch<S: RecordStore>(
    store: &S,
    batch: &[Pending],
    number: usize,
) -> Vec<RowOutcome> {
    let mut outcomes: Vec<Option<RowOutcome>> = vec![None; batch.len()];
    let mut run: Vec<usize> = Vec::new();
    let mut run_updates: bool = false;

    for (i, row) in batch.iter().enumerate() {
        if row.record.is_none() {
            outcomes[i] = Some(row.failed(
                String::from("row cannot be converted into a record"),
                None,
            ));
            continue;
        }
        let is_update: bool = row.action == RowAction::Update;
        if !run.is_empty() && is_update != run_updates {
            write_run(store, batch, &run, run_updates, number, &mut outcomes).await;
            run.clear();
        }
        run_updates = is_update;
        run.push(i);
    }
    if !run.is_empty() {
        write_run(store, batch, &run, run_updates, number, &mut outcomes).await;
    }

    outcomes.into_iter().flatten().collect()
}

async fn write_run<S: RecordStore>(
    store: &S,
    batch: &[Pending],
    positions: &[usize],
    updates: bool,
    number: usize,
    outcomes: &mut [Option<RowOutcome>],
) {
    let records: Vec<Record> = collect_records(batch, positions);
    let results: Result<WriteResults, StoreError> = if updates {
        store.update_many(records).await
    } else {
        store.create_many(records).await
    };
    apply_results(store, batch, positions, results, number, outcomes).await;
}

fn collect_records(batch: &[Pending], positions: &[usize]) -> Vec<Record> {
    positions
        .iter()
        .filter_map(|&i| batch[i].record.clone())
        .collect()
}

async fn apply_results<S: RecordStore>(
    store: &S,
    batch: &[Pending],
    positions: &[usize],
    results: Result<WriteResults, StoreError>,
    number: usize,
    outcomes: &mut [Option<RowOutcome>],
) {
    let results: WriteResults = match results {
        Ok(results) if results.len() == positions.len() => results,
        Ok(results) => {
            let reason: String = format!(
                "store returned {} results for {} records",
                results.len(),
                positions.len()
            );
            warn!(batch = number, %reason, "Batch write failed");
            fail_all(batch, positions, &reason, outcomes);
            return;
        }
        Err(err) => {
            warn!(batch = number, error = %err, "Batch write failed");
            fail_all(batch, positions, &err.to_string(), outcomes);
            return;
        }
    };

    for (&i, result) in positions.iter().zip(results) {
        let row: &Pending = &batch[i];
        outcomes[i] = Some(match result {
            Ok(id) => row.written(id),
            Err(err @ StoreError::Conflict(_)) => {
                let existing: Option<i64> = match &row.key {
                    Some(key) => store.find_by_key(key).await.ok().flatten(),
                    None => None,
                };
                debug!(row = row.row_number, ?existing, "Row conflicts with stored record");
                row.failed(err.to_string(), existing)
            }
            Err(err) => row.failed(err.to_string(), None),
        });
    }
}

fn fail_all(
    batch: &[Pending],
    positions: &[usize],
    reason: &str,
    outcomes: &mut [Option<RowOutcome>],
) {
    for &i in positions {
        outcomes[i] = Some(batch[i].failed(reason.to_string(), None));
    }
}
