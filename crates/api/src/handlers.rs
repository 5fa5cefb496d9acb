// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service functions behind the import and export endpoints.
//!
//! Every function enforces the actor's role first, then translates
//! between DTOs and the import pipeline. The store is injected so the
//! same functions run against SQLite in production and test doubles in
//! tests.

use booth_map::{
    BatchCommitter, CommitProgress, CommitReport, ExistingIndex, ImportConfig, ImportRow,
    ImportSession, ImportSummary, RawRow, RecordStore, SelectionError,
};
use booth_map_domain::{Category, EventYear, Record, RecordKind, validate_event_year};
use time::Date;
use tracing::{info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_selection_error,
};
use crate::export::{ExportFile, ExportJob, export};
use crate::parse::parse;
use crate::request_response::{
    CommitImportResponse, EditCellRequest, EditCellResponse, ImportPreviewResponse, PreviewRow,
    SelectionFilter, SelectionRequest, SelectionResponse, StartImportRequest, ToggleRowResponse,
};

/// Parses an uploaded file and builds a preview session.
///
/// The existing index is loaded once here and never refreshed for the
/// lifetime of the session.
///
/// # Arguments
///
/// * `store` - The record store
/// * `config` - The pipeline configuration
/// * `actor` - The authenticated actor
/// * `request` - Record kind, file format and optional target year
/// * `bytes` - The uploaded file
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not authorized to import
/// - The target year is out of range
/// - The file cannot be parsed
/// - The store cannot be queried
pub async fn start_import<S: RecordStore>(
    store: &S,
    config: &ImportConfig,
    actor: &AuthenticatedActor,
    request: &StartImportRequest,
    bytes: &[u8],
) -> Result<ImportSession, ApiError> {
    AuthorizationService::authorize_import(actor)?;

    let target_year: Option<EventYear> = request
        .year
        .map(validate_event_year)
        .transpose()
        .map_err(translate_domain_error)?;

    let raw_rows: Vec<RawRow> = parse(bytes, request.format)?;
    let index: ExistingIndex = store.load_index(request.kind).await?;

    let mut session: ImportSession =
        ImportSession::new(request.kind, config.context(target_year), index);
    let summary: ImportSummary = session.load_rows(raw_rows).map_err(translate_core_error)?;

    info!(
        actor = %actor.id,
        kind = %request.kind,
        format = %request.format,
        total = summary.total,
        create = summary.create,
        update = summary.update,
        error = summary.error,
        "Import preview ready"
    );

    Ok(session)
}

/// Builds the preview DTO for a session.
#[must_use]
pub fn preview_response(session_id: &str, session: &ImportSession) -> ImportPreviewResponse {
    ImportPreviewResponse {
        session_id: session_id.to_string(),
        kind: session.kind().as_str().to_string(),
        phase: session.phase().as_str().to_string(),
        target_year: session.target_year().map(|y| y.year()),
        summary: session.summary(),
        rows: session
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| PreviewRow::from_row(index, row))
            .collect(),
    }
}

/// Flips the selection of one row.
///
/// # Errors
///
/// Returns an error if the actor may not import, the index is out of
/// range, the row has validation errors, or the session is locked.
pub fn toggle_row(
    session: &mut ImportSession,
    actor: &AuthenticatedActor,
    index: usize,
) -> Result<ToggleRowResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;

    session.toggle_row(index).map_err(translate_selection_error)?;
    let row: &ImportRow = session.row(index).ok_or_else(|| ApiError::Internal {
        message: format!("row {index} vanished after toggle"),
    })?;

    Ok(ToggleRowResponse {
        row: PreviewRow::from_row(index, row),
        summary: session.summary(),
    })
}

/// Overwrites one raw cell and reclassifies the session.
///
/// # Errors
///
/// Returns an error if the actor may not import, the column name is
/// blank, the index is out of range, or the session is locked.
pub fn edit_cell(
    session: &mut ImportSession,
    actor: &AuthenticatedActor,
    index: usize,
    request: &EditCellRequest,
) -> Result<EditCellResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;

    if request.column.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("column"),
            message: String::from("column name must not be empty"),
        });
    }

    let row: PreviewRow = session
        .edit_cell(index, &request.column, request.value.as_str())
        .map(|row| PreviewRow::from_row(index, row))
        .map_err(translate_selection_error)?;

    Ok(EditCellResponse {
        row,
        summary: session.summary(),
    })
}

/// Selects or deselects every row matching the request filter.
///
/// Error rows are never selected.
///
/// # Errors
///
/// Returns an error if the actor may not import or the session is locked.
pub fn change_selection(
    session: &mut ImportSession,
    actor: &AuthenticatedActor,
    request: SelectionRequest,
) -> Result<SelectionResponse, ApiError> {
    AuthorizationService::authorize_import(actor)?;

    let filter: SelectionFilter = request.filter;
    let result: Result<usize, SelectionError> = if request.select {
        session.select_all(|row| filter.matches(row))
    } else {
        session.deselect_all(|row| filter.matches(row))
    };
    let changed: usize = result.map_err(translate_selection_error)?;

    Ok(SelectionResponse {
        changed,
        summary: session.summary(),
    })
}

/// Commits the selected rows of a session.
///
/// Store failures are reported per row in the returned report; they never
/// fail the call.
///
/// # Arguments
///
/// * `store` - The record store
/// * `session` - The session to commit; it ends in the `Done` phase
/// * `actor` - The authenticated actor
/// * `committer` - Batch size and optional cancellation
/// * `on_progress` - Called once after every batch
///
/// # Errors
///
/// Returns an error if the actor may not import or the session is not
/// ready to commit.
pub async fn commit_import<S, F>(
    store: &S,
    session: &mut ImportSession,
    actor: &AuthenticatedActor,
    committer: &BatchCommitter,
    on_progress: F,
) -> Result<CommitReport, ApiError>
where
    S: RecordStore,
    F: FnMut(&CommitProgress) + Send,
{
    AuthorizationService::authorize_import(actor)?;

    let report: CommitReport = committer
        .commit(session, store, on_progress)
        .await
        .map_err(translate_core_error)?;

    if report.failed.is_empty() {
        info!(actor = %actor.id, succeeded = report.succeeded, "Import committed");
    } else {
        warn!(
            actor = %actor.id,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "Import committed with failures"
        );
    }

    Ok(report)
}

/// Builds the commit DTO, with a one-line summary for display.
#[must_use]
pub fn commit_response(session_id: &str, report: CommitReport) -> CommitImportResponse {
    let message: String = if report.cancelled {
        format!(
            "Import cancelled: {} of {} rows saved",
            report.succeeded, report.total
        )
    } else if report.failed.is_empty() {
        format!("Imported {} rows", report.succeeded)
    } else {
        format!(
            "Imported {} of {} rows, {} failed",
            report.succeeded,
            report.total,
            report.failed.len()
        )
    };

    CommitImportResponse {
        session_id: session_id.to_string(),
        report,
        message,
    }
}

/// Exports the current records of one kind.
///
/// # Arguments
///
/// * `store` - The record store
/// * `actor` - The authenticated actor
/// * `job` - Kind, optional year and output format
/// * `date` - The date stamped into the file name
///
/// # Errors
///
/// Returns an error if the actor may not export, the store cannot be
/// queried, or encoding fails.
pub async fn export_records<S: RecordStore>(
    store: &S,
    actor: &AuthenticatedActor,
    job: ExportJob,
    date: Date,
) -> Result<ExportFile, ApiError> {
    AuthorizationService::authorize_export(actor)?;

    let year: Option<EventYear> = if job.kind.is_year_scoped() {
        job.year
    } else {
        None
    };
    let records: Vec<Record> = store.list_records(job.kind, year).await?;
    let categories: Vec<Category> = if job.kind == RecordKind::Company {
        store.list_categories().await?
    } else {
        Vec::new()
    };

    let bytes: Vec<u8> = export(&records, &categories, job.kind, job.format)?;

    info!(
        actor = %actor.id,
        kind = %job.kind,
        format = %job.format,
        records = records.len(),
        "Export generated"
    );

    Ok(ExportFile::new(job.kind, job.format, date, bytes))
}
