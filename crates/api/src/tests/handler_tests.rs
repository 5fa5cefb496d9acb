// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use booth_map::{
    BatchCommitter, CommitProgress, CommitReport, ImportConfig, ImportSession, SessionPhase,
};
use booth_map_domain::RecordKind;
use booth_map_persistence::SqliteStore;

use crate::{
    ApiError, AuthenticatedActor, CommitImportResponse, EditCellRequest, EditCellResponse,
    FileFormat, ImportPreviewResponse, SelectionFilter, SelectionRequest, SelectionResponse,
    StartImportRequest, ToggleRowResponse, change_selection, commit_import, commit_response,
    edit_cell, preview_response, start_import, toggle_row,
};

use super::helpers::{create_seeded_store, create_test_editor, start_test_import};

/// Acme BV exists (update), Initech is new (create), the third row has no name.
const MIXED_CSV: &[u8] = b"Name;Email\nAcme BV;info@acme.nl\nInitech;info@initech.com\n;x@y.nl\n";

async fn mixed_session(store: &SqliteStore) -> ImportSession {
    start_test_import(store, RecordKind::Company, FileFormat::Csv, MIXED_CSV).await
}

#[tokio::test]
async fn test_start_import_builds_preview() {
    let store: SqliteStore = create_seeded_store();
    let session: ImportSession = mixed_session(&store).await;

    let preview: ImportPreviewResponse = preview_response("s-1", &session);

    assert_eq!(preview.session_id, "s-1");
    assert_eq!(preview.kind, "companies");
    assert_eq!(preview.phase, "preview ready");
    assert_eq!(preview.target_year, Some(2026));
    assert_eq!(preview.summary.total, 3);
    let actions: Vec<&str> = preview.rows.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, vec!["UPDATE", "CREATE", "ERROR"]);
    assert_eq!(preview.rows[0].key.as_deref(), Some("acme bv"));
    assert!(preview.rows[0].existing_id.is_some());
    assert_eq!(preview.rows[2].cells[1].value, "x@y.nl");
    assert!(!preview.rows[2].errors.is_empty());
}

#[tokio::test]
async fn test_start_import_rejects_out_of_range_year() {
    let store: SqliteStore = create_seeded_store();

    let result: Result<ImportSession, ApiError> = start_import(
        &store,
        &ImportConfig::default(),
        &create_test_editor(),
        &StartImportRequest {
            kind: RecordKind::Subscription,
            format: FileFormat::Csv,
            year: Some(1850),
        },
        b"Company\nAcme BV\n",
    )
    .await;

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "year"
    ));
}

#[tokio::test]
async fn test_start_import_reports_unreadable_file() {
    let store: SqliteStore = create_seeded_store();

    let result: Result<ImportSession, ApiError> = start_import(
        &store,
        &ImportConfig::default(),
        &create_test_editor(),
        &StartImportRequest {
            kind: RecordKind::Company,
            format: FileFormat::Json,
            year: None,
        },
        b"{\"Name\": \"Acme\"}",
    )
    .await;

    assert!(matches!(result, Err(ApiError::InvalidFile { .. })));
}

#[tokio::test]
async fn test_toggle_row_returns_row_and_summary() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;

    let response: ToggleRowResponse = toggle_row(&mut session, &create_test_editor(), 1).unwrap();

    assert!(!response.row.selected);
    assert_eq!(response.summary.selected, 1);
}

#[tokio::test]
async fn test_toggle_error_row_is_rejected() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;

    let result: Result<ToggleRowResponse, ApiError> =
        toggle_row(&mut session, &create_test_editor(), 2);

    assert!(matches!(result, Err(ApiError::SelectionRejected { .. })));
    assert_eq!(session.summary().selected, 2);
}

#[tokio::test]
async fn test_toggle_unknown_row_is_not_found() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;

    let result: Result<ToggleRowResponse, ApiError> =
        toggle_row(&mut session, &create_test_editor(), 7);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[tokio::test]
async fn test_edit_cell_fixes_error_row() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;

    let response: EditCellResponse = edit_cell(
        &mut session,
        &create_test_editor(),
        2,
        &EditCellRequest {
            column: String::from("name"),
            value: String::from("Hooli"),
        },
    )
    .unwrap();

    assert_eq!(response.row.action, "CREATE");
    assert!(response.row.selected);
    assert_eq!(response.summary.error, 0);
    assert_eq!(response.summary.selected, 3);
}

#[tokio::test]
async fn test_edit_cell_requires_column_name() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;

    let result: Result<EditCellResponse, ApiError> = edit_cell(
        &mut session,
        &create_test_editor(),
        0,
        &EditCellRequest {
            column: String::from("  "),
            value: String::from("x"),
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "column"
    ));
}

#[tokio::test]
async fn test_change_selection_with_filter() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;
    let editor: AuthenticatedActor = create_test_editor();

    let cleared: SelectionResponse = change_selection(
        &mut session,
        &editor,
        SelectionRequest {
            select: false,
            filter: SelectionFilter::All,
        },
    )
    .unwrap();
    assert_eq!(cleared.changed, 2);

    let updates: SelectionResponse = change_selection(
        &mut session,
        &editor,
        SelectionRequest {
            select: true,
            filter: SelectionFilter::Update,
        },
    )
    .unwrap();
    assert_eq!(updates.changed, 1);
    assert!(session.rows()[0].is_selected());
    assert!(!session.rows()[1].is_selected());
}

#[tokio::test]
async fn test_commit_writes_selected_rows_and_locks_session() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession = mixed_session(&store).await;
    let editor: AuthenticatedActor = create_test_editor();
    let mut progress: Vec<CommitProgress> = Vec::new();

    let report: CommitReport = commit_import(
        &store,
        &mut session,
        &editor,
        &BatchCommitter::default(),
        |p| progress.push(*p),
    )
    .await
    .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(progress.len(), 1);
    assert_eq!(session.phase(), SessionPhase::Done);

    let locked: Result<ToggleRowResponse, ApiError> = toggle_row(&mut session, &editor, 0);
    assert!(matches!(locked, Err(ApiError::InvalidState { .. })));

    let again: Result<CommitReport, ApiError> = commit_import(
        &store,
        &mut session,
        &editor,
        &BatchCommitter::default(),
        |_| {},
    )
    .await;
    assert!(matches!(again, Err(ApiError::InvalidState { .. })));
}

#[test]
fn test_commit_response_messages() {
    let clean: CommitImportResponse = commit_response(
        "s-1",
        CommitReport {
            succeeded: 3,
            total: 3,
            ..CommitReport::default()
        },
    );
    assert_eq!(clean.message, "Imported 3 rows");

    let cancelled: CommitImportResponse = commit_response(
        "s-1",
        CommitReport {
            succeeded: 1,
            total: 4,
            cancelled: true,
            ..CommitReport::default()
        },
    );
    assert_eq!(cancelled.message, "Import cancelled: 1 of 4 rows saved");
}
