// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role checks for import and export.

use booth_map::{BatchCommitter, CommitReport, ImportConfig, ImportSession};
use booth_map_domain::RecordKind;
use booth_map_persistence::SqliteStore;

use crate::{
    ApiError, AuthError, AuthenticatedActor, AuthorizationService, EditCellRequest, ExportFile,
    ExportJob, FileFormat, Role, SelectionFilter, SelectionRequest, change_selection,
    commit_import, edit_cell, export_records, start_import, toggle_row,
};

use super::helpers::{
    create_seeded_store, create_test_admin, create_test_editor, create_test_viewer,
    export_date, import_request, start_test_import,
};

const COMPANIES_CSV: &[u8] = b"Name,Email\nInitech,info@initech.com\n";

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    assert!(
        matches!(result, Err(ApiError::Unauthorized { ref action, .. }) if action == "import_records"),
        "{result:?}"
    );
}

#[test]
fn test_role_parsing_is_case_insensitive() {
    assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
    assert_eq!(" editor ".parse::<Role>(), Ok(Role::Editor));
    assert_eq!("VIEWER".parse::<Role>(), Ok(Role::Viewer));
    assert!(matches!(
        "owner".parse::<Role>(),
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_actor_from_identity_requires_id() {
    let actor: AuthenticatedActor = AuthenticatedActor::from_identity("u-1", "editor").unwrap();
    assert_eq!(actor.role, Role::Editor);

    assert!(matches!(
        AuthenticatedActor::from_identity("  ", "admin"),
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_import_allowed_for_admin_and_editor_only() {
    assert!(AuthorizationService::authorize_import(&create_test_admin()).is_ok());
    assert!(AuthorizationService::authorize_import(&create_test_editor()).is_ok());
    assert_eq!(
        AuthorizationService::authorize_import(&create_test_viewer()),
        Err(AuthError::Unauthorized {
            action: String::from("import_records"),
            required_role: String::from("Editor"),
        })
    );
}

#[test]
fn test_export_allowed_for_every_role() {
    for actor in [create_test_admin(), create_test_editor(), create_test_viewer()] {
        assert!(AuthorizationService::authorize_export(&actor).is_ok());
    }
}

#[tokio::test]
async fn test_start_import_rejects_viewer() {
    let store: SqliteStore = create_seeded_store();

    let result: Result<ImportSession, ApiError> = start_import(
        &store,
        &ImportConfig::default(),
        &create_test_viewer(),
        &import_request(RecordKind::Company, FileFormat::Csv),
        COMPANIES_CSV,
    )
    .await;

    assert_unauthorized(result);
}

#[tokio::test]
async fn test_session_operations_reject_viewer() {
    let store: SqliteStore = create_seeded_store();
    let mut session: ImportSession =
        start_test_import(&store, RecordKind::Company, FileFormat::Csv, COMPANIES_CSV).await;
    let viewer: AuthenticatedActor = create_test_viewer();

    assert_unauthorized(toggle_row(&mut session, &viewer, 0));
    assert_unauthorized(edit_cell(
        &mut session,
        &viewer,
        0,
        &EditCellRequest {
            column: String::from("Name"),
            value: String::from("Hooli"),
        },
    ));
    assert_unauthorized(change_selection(
        &mut session,
        &viewer,
        SelectionRequest {
            select: false,
            filter: SelectionFilter::All,
        },
    ));
    let committed: Result<CommitReport, ApiError> = commit_import(
        &store,
        &mut session,
        &viewer,
        &BatchCommitter::default(),
        |_| {},
    )
    .await;
    assert_unauthorized(committed);

    assert_eq!(session.summary().selected, 1);
}

#[tokio::test]
async fn test_viewer_may_export() {
    let store: SqliteStore = create_seeded_store();

    let file: ExportFile = export_records(
        &store,
        &create_test_viewer(),
        ExportJob {
            kind: RecordKind::Company,
            year: None,
            format: FileFormat::Csv,
        },
        export_date(),
    )
    .await
    .unwrap();

    assert_eq!(file.file_name, "companies-2026-10-16.csv");
    assert!(String::from_utf8(file.bytes).unwrap().contains("Acme BV"));
}
