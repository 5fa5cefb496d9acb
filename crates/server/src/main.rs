// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;
mod live;
mod registry;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRef, Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use booth_map::{BatchCommitter, CommitReport, DEFAULT_BATCH_SIZE, ImportConfig, ImportSession};
use booth_map_api::{
    ApiError, AuthError, AuthenticatedActor, AuthorizationService, CommitImportResponse,
    EditCellRequest, EditCellResponse, ExportFile, ExportJob, FileFormat, ImportPreviewResponse,
    SelectionRequest, SelectionResponse, StartImportRequest, ToggleRowResponse, change_selection,
    commit_import, commit_response, edit_cell, export_records, preview_response, start_import,
    toggle_row, translate_domain_error,
};
use booth_map_domain::{EventYear, PhoneRegion, RecordKind, validate_event_year};
use booth_map_persistence::{Persistence, SqliteStore};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::identity::Actor;
use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::registry::{RegistryError, SessionRegistry};

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Booth Map Server - bulk import and export of exhibitor data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Rows written per store request during a commit
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Calling code used to internationalize national phone numbers
    #[arg(long, default_value = "31")]
    phone_country_code: String,

    /// National trunk prefix replaced by the calling code
    #[arg(long, default_value = "0")]
    phone_trunk_prefix: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The record store.
    store: SqliteStore,
    /// Open import sessions.
    sessions: Arc<SessionRegistry>,
    /// Pipeline configuration.
    config: Arc<ImportConfig>,
    /// Progress fan-out to WebSocket clients.
    live: Arc<LiveEventBroadcaster>,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live)
    }
}

/// Query parameters for POST `/imports`.
#[derive(Debug, Clone, Deserialize)]
struct ImportQuery {
    /// The record kind (`companies`, `subscriptions`, `assignments`).
    kind: String,
    /// The file format; falls back to the `Content-Type` header.
    format: Option<String>,
    /// Event year for rows without a year column.
    year: Option<u16>,
}

/// Query parameters for GET `/exports`.
#[derive(Debug, Clone, Deserialize)]
struct ExportQuery {
    /// The record kind.
    kind: String,
    /// The file format, `excel` when absent.
    format: Option<String>,
    /// Restricts year-scoped kinds to one event year.
    year: Option<u16>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } | ApiError::InvalidFile { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidState { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } | ApiError::SelectionRejected { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        Self::from(ApiError::from(err))
    }
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        let status: StatusCode = match err {
            RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::Committing { .. } | RegistryError::NotCommitting { .. } => {
                StatusCode::CONFLICT
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Parses a record kind query parameter.
fn parse_kind(kind: &str) -> Result<RecordKind, HttpError> {
    kind.parse::<RecordKind>()
        .map_err(|e| HttpError::from(translate_domain_error(e)))
}

/// Parses a file format query parameter.
fn parse_format(format: &str) -> Result<FileFormat, HttpError> {
    format
        .parse::<FileFormat>()
        .map_err(|e| HttpError::from(ApiError::from(e)))
}

/// Resolves the upload format from the query, then the `Content-Type`.
fn upload_format(format: Option<&str>, headers: &HeaderMap) -> Result<FileFormat, HttpError> {
    if let Some(format) = format {
        return parse_format(format);
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(FileFormat::from_content_type)
        .ok_or_else(|| {
            HttpError::from(ApiError::InvalidInput {
                field: String::from("format"),
                message: String::from(
                    "Pass a format parameter or a spreadsheet, CSV or JSON Content-Type",
                ),
            })
        })
}

/// Handler for POST `/imports`.
///
/// Parses the uploaded file and opens a preview session.
async fn handle_start_import(
    AxumState(state): AxumState<AppState>,
    Query(query): Query<ImportQuery>,
    Actor(actor): Actor,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportPreviewResponse>), HttpError> {
    info!(actor = %actor.id, kind = %query.kind, bytes = body.len(), "Handling import upload");

    let request: StartImportRequest = StartImportRequest {
        kind: parse_kind(&query.kind)?,
        format: upload_format(query.format.as_deref(), &headers)?,
        year: query.year,
    };

    let session: ImportSession =
        start_import(&state.store, &state.config, &actor, &request, &body).await?;
    let total: usize = session.summary().total;
    let session_id: String = state.sessions.insert(session).await;

    let response: ImportPreviewResponse = state
        .sessions
        .with_session(&session_id, |s| preview_response(&session_id, s))
        .await?;

    state.live.broadcast(&LiveEvent::ImportOpened {
        session_id: session_id.clone(),
        kind: response.kind.clone(),
        total,
    });

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/imports/{id}`.
async fn handle_get_import(
    AxumState(state): AxumState<AppState>,
    Path(session_id): Path<String>,
    Actor(actor): Actor,
) -> Result<Json<ImportPreviewResponse>, HttpError> {
    AuthorizationService::authorize_import(&actor)?;

    let response: ImportPreviewResponse = state
        .sessions
        .with_session(&session_id, |s| preview_response(&session_id, s))
        .await?;

    Ok(Json(response))
}

/// Handler for DELETE `/imports/{id}`.
async fn handle_delete_import(
    AxumState(state): AxumState<AppState>,
    Path(session_id): Path<String>,
    Actor(actor): Actor,
) -> Result<StatusCode, HttpError> {
    AuthorizationService::authorize_import(&actor)?;

    state.sessions.remove(&session_id).await?;
    state
        .live
        .broadcast(&LiveEvent::ImportClosed { session_id });

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/imports/{id}/rows/{row}/toggle`.
async fn handle_toggle_row(
    AxumState(state): AxumState<AppState>,
    Path((session_id, row)): Path<(String, usize)>,
    Actor(actor): Actor,
) -> Result<Json<ToggleRowResponse>, HttpError> {
    let response: ToggleRowResponse = state
        .sessions
        .with_session(&session_id, |s| toggle_row(s, &actor, row))
        .await??;

    Ok(Json(response))
}

/// Handler for PATCH `/imports/{id}/rows/{row}`.
///
/// Edits one cell and re-validates the row.
async fn handle_edit_cell(
    AxumState(state): AxumState<AppState>,
    Path((session_id, row)): Path<(String, usize)>,
    Actor(actor): Actor,
    Json(request): Json<EditCellRequest>,
) -> Result<Json<EditCellResponse>, HttpError> {
    let response: EditCellResponse = state
        .sessions
        .with_session(&session_id, |s| edit_cell(s, &actor, row, &request))
        .await??;

    Ok(Json(response))
}

/// Handler for POST `/imports/{id}/selection`.
async fn handle_change_selection(
    AxumState(state): AxumState<AppState>,
    Path(session_id): Path<String>,
    Actor(actor): Actor,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, HttpError> {
    let response: SelectionResponse = state
        .sessions
        .with_session(&session_id, |s| change_selection(s, &actor, request))
        .await??;

    Ok(Json(response))
}

/// Handler for POST `/imports/{id}/commit`.
///
/// The session is checked out of the registry while batches run so other
/// requests are not blocked; a concurrent cancel request stops the run
/// before its next batch. The run is spawned so a dropped request still
/// finishes it and checks the session back in.
async fn handle_commit_import(
    AxumState(state): AxumState<AppState>,
    Path(session_id): Path<String>,
    Actor(actor): Actor,
) -> Result<Json<CommitImportResponse>, HttpError> {
    AuthorizationService::authorize_import(&actor)?;

    let (session, cancel) = state.sessions.checkout(&session_id).await?;
    let committer: BatchCommitter = BatchCommitter::from_config(&state.config).with_cancel(cancel);

    let run: tokio::task::JoinHandle<Result<CommitReport, ApiError>> = tokio::spawn(run_commit(
        state,
        session_id.clone(),
        session,
        actor,
        committer,
    ));
    let report: CommitReport = run.await.map_err(|e| {
        error!(session = %session_id, error = %e, "Commit task failed");
        HttpError::from(ApiError::Internal {
            message: String::from("commit task failed"),
        })
    })??;

    Ok(Json(commit_response(&session_id, report)))
}

/// Commits a checked-out session and always checks it back in.
async fn run_commit(
    state: AppState,
    session_id: String,
    mut session: ImportSession,
    actor: AuthenticatedActor,
    committer: BatchCommitter,
) -> Result<CommitReport, ApiError> {
    let result: Result<CommitReport, ApiError> = commit_import(
        &state.store,
        &mut session,
        &actor,
        &committer,
        |progress| {
            state
                .live
                .broadcast(&LiveEvent::progress(&session_id, progress));
        },
    )
    .await;
    state.sessions.checkin(&session_id, session).await;

    let report: CommitReport = result?;
    state
        .live
        .broadcast(&LiveEvent::finished(&session_id, &report));
    Ok(report)
}

/// Handler for POST `/imports/{id}/cancel`.
async fn handle_cancel_commit(
    AxumState(state): AxumState<AppState>,
    Path(session_id): Path<String>,
    Actor(actor): Actor,
) -> Result<StatusCode, HttpError> {
    AuthorizationService::authorize_import(&actor)?;

    state.sessions.cancel(&session_id).await?;

    Ok(StatusCode::ACCEPTED)
}

/// Handler for GET `/exports`.
///
/// Streams the file back as an attachment named after the kind and today's
/// date.
async fn handle_export(
    AxumState(state): AxumState<AppState>,
    Query(query): Query<ExportQuery>,
    Actor(actor): Actor,
) -> Result<Response, HttpError> {
    let kind: RecordKind = parse_kind(&query.kind)?;
    let format: FileFormat = match query.format.as_deref() {
        Some(format) => parse_format(format)?,
        None => FileFormat::Excel,
    };
    let year: Option<EventYear> = query
        .year
        .map(validate_event_year)
        .transpose()
        .map_err(|e| HttpError::from(translate_domain_error(e)))?;

    let today: time::Date = time::OffsetDateTime::now_utc().date();
    let file: ExportFile = export_records(
        &state.store,
        &actor,
        ExportJob { kind, year, format },
        today,
    )
    .await?;

    info!(
        actor = %actor.id,
        file = %file.file_name,
        bytes = file.bytes.len(),
        "Export ready"
    );

    let disposition: String = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/imports", post(handle_start_import))
        .route("/imports/events", get(live_events_handler))
        .route(
            "/imports/{id}",
            get(handle_get_import).delete(handle_delete_import),
        )
        .route("/imports/{id}/rows/{row}", patch(handle_edit_cell))
        .route("/imports/{id}/rows/{row}/toggle", post(handle_toggle_row))
        .route("/imports/{id}/selection", post(handle_change_selection))
        .route("/imports/{id}/commit", post(handle_commit_import))
        .route("/imports/{id}/cancel", post(handle_cancel_commit))
        .route("/exports", get(handle_export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Booth Map Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config: ImportConfig = ImportConfig {
        batch_size: args.batch_size,
        phone_region: PhoneRegion::new(&args.phone_country_code, &args.phone_trunk_prefix),
    };
    info!(
        batch_size = config.effective_batch_size(),
        country_code = config.phone_region.country_code(),
        "Import pipeline configured"
    );

    let app_state: AppState = AppState {
        store: SqliteStore::new(persistence),
        sessions: Arc::new(SessionRegistry::new()),
        config: Arc::new(config),
        live: Arc::new(LiveEventBroadcaster::new()),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use serde_json::{Value, json};
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    /// Acme BV exists (update), Initech is new (create), the third row has no name.
    const MIXED_CSV: &str = "Name;Email\nAcme BV;info@acme.nl\nInitech;info@initech.com\n;x@y.nl\n";

    /// Helper to create test app state with a seeded in-memory store.
    fn create_test_app_state() -> AppState {
        let mut persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        persistence
            .create_category("Food")
            .expect("Failed to create category");
        persistence
            .create_marker("A12", EventYear::new(2026))
            .expect("Failed to create marker");
        persistence
            .create_company("Acme BV")
            .expect("Failed to create company");

        AppState {
            store: SqliteStore::new(persistence),
            sessions: Arc::new(SessionRegistry::new()),
            config: Arc::new(ImportConfig::default()),
            live: Arc::new(LiveEventBroadcaster::new()),
        }
    }

    fn request(method: &str, uri: &str, role: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_ID_HEADER, "u-1")
            .header(ACTOR_ROLE_HEADER, role)
    }

    fn json_request(method: &str, uri: &str, role: &str, body: &Value) -> Request<Body> {
        request(method, uri, role)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request")
    }

    fn empty_request(method: &str, uri: &str, role: &str) -> Request<Body> {
        request(method, uri, role)
            .body(Body::empty())
            .expect("Failed to build request")
    }

    fn csv_upload(uri: &str, role: &str, csv: &str) -> Request<Body> {
        request("POST", uri, role)
            .header("content-type", "text/csv")
            .body(Body::from(csv.to_string()))
            .expect("Failed to build request")
    }

    async fn read_body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec()
    }

    async fn read_json(response: Response) -> Value {
        let bytes: Vec<u8> = read_body(response).await;
        serde_json::from_slice(&bytes).expect("Failed to parse JSON")
    }

    /// Uploads the mixed company file and returns the new session id.
    async fn open_mixed_session(app: &Router) -> String {
        let response: Response = app
            .clone()
            .oneshot(csv_upload(
                "/imports?kind=companies&format=csv&year=2026",
                "editor",
                MIXED_CSV,
            ))
            .await
            .expect("Failed to upload");
        assert_eq!(response.status(), HttpStatusCode::CREATED);
        let body: Value = read_json(response).await;
        body["session_id"]
            .as_str()
            .expect("Missing session id")
            .to_string()
    }

    #[tokio::test]
    async fn test_upload_builds_preview() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(csv_upload(
                "/imports?kind=companies&format=csv",
                "editor",
                MIXED_CSV,
            ))
            .await
            .expect("Failed to upload");

        assert_eq!(response.status(), HttpStatusCode::CREATED);
        let body: Value = read_json(response).await;
        assert_eq!(body["session_id"], "import-1");
        assert_eq!(body["kind"], "companies");
        assert_eq!(body["phase"], "preview ready");
        assert_eq!(body["summary"]["total"], 3);
        assert_eq!(body["summary"]["selected"], 2);
        let actions: Vec<&str> = body["rows"]
            .as_array()
            .expect("Missing rows")
            .iter()
            .filter_map(|row| row["action"].as_str())
            .collect();
        assert_eq!(actions, vec!["UPDATE", "CREATE", "ERROR"]);
    }

    #[tokio::test]
    async fn test_upload_format_from_content_type() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(csv_upload("/imports?kind=companies", "admin", MIXED_CSV))
            .await
            .expect("Failed to upload");

        assert_eq!(response.status(), HttpStatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_upload_without_actor_headers_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/imports?kind=companies&format=csv")
                    .body(Body::from(MIXED_CSV))
                    .expect("Failed to build request"),
            )
            .await
            .expect("Failed to upload");

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_viewer_cannot_upload() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(csv_upload(
                "/imports?kind=companies&format=csv",
                "viewer",
                MIXED_CSV,
            ))
            .await
            .expect("Failed to upload");

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_kind_and_format() {
        let app: Router = build_router(create_test_app_state());

        let bad_kind: Response = app
            .clone()
            .oneshot(csv_upload(
                "/imports?kind=booths&format=csv",
                "editor",
                MIXED_CSV,
            ))
            .await
            .expect("Failed to upload");
        assert_eq!(bad_kind.status(), HttpStatusCode::BAD_REQUEST);

        let bad_format: Response = app
            .oneshot(csv_upload(
                "/imports?kind=companies&format=ods",
                "editor",
                MIXED_CSV,
            ))
            .await
            .expect("Failed to upload");
        assert_eq!(bad_format.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_bad_request() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(
                request("POST", "/imports?kind=companies&format=json", "editor")
                    .body(Body::from(r#"{"Name": "Acme"}"#))
                    .expect("Failed to build request"),
            )
            .await
            .expect("Failed to upload");

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(empty_request("GET", "/imports/import-42", "editor"))
            .await
            .expect("Failed to query");

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_toggle_rows() {
        let app: Router = build_router(create_test_app_state());
        let session_id: String = open_mixed_session(&app).await;

        let toggled: Response = app
            .clone()
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/rows/1/toggle"),
                "editor",
            ))
            .await
            .expect("Failed to toggle");
        assert_eq!(toggled.status(), HttpStatusCode::OK);
        let body: Value = read_json(toggled).await;
        assert_eq!(body["row"]["selected"], false);
        assert_eq!(body["summary"]["selected"], 1);

        let error_row: Response = app
            .clone()
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/rows/2/toggle"),
                "editor",
            ))
            .await
            .expect("Failed to toggle");
        assert_eq!(error_row.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

        let missing_row: Response = app
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/rows/9/toggle"),
                "editor",
            ))
            .await
            .expect("Failed to toggle");
        assert_eq!(missing_row.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_select_commit_flow() {
        let app_state: AppState = create_test_app_state();
        let mut events: broadcast::Receiver<LiveEvent> = app_state.live.subscribe();
        let app: Router = build_router(app_state);
        let session_id: String = open_mixed_session(&app).await;

        let edited: Response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/imports/{session_id}/rows/2"),
                "editor",
                &json!({"column": "Name", "value": "Hooli"}),
            ))
            .await
            .expect("Failed to edit");
        assert_eq!(edited.status(), HttpStatusCode::OK);
        let body: Value = read_json(edited).await;
        assert_eq!(body["row"]["action"], "CREATE");
        assert_eq!(body["summary"]["selected"], 3);

        let deselected: Response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/imports/{session_id}/selection"),
                "editor",
                &json!({"select": false, "filter": "create"}),
            ))
            .await
            .expect("Failed to change selection");
        assert_eq!(deselected.status(), HttpStatusCode::OK);
        let body: Value = read_json(deselected).await;
        assert_eq!(body["changed"], 2);
        assert_eq!(body["summary"]["selected"], 1);

        let committed: Response = app
            .clone()
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/commit"),
                "editor",
            ))
            .await
            .expect("Failed to commit");
        assert_eq!(committed.status(), HttpStatusCode::OK);
        let body: Value = read_json(committed).await;
        assert_eq!(body["report"]["succeeded"], 1);
        assert_eq!(body["report"]["total"], 1);
        assert_eq!(body["message"], "Imported 1 rows");

        let current: Response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/imports/{session_id}"),
                "editor",
            ))
            .await
            .expect("Failed to query");
        let body: Value = read_json(current).await;
        assert_eq!(body["phase"], "done");

        let again: Response = app
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/commit"),
                "editor",
            ))
            .await
            .expect("Failed to commit");
        assert_eq!(again.status(), HttpStatusCode::CONFLICT);

        assert!(matches!(
            events.try_recv(),
            Ok(LiveEvent::ImportOpened { total: 3, .. })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(LiveEvent::CommitProgress {
                batch: 1,
                batches: 1,
                ..
            })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(LiveEvent::CommitFinished {
                succeeded: 1,
                cancelled: false,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_commit_finishes_after_client_disconnects() {
        let app_state: AppState = create_test_app_state();
        let persistence: Arc<tokio::sync::Mutex<Persistence>> = app_state.store.persistence();
        let app: Router = build_router(app_state);
        let session_id: String = open_mixed_session(&app).await;

        let held: tokio::sync::MutexGuard<'_, Persistence> = persistence.lock().await;
        let dropped: Result<Result<Response, std::convert::Infallible>, tokio::time::error::Elapsed> =
            tokio::time::timeout(
                std::time::Duration::from_millis(100),
                app.clone().oneshot(empty_request(
                    "POST",
                    &format!("/imports/{session_id}/commit"),
                    "editor",
                )),
            )
            .await;
        assert!(dropped.is_err(), "commit should still be waiting on the store");
        drop(held);

        let mut phase: Value = Value::Null;
        for _ in 0..50 {
            let current: Response = app
                .clone()
                .oneshot(empty_request(
                    "GET",
                    &format!("/imports/{session_id}"),
                    "editor",
                ))
                .await
                .expect("Failed to query");
            if current.status() == HttpStatusCode::OK {
                phase = read_json(current).await["phase"].clone();
                break;
            }
            assert_eq!(current.status(), HttpStatusCode::CONFLICT);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(phase, "done");

        let deleted: Response = app
            .oneshot(empty_request(
                "DELETE",
                &format!("/imports/{session_id}"),
                "editor",
            ))
            .await
            .expect("Failed to delete");
        assert_eq!(deleted.status(), HttpStatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_cancel_without_running_commit_is_conflict() {
        let app: Router = build_router(create_test_app_state());
        let session_id: String = open_mixed_session(&app).await;

        let response: Response = app
            .oneshot(empty_request(
                "POST",
                &format!("/imports/{session_id}/cancel"),
                "editor",
            ))
            .await
            .expect("Failed to cancel");

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_abandons_session() {
        let app: Router = build_router(create_test_app_state());
        let session_id: String = open_mixed_session(&app).await;

        let deleted: Response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/imports/{session_id}"),
                "editor",
            ))
            .await
            .expect("Failed to delete");
        assert_eq!(deleted.status(), HttpStatusCode::NO_CONTENT);

        let response: Response = app
            .oneshot(empty_request(
                "GET",
                &format!("/imports/{session_id}"),
                "editor",
            ))
            .await
            .expect("Failed to query");
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_viewer_downloads_csv_export() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(empty_request(
                "GET",
                "/exports?kind=companies&format=csv",
                "viewer",
            ))
            .await
            .expect("Failed to export");

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let disposition: &str = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .expect("Invalid header");
        assert!(disposition.starts_with("attachment; filename=\"companies-"));
        assert!(disposition.ends_with(".csv\""));

        let text: String = String::from_utf8(read_body(response).await).expect("Invalid UTF-8");
        assert!(text.starts_with("Name,Contact,Phone,Email,Website,Info,Categories,Food\n"));
        assert!(text.contains("Acme BV"));
    }

    #[tokio::test]
    async fn test_export_defaults_to_excel() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(empty_request(
                "GET",
                "/exports?kind=assignments&year=2026",
                "admin",
            ))
            .await
            .expect("Failed to export");

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            FileFormat::Excel.content_type()
        );
        let bytes: Vec<u8> = read_body(response).await;
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_export_rejects_out_of_range_year() {
        let app: Router = build_router(create_test_app_state());

        let response: Response = app
            .oneshot(empty_request(
                "GET",
                "/exports?kind=subscriptions&year=1850",
                "admin",
            ))
            .await
            .expect("Failed to export");

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_status_mapping() {
        let cases: Vec<(ApiError, HttpStatusCode)> = vec![
            (
                ApiError::InvalidFile {
                    reason: String::from("empty"),
                },
                HttpStatusCode::BAD_REQUEST,
            ),
            (
                ApiError::DomainRuleViolation {
                    rule: String::from("unique_natural_key"),
                    message: String::from("duplicate"),
                },
                HttpStatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::InvalidState {
                    message: String::from("locked"),
                },
                HttpStatusCode::CONFLICT,
            ),
            (
                ApiError::ServiceUnavailable {
                    message: String::from("down"),
                },
                HttpStatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Internal {
                    message: String::from("boom"),
                },
                HttpStatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status, expected);
        }
    }
}
