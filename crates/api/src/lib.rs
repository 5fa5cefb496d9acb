// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Booth Map import pipeline.
//!
//! This crate owns the file formats (parsing uploads, encoding exports),
//! the role pre-checks, the request/response DTOs and the translation of
//! pipeline errors into `ApiError`. HTTP wiring lives in the server crate.

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

mod auth;
mod error;
mod export;
mod handlers;
mod parse;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_selection_error,
};
pub use export::{
    ASSIGNMENT_COLUMNS, COMPANY_COLUMNS, ExportError, ExportFile, ExportJob, SUBSCRIPTION_COLUMNS,
    export, export_file_name,
};
pub use handlers::{
    change_selection, commit_import, commit_response, edit_cell, export_records, preview_response,
    start_import, toggle_row,
};
pub use parse::{FileFormat, ParseError, detect_delimiter, parse};
pub use request_response::{
    CommitImportResponse, EditCellRequest, EditCellResponse, ImportPreviewResponse, PreviewCell,
    PreviewRow, SelectionFilter, SelectionRequest, SelectionResponse, StartImportRequest,
    ToggleRowResponse,
};
