// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use booth_map::{CommitReport, ImportRow, ImportSummary, RowAction};
use booth_map_domain::RecordKind;

use crate::parse::FileFormat;

/// API request to upload a file and build an import preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartImportRequest {
    /// The kind of records in the file.
    pub kind: RecordKind,
    /// The declared file format.
    pub format: FileFormat,
    /// Event year for year-scoped rows that have no year column.
    pub year: Option<u16>,
}

/// API request to overwrite one raw cell of a preview row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EditCellRequest {
    /// The column header. Appended to the row when absent.
    pub column: String,
    /// The new cell text.
    pub value: String,
}

/// Which rows a bulk selection change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionFilter {
    /// Every row.
    #[default]
    All,
    /// Rows classified `Create`.
    Create,
    /// Rows classified `Update`.
    Update,
}

impl SelectionFilter {
    /// Returns whether `row` falls under this filter.
    #[must_use]
    pub fn matches(&self, row: &ImportRow) -> bool {
        match self {
            Self::All => true,
            Self::Create => row.action() == RowAction::Create,
            Self::Update => row.action() == RowAction::Update,
        }
    }
}

/// API request to select or deselect many rows at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SelectionRequest {
    /// `true` selects, `false` deselects.
    pub select: bool,
    /// The rows affected.
    #[serde(default)]
    pub filter: SelectionFilter,
}

/// One raw cell as uploaded (or as last edited).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewCell {
    /// The column header as it appears in the file.
    pub column: String,
    /// The cell text.
    pub value: String,
}

/// One classified row of an import preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewRow {
    /// Zero-based position used by the row endpoints.
    pub index: usize,
    /// The 1-based data row number in the file.
    pub row_number: usize,
    /// `CREATE`, `UPDATE` or `ERROR`.
    pub action: String,
    /// Whether the row will be committed.
    pub selected: bool,
    /// The natural key, when one could be formed.
    pub key: Option<String>,
    /// The id of the matched record, for updates.
    pub existing_id: Option<i64>,
    /// Validation messages. Non-empty exactly for `ERROR` rows.
    pub errors: Vec<String>,
    /// The raw cells in file column order.
    pub cells: Vec<PreviewCell>,
}

impl PreviewRow {
    /// Builds the DTO for the row at `index`.
    #[must_use]
    pub fn from_row(index: usize, row: &ImportRow) -> Self {
        Self {
            index,
            row_number: row.row_number,
            action: row.action().as_str().to_string(),
            selected: row.is_selected(),
            key: row.match_key().map(ToString::to_string),
            existing_id: row.existing_id(),
            errors: row.errors().to_vec(),
            cells: row
                .raw
                .cells()
                .iter()
                .map(|(column, value)| PreviewCell {
                    column: column.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

/// API response describing an import session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportPreviewResponse {
    /// The session identifier used by follow-up requests.
    pub session_id: String,
    /// The record kind slug.
    pub kind: String,
    /// The session phase.
    pub phase: String,
    /// The event year applied to rows without a year column.
    pub target_year: Option<u16>,
    /// Row counts by action and selection.
    pub summary: ImportSummary,
    /// Every row in file order.
    pub rows: Vec<PreviewRow>,
}

/// API response for a single row toggle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ToggleRowResponse {
    /// The toggled row.
    pub row: PreviewRow,
    /// Row counts after the toggle.
    pub summary: ImportSummary,
}

/// API response for a cell edit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EditCellResponse {
    /// The edited row after reclassification.
    pub row: PreviewRow,
    /// Row counts after reclassification. Other rows may have changed too.
    pub summary: ImportSummary,
}

/// API response for a bulk selection change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SelectionResponse {
    /// The number of rows whose selection changed.
    pub changed: usize,
    /// Row counts after the change.
    pub summary: ImportSummary,
}

/// API response for a commit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommitImportResponse {
    /// The session that was committed.
    pub session_id: String,
    /// Per-row results.
    pub report: CommitReport,
    /// A one-line summary for display.
    pub message: String,
}
