// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Import sessions: classification, preview selection and cell editing.

use booth_map_domain::{EventYear, RecordKind};
use serde::Serialize;

use crate::config::ImportContext;
use crate::error::{CoreError, SelectionError};
use crate::index::ExistingIndex;
use crate::matcher::{MatchOutcome, match_row};
use crate::normalize::normalize_row;
use crate::row::{ImportRow, NormalizedFields, RawRow, RowAction};
use crate::validator::{SeenKeys, validate_row};

/// Lifecycle of an import session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionPhase {
    /// The file is being read.
    Parsing,
    /// Rows are being normalized, matched and validated.
    Validating,
    /// Rows are classified and the selection may be changed.
    PreviewReady,
    /// Selected rows are being written.
    Committing,
    /// The commit finished. The session is read-only.
    Done,
}

impl SessionPhase {
    /// Returns the display name of this phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Validating => "validating",
            Self::PreviewReady => "preview ready",
            Self::Committing => "committing",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row counts of a session, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    /// All rows.
    pub total: usize,
    /// Rows classified `Create`.
    pub create: usize,
    /// Rows classified `Update`.
    pub update: usize,
    /// Rows classified `Error`.
    pub error: usize,
    /// Rows currently selected.
    pub selected: usize,
}

/// One uploaded file being reconciled against the store.
#[derive(Debug, Clone)]
pub struct ImportSession {
    kind: RecordKind,
    context: ImportContext,
    index: ExistingIndex,
    phase: SessionPhase,
    raw_rows: Vec<RawRow>,
    rows: Vec<ImportRow>,
}

impl ImportSession {
    /// Creates an empty session in the `Parsing` phase.
    #[must_use]
    pub const fn new(kind: RecordKind, context: ImportContext, index: ExistingIndex) -> Self {
        Self {
            kind,
            context,
            index,
            phase: SessionPhase::Parsing,
            raw_rows: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Creates a session and classifies `raw_rows` in one step.
    #[must_use]
    pub fn preview(
        kind: RecordKind,
        raw_rows: Vec<RawRow>,
        context: ImportContext,
        index: ExistingIndex,
    ) -> Self {
        let mut session: Self = Self::new(kind, context, index);
        session.classify(raw_rows);
        session
    }

    /// Loads parsed rows and classifies them.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPhase` unless the session is `Parsing`.
    pub fn load_rows(&mut self, raw_rows: Vec<RawRow>) -> Result<ImportSummary, CoreError> {
        if self.phase != SessionPhase::Parsing {
            return Err(CoreError::InvalidPhase {
                operation: "load rows",
                phase: self.phase,
            });
        }
        self.classify(raw_rows);
        Ok(self.summary())
    }

    fn classify(&mut self, raw_rows: Vec<RawRow>) {
        self.phase = SessionPhase::Validating;
        self.raw_rows = raw_rows;
        self.rows = self.build_rows(&[]);
        self.phase = SessionPhase::PreviewReady;
    }

    /// Normalizes, matches and validates every raw row in file order.
    ///
    /// `previous` holds the rows of an earlier pass; a row keeps its
    /// selection when its action is unchanged.
    fn build_rows(&self, previous: &[ImportRow]) -> Vec<ImportRow> {
        let mut seen: SeenKeys = SeenKeys::new();

        self.raw_rows
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let fields: NormalizedFields =
                    normalize_row(self.kind, raw, &self.context, &self.index);
                let outcome: MatchOutcome = match_row(&fields, &self.index);
                let errors: Vec<String> =
                    validate_row(&fields, outcome.key.as_ref(), &self.index, &mut seen);

                let action: RowAction = if errors.is_empty() {
                    outcome.action
                } else {
                    RowAction::Error
                };
                let selected: bool = match previous.get(i) {
                    Some(prior) if prior.action == action => prior.selected,
                    _ => action != RowAction::Error,
                };

                ImportRow {
                    row_number: i + 1,
                    kind: self.kind,
                    raw: raw.clone(),
                    fields,
                    match_key: outcome.key,
                    existing_id: outcome.existing_id,
                    action,
                    errors,
                    selected,
                }
            })
            .collect()
    }

    fn ensure_editable(&self) -> Result<(), SelectionError> {
        if self.phase == SessionPhase::PreviewReady {
            Ok(())
        } else {
            Err(SelectionError::SessionLocked { phase: self.phase })
        }
    }

    /// Flips the selection of one row.
    ///
    /// # Returns
    ///
    /// The row's new selection state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is locked, the index is out of range,
    /// or the row has validation errors. The session is unchanged on error.
    pub fn toggle_row(&mut self, index: usize) -> Result<bool, SelectionError> {
        self.ensure_editable()?;
        let len: usize = self.rows.len();
        let row: &mut ImportRow = self
            .rows
            .get_mut(index)
            .ok_or(SelectionError::RowOutOfRange { index, len })?;
        if row.action == RowAction::Error {
            return Err(SelectionError::RowHasErrors {
                row_number: row.row_number,
            });
        }
        row.selected = !row.selected;
        Ok(row.selected)
    }

    /// Selects every non-error row matching `predicate`.
    ///
    /// # Returns
    ///
    /// The number of rows that changed from unselected to selected.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::SessionLocked` outside `PreviewReady`.
    pub fn select_all<P>(&mut self, predicate: P) -> Result<usize, SelectionError>
    where
        P: Fn(&ImportRow) -> bool,
    {
        self.ensure_editable()?;
        let mut changed: usize = 0;
        for row in &mut self.rows {
            if row.action != RowAction::Error && !row.selected && predicate(row) {
                row.selected = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Deselects every row matching `predicate`.
    ///
    /// # Returns
    ///
    /// The number of rows that changed from selected to unselected.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::SessionLocked` outside `PreviewReady`.
    pub fn deselect_all<P>(&mut self, predicate: P) -> Result<usize, SelectionError>
    where
        P: Fn(&ImportRow) -> bool,
    {
        self.ensure_editable()?;
        let mut changed: usize = 0;
        for row in &mut self.rows {
            if row.selected && predicate(row) {
                row.selected = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Overwrites one cell and reclassifies the whole file.
    ///
    /// Every row is reclassified because an edit can create or resolve an
    /// in-file duplicate elsewhere. The column is appended when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is locked or the index is out of range.
    pub fn edit_cell(
        &mut self,
        index: usize,
        header: &str,
        value: &str,
    ) -> Result<&ImportRow, SelectionError> {
        self.ensure_editable()?;
        let len: usize = self.raw_rows.len();
        let raw: &mut RawRow = self
            .raw_rows
            .get_mut(index)
            .ok_or(SelectionError::RowOutOfRange { index, len })?;
        raw.set(header, value);

        let rows: Vec<ImportRow> = self.build_rows(&self.rows);
        self.rows = rows;
        self.rows
            .get(index)
            .ok_or(SelectionError::RowOutOfRange { index, len })
    }

    /// Returns the current row counts.
    #[must_use]
    pub fn summary(&self) -> ImportSummary {
        self.rows
            .iter()
            .fold(ImportSummary::default(), |mut summary, row| {
                summary.total += 1;
                match row.action {
                    RowAction::Create => summary.create += 1,
                    RowAction::Update => summary.update += 1,
                    RowAction::Error => summary.error += 1,
                }
                if row.selected {
                    summary.selected += 1;
                }
                summary
            })
    }

    /// Returns the rows that will be committed.
    pub fn selected_rows(&self) -> impl Iterator<Item = &ImportRow> {
        self.rows
            .iter()
            .filter(|row| row.selected && row.action != RowAction::Error)
    }

    /// Returns all rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    /// Returns one row.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&ImportRow> {
        self.rows.get(index)
    }

    /// Returns the record kind.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the default event year.
    #[must_use]
    pub const fn target_year(&self) -> Option<EventYear> {
        self.context.target_year
    }

    /// Returns the existing index.
    #[must_use]
    pub const fn index(&self) -> &ExistingIndex {
        &self.index
    }

    pub(crate) fn begin_commit(&mut self) -> Result<(), CoreError> {
        if self.phase != SessionPhase::PreviewReady {
            return Err(CoreError::InvalidPhase {
                operation: "commit",
                phase: self.phase,
            });
        }
        self.phase = SessionPhase::Committing;
        Ok(())
    }

    pub(crate) const fn finish_commit(&mut self) {
        self.phase = SessionPhase::Done;
    }
}
