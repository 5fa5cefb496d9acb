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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod commit;
mod config;
mod error;
mod index;
mod matcher;
mod normalize;
mod row;
mod session;
mod store;
mod validator;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use commit::{
    BatchCommitter, CANCELLED_REASON, CancelHandle, CommitProgress, CommitReport, FailedRow,
    OutcomeStatus, RowOutcome,
};
pub use config::{DEFAULT_BATCH_SIZE, ImportConfig, ImportContext};
pub use error::{CoreError, SelectionError, StoreError};
pub use index::ExistingIndex;
pub use matcher::{MatchOutcome, match_key, match_row};
pub use normalize::normalize_row;
pub use row::{
    AssignmentFields, CompanyFields, ImportRow, MatchKey, NormalizedFields, RawRow, RowAction,
    SubscriptionFields, YearField, normalize_header,
};
pub use session::{ImportSession, ImportSummary, SessionPhase};
pub use store::{RecordStore, WriteResults, record_from_row};
pub use validator::{SeenKeys, validate_row};
