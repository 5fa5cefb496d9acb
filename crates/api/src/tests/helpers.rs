// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use booth_map::{ImportConfig, ImportSession};
use booth_map_domain::{EventYear, RecordKind};
use booth_map_persistence::{Persistence, SqliteStore};
use time::Date;
use time::macros::date;

use crate::{AuthenticatedActor, FileFormat, Role, StartImportRequest, start_import};

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_editor() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("editor-456"), Role::Editor)
}

pub fn create_test_viewer() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("viewer-789"), Role::Viewer)
}

pub fn event_year() -> EventYear {
    EventYear::new(2026)
}

pub fn export_date() -> Date {
    date!(2026 - 10 - 16)
}

/// Store with categories Food and Tech, booths A12 and A13 in 2026,
/// and the company Acme BV.
pub fn create_seeded_store() -> SqliteStore {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.create_category("Food").unwrap();
    persistence.create_category("Tech").unwrap();
    persistence.create_marker("A12", event_year()).unwrap();
    persistence.create_marker("A13", event_year()).unwrap();
    persistence.create_company("Acme BV").unwrap();
    SqliteStore::new(persistence)
}

pub fn import_request(kind: RecordKind, format: FileFormat) -> StartImportRequest {
    StartImportRequest {
        kind,
        format,
        year: Some(2026),
    }
}

/// Builds a preview session as an admin with the default configuration.
pub async fn start_test_import(
    store: &SqliteStore,
    kind: RecordKind,
    format: FileFormat,
    bytes: &[u8],
) -> ImportSession {
    start_import(
        store,
        &ImportConfig::default(),
        &create_test_admin(),
        &import_request(kind, format),
        bytes,
    )
    .await
    .unwrap()
}
