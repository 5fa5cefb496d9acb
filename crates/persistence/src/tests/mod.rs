// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use booth_map_domain::{CompanyRecord, EventYear, Record};

use crate::Persistence;

pub fn event_year() -> EventYear {
    EventYear::new(2026)
}

pub fn company_record(name: &str) -> Record {
    Record::Company(CompanyRecord {
        name: name.to_string(),
        ..CompanyRecord::default()
    })
}

/// Database with categories Food and Tech, booths A12 and A13 in 2026,
/// and the company Acme BV.
pub fn create_seeded_persistence() -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence.create_category("Food").unwrap();
    persistence.create_category("Tech").unwrap();
    persistence.create_marker("A12", event_year()).unwrap();
    persistence.create_marker("A13", event_year()).unwrap();
    persistence.create_company("Acme BV").unwrap();
    persistence
}
