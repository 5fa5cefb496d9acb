// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.

pub mod catalogue;
pub mod index;
pub mod records;

use booth_map_domain::EventYear;

use crate::error::PersistenceError;

/// Converts a stored year column into an `EventYear`.
pub(crate) fn event_year_from_db(year: i32) -> Result<EventYear, PersistenceError> {
    u16::try_from(year)
        .map(EventYear::new)
        .map_err(|_| PersistenceError::InvalidValue(format!("year {year}")))
}

/// Converts a stored count column into a `u32`.
pub(crate) fn count_from_db(field: &str, value: i32) -> Result<u32, PersistenceError> {
    u32::try_from(value).map_err(|_| PersistenceError::InvalidValue(format!("{field} {value}")))
}
