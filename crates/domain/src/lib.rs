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

mod error;
mod normalize;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use normalize::{
    FALSE_TOKENS, PhoneRegion, TRUE_TOKENS, natural_key, normalize_email, normalize_phone,
    optional_text, parse_count, parse_flag,
};
pub use types::{
    AssignmentRecord, Category, CompanyRecord, EventYear, Flag, Numeric, Record, RecordKind,
    SubscriptionRecord,
};
pub use validation::{
    parse_event_year, validate_count, validate_email, validate_event_year, validate_flag,
    validate_phone,
};
