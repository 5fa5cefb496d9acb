// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CompanyRecord, DomainError, EventYear, Flag, Numeric, Record, RecordKind,
};
use std::str::FromStr;

#[test]
fn test_record_kind_round_trips_through_slug() {
    for kind in RecordKind::ALL {
        let parsed: RecordKind = RecordKind::from_str(kind.as_str()).unwrap();
        assert_eq!(parsed, kind);
        assert_eq!(kind.to_string(), kind.as_str());
    }
}

#[test]
fn test_record_kind_accepts_singular_and_case() {
    assert_eq!(RecordKind::from_str("Company").unwrap(), RecordKind::Company);
    assert_eq!(
        RecordKind::from_str(" SUBSCRIPTION ").unwrap(),
        RecordKind::Subscription
    );
    assert!(matches!(
        RecordKind::from_str("booths"),
        Err(DomainError::UnknownRecordKind(_))
    ));
}

#[test]
fn test_only_subscriptions_and_assignments_are_year_scoped() {
    assert!(!RecordKind::Company.is_year_scoped());
    assert!(RecordKind::Subscription.is_year_scoped());
    assert!(RecordKind::Assignment.is_year_scoped());
}

#[test]
fn test_event_years_order_by_value() {
    let mut years: Vec<EventYear> = vec![EventYear::new(2027), EventYear::new(2025)];
    years.sort();
    assert_eq!(years[0].year(), 2025);
    assert_eq!(EventYear::new(2026).to_string(), "2026");
}

#[test]
fn test_flag_and_numeric_fallbacks() {
    assert!(Flag::Set(true).is_set());
    assert!(!Flag::Set(false).is_set());
    assert!(!Flag::Unrecognized(String::from("maybe")).is_set());
    assert_eq!(Numeric::Value(3).value_or_zero(), 3);
    assert_eq!(Numeric::Invalid(String::from("x")).value_or_zero(), 0);
}

#[test]
fn test_record_reports_its_kind() {
    let record: Record = Record::Company(CompanyRecord {
        name: String::from("Acme BV"),
        ..CompanyRecord::default()
    });
    assert_eq!(record.kind(), RecordKind::Company);
}
