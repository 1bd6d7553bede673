#![allow(clippy::unwrap_used, clippy::panic)]

use std::cell::Cell;

use chrono::{TimeZone, Timelike};
use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;
use crate::error::CostError;

struct Users {
    known: bool,
    calls: Cell<usize>,
}

impl Users {
    fn known() -> Self {
        Self {
            known: true,
            calls: Cell::new(0),
        }
    }

    fn unknown() -> Self {
        Self {
            known: false,
            calls: Cell::new(0),
        }
    }
}

impl UserDirectory for Users {
    fn exists(&self, _owner_id: i64) -> CostResult<bool> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.known)
    }
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

// ── add_record ────────────────────────────────────────────────

#[test]
fn test_add_then_list() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    let now = at(2024, 3, 15);

    let milk = service
        .add_record("milk", "dairy", 7, dec!(3.5), None, now)
        .unwrap();
    let rent = service
        .add_record("  march rent ", "housing", 8, dec!(900), Some(at(2024, 3, 1)), now)
        .unwrap();

    assert_eq!(milk.occurred_at, now);
    assert_eq!(rent.description, "march rent");

    let all = service.list_all_records().unwrap();
    assert_eq!(all, vec![milk.clone(), rent]);
    assert_eq!(service.records_for_owner(7).unwrap(), vec![milk]);
    assert_eq!(users.calls.get(), 2);
}

#[test]
fn test_added_record_matches_listed_record() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    let now = Utc
        .with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
        .unwrap()
        .with_nanosecond(123_456_789)
        .unwrap();

    let added = service
        .add_record("milk", "dairy", 7, dec!(3.5), None, now)
        .unwrap();
    let listed = service.list_all_records().unwrap();

    assert_eq!(listed, vec![added.clone()]);
    assert_eq!(
        serde_json::to_string(&added).unwrap(),
        serde_json::to_string(&listed[0]).unwrap()
    );
    assert_eq!(added.occurred_at.nanosecond(), 123_456_000);
}

#[test]
fn test_add_to_closed_month_fails_before_directory() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::unknown();
    let service = CostService::new(&db, &db, &users);

    let err = service
        .add_record("milk", "dairy", 7, dec!(3.5), Some(at(2024, 2, 28)), at(2024, 3, 1))
        .unwrap_err();
    match err {
        CostError::Validation(ValidationError::MonthPassed(period)) => {
            assert_eq!(period, YearMonth::new(2024, 2).unwrap());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(users.calls.get(), 0);
    assert_eq!(db.get_record_count().unwrap(), 0);
}

#[test]
fn test_add_on_last_day_of_month_is_accepted() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    let now = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();

    assert!(service
        .add_record("late lunch", "food", 7, dec!(12), Some(at(2024, 3, 2)), now)
        .is_ok());
}

#[test]
fn test_add_for_unknown_user_stores_nothing() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::unknown();
    let service = CostService::new(&db, &db, &users);

    let err = service
        .add_record("milk", "dairy", 7, dec!(3.5), None, at(2024, 3, 15))
        .unwrap_err();
    assert!(matches!(err, CostError::UserNotFound(7)));
    assert_eq!(db.get_record_count().unwrap(), 0);
}

#[test]
fn test_add_rejects_invalid_fields() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    let now = at(2024, 3, 15);

    let cases = [
        ("", "food", 7, dec!(1), ValidationError::EmptyDescription),
        ("bread", " ", 7, dec!(1), ValidationError::EmptyCategory),
        ("bread", "food", 0, dec!(1), ValidationError::NonPositiveOwner(0)),
        ("bread", "food", 7, dec!(0), ValidationError::NonPositiveAmount(dec!(0))),
        ("bread", "food", 7, dec!(-2), ValidationError::NonPositiveAmount(dec!(-2))),
    ];
    for (description, category, owner, amount, expected) in cases {
        match service.add_record(description, category, owner, amount, None, now) {
            Err(CostError::Validation(e)) => assert_eq!(e, expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert_eq!(users.calls.get(), 0);
}

// ── totals ────────────────────────────────────────────────────

#[test]
fn test_total_for_owner_without_records_is_zero() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::unknown();
    let service = CostService::new(&db, &db, &users);

    let total = service.total_for_owner(42).unwrap();
    assert_eq!(total, OwnerTotal { owner_id: 42, total: dec!(0) });
    assert_eq!(users.calls.get(), 0);
    assert_eq!(
        serde_json::to_value(&total).unwrap(),
        serde_json::json!({ "userid": 42, "total": "0" })
    );
}

#[test]
fn test_total_for_owner_sums_only_that_owner() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    let now = at(2024, 3, 15);

    service.add_record("a", "food", 7, dec!(1.25), None, now).unwrap();
    service.add_record("b", "health", 7, dec!(10), None, now).unwrap();
    service.add_record("c", "food", 8, dec!(99), None, now).unwrap();

    assert_eq!(service.total_for_owner(7).unwrap().total, dec!(11.25));
    assert!(matches!(
        service.total_for_owner(-1),
        Err(CostError::Validation(ValidationError::NonPositiveOwner(-1)))
    ));
}

// ── reports ───────────────────────────────────────────────────

#[test]
fn test_monthly_report_example() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);

    service
        .add_record("milk", "dairy", 7, dec!(3.5), Some(at(2024, 3, 5)), at(2024, 3, 5))
        .unwrap();

    let report = service.monthly_report(7, 2024, 3, at(2024, 3, 20)).unwrap();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        serde_json::json!({
            "userid": 7,
            "year": 2024,
            "month": 3,
            "costs": [
                { "food": [] },
                { "education": [] },
                { "health": [] },
                { "housing": [] },
                { "dairy": [ { "sum": "3.5", "description": "milk", "day": 5 } ] }
            ]
        })
    );
    // Still March: nothing materialized.
    assert_eq!(db.get_report_count().unwrap(), 0);

    let closed = service.monthly_report(7, 2024, 3, at(2024, 4, 2)).unwrap();
    assert_eq!(closed, report);
    assert_eq!(db.get_report_count().unwrap(), 1);
}

#[test]
fn test_closed_month_report_round_trips_through_database() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);
    for (day, amount) in [(3, dec!(4.10)), (3, dec!(2)), (1, dec!(7))] {
        service
            .add_record("bread", "food", 7, amount, Some(at(2024, 3, day)), at(2024, 3, day))
            .unwrap();
    }

    let first = service.monthly_report(7, 2024, 3, at(2024, 6, 1)).unwrap();
    let amounts: Vec<Decimal> = first.entries("food").unwrap().iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![dec!(7), dec!(4.10), dec!(2)]);

    let again = service.monthly_report(7, 2024, 3, at(2024, 7, 1)).unwrap();
    assert_eq!(again, first);
    assert_eq!(again.entries("food").unwrap()[1].amount.to_string(), "4.10");
}

#[test]
fn test_report_request_parse() {
    let request = ReportRequest::parse("7", " 2024", "3 ").unwrap();
    assert_eq!(request, ReportRequest { owner_id: 7, year: 2024, month: 3 });

    assert_eq!(
        ReportRequest::parse("", "2024", "3").unwrap_err(),
        ValidationError::MissingParameter("userid")
    );
    assert_eq!(
        ReportRequest::parse("7", "twenty", "3").unwrap_err(),
        ValidationError::NotANumber { field: "year", value: "twenty".into() }
    );
}

#[test]
fn test_report_for_applies_range_checks() {
    let db = Database::open_in_memory().unwrap();
    let users = Users::known();
    let service = CostService::new(&db, &db, &users);

    let request = ReportRequest::parse("7", "2024", "13").unwrap();
    assert!(matches!(
        service.report_for(request, at(2024, 3, 1)),
        Err(CostError::Validation(ValidationError::MonthOutOfRange(13)))
    ));
    assert_eq!(users.calls.get(), 0);
}

// ── parsing helpers ───────────────────────────────────────────

#[test]
fn test_parse_date() {
    assert_eq!(
        parse_date("2024-03-05").unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
    );
    assert_eq!(
        parse_date("03/05/2024").unwrap_err(),
        ValidationError::InvalidDate("03/05/2024".into())
    );
    assert!(parse_date("2024-02-30").is_err());
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("3.50").unwrap(), dec!(3.50));
    assert_eq!(parse_amount("$12").unwrap(), dec!(12));
    assert_eq!(parse_amount(" ").unwrap_err(), ValidationError::MissingParameter("sum"));
    assert!(matches!(
        parse_amount("lots"),
        Err(ValidationError::NotANumber { field: "sum", .. })
    ));
}
