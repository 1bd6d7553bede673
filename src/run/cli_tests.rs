#![allow(clippy::unwrap_used)]

use chrono::TimeZone;
use rust_decimal_macros::dec;

use super::*;
use crate::error::CostResult;
use crate::store::RecordStore;

struct Everyone;

impl UserDirectory for Everyone {
    fn exists(&self, _owner_id: i64) -> CostResult<bool> {
        Ok(true)
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn seed(db: &Database) {
    for (owner, month, category) in [(7, 2, "food"), (7, 3, "dairy"), (8, 3, "food")] {
        let when = Utc.with_ymd_and_hms(2024, month, 10, 12, 0, 0).unwrap();
        let record = crate::models::NewRecord::new("item", category, owner, dec!(1), Some(when), when)
            .unwrap();
        db.insert(&record).unwrap();
    }
}

#[test]
fn test_positionals_skip_flags_and_values() {
    let a = args(&["7", "food", "--date", "2024-03-01", "3.50", "--json", "fresh", "bread"]);
    assert_eq!(positionals(&a), vec!["7", "food", "3.50", "fresh", "bread"]);
}

#[test]
fn test_flag_value() {
    let a = args(&["out.csv", "--month", "2024-03"]);
    assert_eq!(flag_value(&a, "--month"), Some("2024-03"));
    assert_eq!(flag_value(&a, "--owner"), None);
    assert!(!has_flag(&a, "--json"));
}

#[test]
fn test_select_records_filters() {
    let db = Database::open_in_memory().unwrap();
    seed(&db);
    let service = CostService::new(&db, &db, &Everyone as &dyn UserDirectory);

    assert_eq!(select_records(&args(&[]), &db, &service).unwrap().len(), 3);
    assert_eq!(
        select_records(&args(&["--owner", "7"]), &db, &service).unwrap().len(),
        2
    );
    assert_eq!(
        select_records(&args(&["--month", "2024-03"]), &db, &service).unwrap().len(),
        2
    );
    let both = select_records(&args(&["--owner", "7", "--month", "2024-03"]), &db, &service)
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].category, "dairy");
}

#[test]
fn test_select_records_rejects_bad_filters() {
    let db = Database::open_in_memory().unwrap();
    let service = CostService::new(&db, &db, &Everyone as &dyn UserDirectory);

    assert!(select_records(&args(&["--owner", "abc"]), &db, &service).is_err());
    assert!(select_records(&args(&["--owner", "0", "--month", "2024-03"]), &db, &service).is_err());
    assert!(select_records(&args(&["--month", "2024-13"]), &db, &service).is_err());
}

#[test]
fn test_unknown_command_fails() {
    let db = Database::open_in_memory().unwrap();
    assert!(as_cli(&args(&["costbook", "frobnicate"]), &db, &Everyone).is_err());
}

#[test]
fn test_add_then_total_through_cli() {
    let db = Database::open_in_memory().unwrap();
    let today = Utc::now().format("%Y-%m-%d").to_string();
    as_cli(
        &args(&["costbook", "add", "7", "dairy", "3.50", "whole", "milk", "--date", &today]),
        &db,
        &Everyone,
    )
    .unwrap();

    let all = db.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "whole milk");
    assert_eq!(all[0].amount, dec!(3.50));
    assert!(as_cli(&args(&["costbook", "total", "7"]), &db, &Everyone).is_ok());
}

#[test]
fn test_add_with_missing_arguments_fails() {
    let db = Database::open_in_memory().unwrap();
    assert!(as_cli(&args(&["costbook", "add", "7", "dairy"]), &db, &Everyone).is_err());
    assert_eq!(db.get_record_count().unwrap(), 0);
}
