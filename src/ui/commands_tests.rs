#![allow(clippy::unwrap_used)]

use chrono::TimeZone;

use super::*;
use crate::db::Database;
use crate::directory::UserDirectory;
use crate::error::CostResult;
use crate::store::RecordStore;

struct Known;

impl UserDirectory for Known {
    fn exists(&self, owner_id: i64) -> CostResult<bool> {
        Ok(owner_id != 404)
    }
}

fn app() -> App {
    App::new(Utc::now())
}

#[test]
fn test_registry_has_core_commands() {
    for name in ["q", "owner", "month", "add", "report", "records", "export", "next-month"] {
        assert!(COMMANDS.contains_key(name), "missing :{name}");
    }
}

#[test]
fn test_unknown_command_suggests_closest() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();
    handle_command("expotr", &mut app, &backend).unwrap();
    assert!(app.status_message.contains(":export"));
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("owner", "owner"), 0);
    assert_eq!(levenshtein("ownr", "owner"), 1);
    assert_eq!(levenshtein("", "add"), 3);
}

#[test]
fn test_quit() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();
    handle_command("q", &mut app, &backend).unwrap();
    assert!(!app.running);
}

#[test]
fn test_owner_sets_and_clears() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();

    handle_command("owner 7", &mut app, &backend).unwrap();
    assert_eq!(app.owner, Some(7));
    handle_command("owner -3", &mut app, &backend).unwrap();
    assert_eq!(app.owner, Some(7));
    assert!(app.status_message.contains("positive"));
    handle_command("owner", &mut app, &backend).unwrap();
    assert_eq!(app.owner, None);
}

#[test]
fn test_month_formats() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = App::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());

    handle_command("month 2023-11", &mut app, &backend).unwrap();
    assert_eq!(app.current_month, YearMonth::new(2023, 11).unwrap());
    handle_command("m 2", &mut app, &backend).unwrap();
    assert_eq!(app.current_month, YearMonth::new(2023, 2).unwrap());
    handle_command("m 2023-13", &mut app, &backend).unwrap();
    assert_eq!(app.current_month, YearMonth::new(2023, 2).unwrap());
    assert!(app.status_message.starts_with("Invalid month"));
}

#[test]
fn test_next_and_prev_month_cross_year() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = App::new(Utc.with_ymd_and_hms(2024, 12, 5, 0, 0, 0).unwrap());

    handle_command("next-month", &mut app, &backend).unwrap();
    assert_eq!(app.current_month, YearMonth::new(2025, 1).unwrap());
    handle_command("prev-month", &mut app, &backend).unwrap();
    handle_command("prev-month", &mut app, &backend).unwrap();
    assert_eq!(app.current_month, YearMonth::new(2024, 11).unwrap());
}

#[test]
fn test_add_requires_owner() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();

    handle_command("add food 4.50 coffee", &mut app, &backend).unwrap();
    assert!(app.status_message.contains(":owner"));
    assert_eq!(db.get_record_count().unwrap(), 0);
}

#[test]
fn test_add_stores_record_and_refreshes() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();

    handle_command("owner 7", &mut app, &backend).unwrap();
    handle_command("add food 4.50 flat white", &mut app, &backend).unwrap();

    let all = db.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "flat white");
    assert_eq!(all[0].category, "food");
    assert_eq!(app.records.len(), 1);
    assert!(app.status_message.starts_with("Added #"));
}

#[test]
fn test_add_failures_are_reported_not_raised() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();

    handle_command("owner 404", &mut app, &backend).unwrap();
    handle_command("add food 4.50 coffee", &mut app, &backend).unwrap();
    assert!(app.status_message.starts_with("Not added"));

    handle_command("owner 7", &mut app, &backend).unwrap();
    handle_command("add food lots coffee", &mut app, &backend).unwrap();
    assert!(app.status_message.contains("sum"));
    handle_command("add food", &mut app, &backend).unwrap();
    assert!(app.status_message.starts_with("Usage"));
    assert_eq!(db.get_record_count().unwrap(), 0);
}

#[test]
fn test_report_switches_screen() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();

    handle_command("owner 7", &mut app, &backend).unwrap();
    handle_command("report", &mut app, &backend).unwrap();
    assert_eq!(app.screen, Screen::Report);
    let report = app.report.as_ref().unwrap();
    assert_eq!(report.categories.len(), 4);
}

#[test]
fn test_export_writes_shown_records() {
    let db = Database::open_in_memory().unwrap();
    let backend = Backend { db: &db, users: &Known };
    let mut app = app();
    handle_command("owner 7", &mut app, &backend).unwrap();
    handle_command("add food 2 bread", &mut app, &backend).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shown.csv");
    handle_command(&format!("export {}", path.display()), &mut app, &backend).unwrap();
    assert!(app.status_message.starts_with("Exported 1 records"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
}
