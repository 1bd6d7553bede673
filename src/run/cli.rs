use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::shellexpand;
use crate::db::Database;
use crate::directory::UserDirectory;
use crate::export;
use crate::models::{check_owner, parse_number, ExpenditureRecord, MonthlyReport, YearMonth};
use crate::service::{parse_amount, parse_date, CostService, ReportRequest};
use crate::ui::util::format_amount;

/// Flags that take a value; everything else starting with `--` is a switch.
const VALUE_FLAGS: [&str; 3] = ["--date", "--owner", "--month"];

pub(crate) fn as_cli(args: &[String], db: &Database, users: &dyn UserDirectory) -> Result<()> {
    let service = CostService::new(db, db, users);
    match args[1].as_str() {
        "add" | "a" => cli_add(&args[2..], &service),
        "list" | "ls" => cli_list(&args[2..], db, &service),
        "total" => cli_total(&args[2..], &service),
        "report" | "r" => cli_report(&args[2..], &service),
        "export" => cli_export(&args[2..], db, &service),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("costbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

type Service<'a> = CostService<'a, Database, Database, dyn UserDirectory + 'a>;

fn print_usage() {
    println!("Costbook - per-user expenditure tracker");
    println!();
    println!("Usage: costbook [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                  Launch interactive TUI");
    println!("  add <user> <category> <sum> <description...>");
    println!("    --date <YYYY-MM-DD>                   Date of the expense (default: now)");
    println!("  list                                    List records");
    println!("    --owner <user>                        Only this user's records");
    println!("    --month <YYYY-MM>                     Only records in this month");
    println!("  total <user>                            Sum of everything a user has recorded");
    println!("  report <user> <year> <month>            Monthly report grouped by category");
    println!("  export [path]                           Export records to CSV");
    println!("    --owner <user>, --month <YYYY-MM>     Filter what is exported");
    println!("  --json                                  JSON output (add, list, total, report)");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
    println!();
    println!("Environment:");
    println!("  USER_SERVICE_URL, USER_SERVICE_TIMEOUT_MS, COSTBOOK_DB, COSTBOOK_LOG");
}

fn cli_add(args: &[String], service: &Service) -> Result<()> {
    let rest = positionals(args);
    if rest.len() < 4 {
        anyhow::bail!(
            "Usage: costbook add <user> <category> <sum> <description...> [--date YYYY-MM-DD]"
        );
    }

    let owner_id = parse_number("userid", rest[0])?;
    let amount = parse_amount(rest[2])?;
    let description = rest[3..].join(" ");
    let occurred_at = flag_value(args, "--date").map(parse_date).transpose()?;

    let record = service
        .add_record(&description, rest[1], owner_id, amount, occurred_at, Utc::now())
        .context("Failed to add record")?;

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!(
            "Added #{} for user {}: {} {} ({})",
            record.id,
            record.owner_id,
            record.category,
            format_amount(record.amount),
            record.occurred_at.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

fn cli_list(args: &[String], db: &Database, service: &Service) -> Result<()> {
    let records = select_records(args, db, service)?;

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No records");
        return Ok(());
    }
    print_records(&records);
    Ok(())
}

fn cli_total(args: &[String], service: &Service) -> Result<()> {
    let raw = positionals(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: costbook total <user> [--json]"))?;
    let total = service.total_for_owner(parse_number("userid", raw)?)?;

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string(&total)?);
    } else {
        println!("User {}: {}", total.owner_id, format_amount(total.total));
    }
    Ok(())
}

fn cli_report(args: &[String], service: &Service) -> Result<()> {
    let rest = positionals(args);
    let get = |i: usize| rest.get(i).copied().unwrap_or_default();
    let request = ReportRequest::parse(get(0), get(1), get(2))?;
    let report = service
        .report_for(request, Utc::now())
        .context("Failed to build report")?;

    if has_flag(args, "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn cli_export(args: &[String], db: &Database, service: &Service) -> Result<()> {
    let records = select_records(args, db, service)?;

    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let suffix = flag_value(args, "--month").unwrap_or("all");
            export::default_export_path(suffix)
        });

    let count = export::export_to_csv(std::path::Path::new(&output_path), &records)?;
    if count == 0 {
        println!("No records to export (wrote header only to {output_path})");
    } else {
        println!("Exported {count} records to {output_path}");
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────

/// Apply `--owner` / `--month` filters.
fn select_records(
    args: &[String],
    db: &Database,
    service: &Service,
) -> Result<Vec<ExpenditureRecord>> {
    let owner = flag_value(args, "--owner")
        .map(|raw| parse_number("userid", raw))
        .transpose()?;
    let month = flag_value(args, "--month").map(YearMonth::parse).transpose()?;

    let records = match (owner, month) {
        (owner, Some(period)) => {
            if let Some(id) = owner {
                check_owner(id)?;
            }
            db.get_records_in_month(period, owner)?
        }
        (Some(id), None) => service.records_for_owner(id)?,
        (None, None) => service.list_all_records()?,
    };
    Ok(records)
}

fn print_records(records: &[ExpenditureRecord]) {
    println!(
        "{:<6} {:<10} {:<8} {:<14} {:<28} {:>12}",
        "ID", "Date", "User", "Category", "Description", "Sum"
    );
    println!("{}", "─".repeat(83));
    for r in records {
        println!(
            "{:<6} {:<10} {:<8} {:<14} {:<28} {:>12}",
            r.id,
            r.occurred_at.format("%Y-%m-%d"),
            r.owner_id,
            crate::ui::util::truncate(&r.category, 14),
            crate::ui::util::truncate(&r.description, 28),
            format_amount(r.amount),
        );
    }
}

fn print_report(report: &MonthlyReport) {
    println!(
        "Costbook - user {} - {:04}-{:02}",
        report.owner_id, report.year, report.month
    );
    println!("{}", "─".repeat(40));
    for (name, entries) in &report.categories {
        println!(
            "{name:<26} {:>13}",
            format_amount(report.category_total(name))
        );
        for entry in entries {
            println!(
                "  {:>2}  {:<20} {:>13}",
                entry.day_of_month,
                crate::ui::util::truncate(&entry.description, 20),
                format_amount(entry.amount),
            );
        }
    }
    println!("{}", "─".repeat(40));
    println!("{:<26} {:>13}", "Total", format_amount(report.total()));
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
