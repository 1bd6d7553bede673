use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Utc;

use super::app::{App, Backend, Screen};
use crate::config::shellexpand;
use crate::export;
use crate::models::{check_owner, parse_number, YearMonth};
use crate::service::parse_amount;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Backend) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Costbook", cmd_quit, r);
    register_command!("quit", "Quit Costbook", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("records", "Go to Records", cmd_records, r);
    register_command!("rec", "Go to Records", cmd_records, r);
    register_command!("report", "Go to Report", cmd_report, r);
    register_command!("r", "Go to Report", cmd_report, r);
    register_command!(
        "owner",
        "Select user (e.g. :owner 7, :owner to clear)",
        cmd_owner,
        r
    );
    register_command!("o", "Select user (e.g. :o 7)", cmd_owner, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!(
        "add",
        "Add record for selected user (e.g. :add food 4.50 coffee)",
        cmd_add,
        r
    );
    register_command!("a", "Add record (e.g. :a food 4.50 coffee)", cmd_add, r);
    register_command!(
        "export",
        "Export shown records to CSV (e.g. :export ~/costs.csv)",
        cmd_export,
        r
    );
    register_command!("refresh", "Reload records and report", cmd_refresh, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, backend)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _backend: &Backend) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _backend: &Backend) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_records(_args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    app.screen = Screen::Records;
    app.refresh_records(backend)
}

fn cmd_report(_args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    app.screen = Screen::Report;
    app.refresh_report(backend);
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    app.refresh_all(backend)?;
    app.set_status("Reloaded");
    Ok(())
}

fn cmd_owner(args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    if args.is_empty() {
        app.owner = None;
        app.set_status("Showing all users");
    } else {
        let owner = match parse_number("userid", args).and_then(|id| check_owner(id).map(|()| id)) {
            Ok(id) => id,
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        };
        app.owner = Some(owner);
        app.set_status(format!("Selected user {owner}"));
    }
    app.refresh_all(backend)
}

fn cmd_month(args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    // Accept "2024-01", "2024-1", or a bare month number for the current year.
    let parsed = if args.len() <= 2 && !args.is_empty() {
        YearMonth::parse(&format!("{}-{args}", app.current_month.year()))
    } else {
        YearMonth::parse(args)
    };

    match parsed {
        Ok(month) => {
            app.current_month = month;
            app.set_status(format!("Switched to month: {month}"));
            app.refresh_all(backend)?;
        }
        Err(_) => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    let Some(owner) = app.owner else {
        app.set_status("Select a user first with :owner <id>");
        return Ok(());
    };

    let parts: Vec<&str> = args.splitn(3, ' ').collect();
    if parts.len() < 3 {
        app.set_status("Usage: :add <category> <sum> <description>");
        return Ok(());
    }

    let amount = match parse_amount(parts[1]) {
        Ok(a) => a,
        Err(e) => {
            app.set_status(e.to_string());
            return Ok(());
        }
    };

    match backend
        .service()
        .add_record(parts[2], parts[0], owner, amount, None, Utc::now())
    {
        Ok(record) => {
            app.set_status(format!(
                "Added #{}: {} {} to {}",
                record.id, record.description, record.amount, record.category
            ));
            app.refresh_all(backend)?;
        }
        Err(e) => app.set_status(format!("Not added: {e}")),
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _backend: &Backend) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let suffix = match app.owner {
            Some(id) => format!("{}-user{id}", app.current_month),
            None => app.current_month.to_string(),
        };
        export::default_export_path(&suffix)
    } else {
        shellexpand(args)
    };

    match export::export_to_csv(std::path::Path::new(&path), &app.records) {
        Ok(0) => app.set_status(format!("No records to export (header written to {path})")),
        Ok(count) => app.set_status(format!("Exported {count} records to {path}")),
        Err(e) => app.set_status(format!("Export failed: {e:#}")),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    advance_month(app, backend, 1)
}

fn cmd_prev_month(_args: &str, app: &mut App, backend: &Backend) -> anyhow::Result<()> {
    advance_month(app, backend, -1)
}

fn advance_month(app: &mut App, backend: &Backend, delta: i32) -> anyhow::Result<()> {
    app.current_month = if delta > 0 {
        app.current_month.next()
    } else {
        app.current_month.prev()
    };
    app.set_status(format!("Month: {}", app.current_month));
    app.refresh_all(backend)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
