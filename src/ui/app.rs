use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::util::ListCursor;
use crate::db::Database;
use crate::directory::UserDirectory;
use crate::models::*;
use crate::service::CostService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Records,
    Report,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Records, Self::Report]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Records => write!(f, "Records"),
            Self::Report => write!(f, "Report"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
        }
    }
}

/// Everything the TUI reads from and writes to.
pub(crate) struct Backend<'a> {
    pub(crate) db: &'a Database,
    pub(crate) users: &'a dyn UserDirectory,
}

impl<'a> Backend<'a> {
    pub(crate) fn service(&self) -> CostService<'a, Database, Database, dyn UserDirectory + 'a> {
        CostService::new(self.db, self.db, self.users)
    }
}

/// One row of the report screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ReportLine<'r> {
    Category {
        name: &'r str,
        total: Decimal,
        count: usize,
    },
    Entry(&'r CategoryEntry),
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) current_month: YearMonth,
    pub(crate) owner: Option<i64>,

    // Records
    pub(crate) records: Vec<ExpenditureRecord>,
    pub(crate) records_cursor: ListCursor,
    pub(crate) record_count: i64,

    // Report
    pub(crate) report: Option<MonthlyReport>,
    pub(crate) report_note: String,
    pub(crate) report_cursor: ListCursor,
    pub(crate) report_count: i64,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            running: true,
            screen: Screen::Records,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month: YearMonth::containing(now),
            owner: None,

            records: Vec::new(),
            records_cursor: ListCursor::default(),
            record_count: 0,

            report: None,
            report_note: String::new(),
            report_cursor: ListCursor::default(),
            report_count: 0,

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_records(&mut self, backend: &Backend) -> Result<()> {
        self.records = backend
            .db
            .get_records_in_month(self.current_month, self.owner)?;
        self.record_count = backend.db.get_record_count()?;
        self.report_count = backend.db.get_report_count()?;
        self.records_cursor.clamp(self.records.len());
        Ok(())
    }

    /// Rebuild the report for the selected owner and month. Request errors
    /// (unknown user, users service down) are shown in place of the report.
    pub(crate) fn refresh_report(&mut self, backend: &Backend) {
        self.report = None;
        match self.owner {
            None => {
                self.report_note = "No user selected. Use :owner <id>".into();
            }
            Some(owner) => {
                let result = backend.service().monthly_report(
                    owner,
                    i64::from(self.current_month.year()),
                    i64::from(self.current_month.month()),
                    Utc::now(),
                );
                match result {
                    Ok(report) => {
                        self.report = Some(report);
                        self.report_note.clear();
                        if let Ok(count) = backend.db.get_report_count() {
                            self.report_count = count;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(owner, month = %self.current_month, error = %e, "report failed");
                        self.report_note = e.to_string();
                    }
                }
            }
        }
        let len = self.report_lines().len();
        self.report_cursor.clamp(len);
    }

    pub(crate) fn refresh_all(&mut self, backend: &Backend) -> Result<()> {
        self.refresh_records(backend)?;
        if self.screen == Screen::Report {
            self.refresh_report(backend);
        }
        Ok(())
    }

    /// The report flattened into rows: each category heading followed by its
    /// entries.
    pub(crate) fn report_lines(&self) -> Vec<ReportLine<'_>> {
        let Some(report) = &self.report else {
            return Vec::new();
        };
        let mut lines = Vec::with_capacity(report.categories.len() + report.entry_count());
        for (name, entries) in &report.categories {
            lines.push(ReportLine::Category {
                name,
                total: entries.iter().map(|e| e.amount).sum(),
                count: entries.len(),
            });
            lines.extend(entries.iter().map(ReportLine::Entry));
        }
        lines
    }

    pub(crate) fn active_len(&self) -> usize {
        match self.screen {
            Screen::Records => self.records.len(),
            Screen::Report => self.report_lines().len(),
        }
    }

    pub(crate) fn active_cursor(&mut self) -> &mut ListCursor {
        match self.screen {
            Screen::Records => &mut self.records_cursor,
            Screen::Report => &mut self.report_cursor,
        }
    }

    pub(crate) fn owner_label(&self) -> String {
        self.owner
            .map_or_else(|| "all users".to_string(), |id| format!("user {id}"))
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
