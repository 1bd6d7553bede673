mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::StorageError;
use crate::models::*;
use crate::store::{RecordStore, ReportStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const RECORD_COLUMNS: &str =
    "id, description, category, owner_id, amount, occurred_at, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Records ───────────────────────────────────────────────

    pub(crate) fn get_record_count(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?)
    }

    /// Records that occurred inside `period`, optionally for one owner only.
    pub(crate) fn get_records_in_month(
        &self,
        period: YearMonth,
        owner_id: Option<i64>,
    ) -> Result<Vec<ExpenditureRecord>, StorageError> {
        let mut sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE occurred_at >= ?1 AND occurred_at < ?2"
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(encode_instant(period.start())),
            Box::new(encode_instant(period.next_start())),
        ];
        if let Some(owner) = owner_id {
            sql.push_str(&format!(" AND owner_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(owner));
        }
        sql.push_str(" ORDER BY occurred_at, id");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        self.query_records(&sql, params_ref.as_slice())
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<ExpenditureRecord>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(RawRecord {
                id: row.get(0)?,
                description: row.get(1)?,
                category: row.get(2)?,
                owner_id: row.get(3)?,
                amount: row.get(4)?,
                occurred_at: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        let mut records = Vec::new();
        for raw in rows {
            records.push(raw?.decode()?);
        }
        Ok(records)
    }

    // ── Reports ───────────────────────────────────────────────

    pub(crate) fn get_report_count(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?)
    }
}

impl RecordStore for Database {
    fn find(
        &self,
        owner_id: i64,
        period: YearMonth,
    ) -> Result<Vec<ExpenditureRecord>, StorageError> {
        self.get_records_in_month(period, Some(owner_id))
    }

    fn insert(&self, record: &NewRecord) -> Result<ExpenditureRecord, StorageError> {
        self.conn.execute(
            "INSERT INTO records (description, category, owner_id, amount, occurred_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.description,
                record.category,
                record.owner_id,
                record.amount.to_string(),
                encode_instant(record.occurred_at),
                encode_instant(record.created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, owner_id = record.owner_id, "record stored");
        self.query_records(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
            &[&id],
        )?
        .pop()
        .ok_or(StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    fn all(&self) -> Result<Vec<ExpenditureRecord>, StorageError> {
        self.query_records(
            &format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY id"),
            &[],
        )
    }

    fn for_owner(&self, owner_id: i64) -> Result<Vec<ExpenditureRecord>, StorageError> {
        self.query_records(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE owner_id = ?1 ORDER BY id"),
            &[&owner_id],
        )
    }
}

impl ReportStore for Database {
    fn find_by_key(&self, key: ReportKey) -> Result<Option<MonthlyReport>, StorageError> {
        let result = self.conn.query_row(
            "SELECT payload FROM reports WHERE owner_id = ?1 AND year = ?2 AND month = ?3",
            params![key.owner_id, key.year, key.month],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_if_absent(&self, report: &MonthlyReport) -> Result<MonthlyReport, StorageError> {
        let key = report.key();
        let payload = serde_json::to_string(report)?;
        let inserted = self.conn.execute(
            "INSERT INTO reports (owner_id, year, month, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(owner_id, year, month) DO NOTHING",
            params![
                key.owner_id,
                key.year,
                key.month,
                payload,
                encode_instant(Utc::now()),
            ],
        )?;
        if inserted == 0 {
            tracing::debug!(%key, "report already materialized, keeping stored copy");
        }
        self.find_by_key(key)?
            .ok_or(StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}

struct RawRecord {
    id: i64,
    description: String,
    category: String,
    owner_id: i64,
    amount: String,
    occurred_at: String,
    created_at: String,
}

impl RawRecord {
    fn decode(self) -> Result<ExpenditureRecord, StorageError> {
        let amount = Decimal::from_str(&self.amount).map_err(|_| StorageError::Corrupt {
            column: "records.amount",
            value: self.amount.clone(),
        })?;
        Ok(ExpenditureRecord {
            id: self.id,
            description: self.description,
            category: self.category,
            owner_id: self.owner_id,
            amount,
            occurred_at: decode_instant("records.occurred_at", &self.occurred_at)?,
            created_at: decode_instant("records.created_at", &self.created_at)?,
        })
    }
}

/// Fixed-width UTC timestamps so text comparison in SQL matches time order.
fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_instant(column: &'static str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StorageError::Corrupt {
            column,
            value: raw.to_string(),
        })
}
