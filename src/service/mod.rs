mod request;

pub(crate) use request::{parse_amount, parse_date, ReportRequest};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::directory::{ensure_exists, UserDirectory};
use crate::error::{CostResult, ValidationError};
use crate::models::*;
use crate::report::ReportCache;
use crate::store::{RecordStore, ReportStore};

/// The operations the CLI and TUI expose, independent of either.
pub(crate) struct CostService<'a, R: ?Sized, P: ?Sized, D: ?Sized> {
    records: &'a R,
    reports: &'a P,
    directory: &'a D,
}

impl<'a, R, P, D> CostService<'a, R, P, D>
where
    R: RecordStore + ?Sized,
    P: ReportStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    pub(crate) fn new(records: &'a R, reports: &'a P, directory: &'a D) -> Self {
        Self {
            records,
            reports,
            directory,
        }
    }

    /// Validate and store a new record.
    ///
    /// Records dated in a month that has already closed are refused with
    /// `MonthPassed` before the users service is consulted.
    pub(crate) fn add_record(
        &self,
        description: &str,
        category: &str,
        owner_id: i64,
        amount: Decimal,
        occurred_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> CostResult<ExpenditureRecord> {
        let record = NewRecord::new(description, category, owner_id, amount, occurred_at, now)?;

        let period = YearMonth::containing(record.occurred_at);
        if period.has_elapsed(now) {
            return Err(ValidationError::MonthPassed(period).into());
        }

        ensure_exists(self.directory, owner_id)?;

        let stored = self.records.insert(&record)?;
        tracing::info!(
            id = stored.id,
            owner_id,
            category = %stored.category,
            "record added"
        );
        Ok(stored)
    }

    pub(crate) fn list_all_records(&self) -> CostResult<Vec<ExpenditureRecord>> {
        Ok(self.records.all()?)
    }

    pub(crate) fn records_for_owner(&self, owner_id: i64) -> CostResult<Vec<ExpenditureRecord>> {
        check_owner(owner_id)?;
        Ok(self.records.for_owner(owner_id)?)
    }

    /// Sum of every amount the owner has recorded. Unknown owners total zero.
    pub(crate) fn total_for_owner(&self, owner_id: i64) -> CostResult<OwnerTotal> {
        check_owner(owner_id)?;
        let total = self
            .records
            .for_owner(owner_id)?
            .iter()
            .map(|r| r.amount)
            .sum();
        Ok(OwnerTotal { owner_id, total })
    }

    pub(crate) fn monthly_report(
        &self,
        owner_id: i64,
        year: i64,
        month: i64,
        now: DateTime<Utc>,
    ) -> CostResult<MonthlyReport> {
        ReportCache::new(self.records, self.reports, self.directory)
            .get_report(owner_id, year, month, now)
    }

    pub(crate) fn report_for(
        &self,
        request: ReportRequest,
        now: DateTime<Utc>,
    ) -> CostResult<MonthlyReport> {
        self.monthly_report(request.owner_id, request.year, request.month, now)
    }
}

#[cfg(test)]
mod tests;
