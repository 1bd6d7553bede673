mod aggregate;
mod merge;

use aggregate::aggregate_month;
use merge::merge_categories;
pub(crate) use merge::MANDATORY_CATEGORIES;

use chrono::{DateTime, Utc};

use crate::directory::{ensure_exists, UserDirectory};
use crate::error::{CostResult, StorageError};
use crate::models::{check_owner, MonthlyReport, ReportKey, YearMonth};
use crate::store::{RecordStore, ReportStore};

/// How a report was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportSource {
    /// Built from records; the month is still open so nothing was stored.
    Live,
    /// Read back from the report store.
    Cached,
    /// Built from records and stored for later reads.
    Materialized,
}

/// Serves monthly reports, materializing them once their month has closed.
///
/// Open months (current or future) are always rebuilt from the record store
/// and never touch the report store. Closed months are read from the report
/// store; on a miss the report is built, stored with an insert-if-absent, and
/// the stored copy is returned. Stored reports are never refreshed, so later
/// changes to a closed month's records do not show up in its report.
pub(crate) struct ReportCache<'a, R: ?Sized, P: ?Sized, D: ?Sized> {
    records: &'a R,
    reports: &'a P,
    directory: &'a D,
}

impl<'a, R, P, D> ReportCache<'a, R, P, D>
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

    /// Validate the request, confirm the owner exists, then serve the report.
    pub(crate) fn get_report(
        &self,
        owner_id: i64,
        year: i64,
        month: i64,
        now: DateTime<Utc>,
    ) -> CostResult<MonthlyReport> {
        check_owner(owner_id)?;
        let period = YearMonth::new(year, month)?;
        ensure_exists(self.directory, owner_id)?;
        let (report, _) = self.serve(owner_id, period, now)?;
        Ok(report)
    }

    /// The caching decision alone; the owner is assumed to be valid.
    pub(crate) fn serve(
        &self,
        owner_id: i64,
        period: YearMonth,
        now: DateTime<Utc>,
    ) -> Result<(MonthlyReport, ReportSource), StorageError> {
        let key = ReportKey::new(owner_id, period);

        if !period.has_elapsed(now) {
            tracing::debug!(%key, "month still open, building live report");
            return Ok((self.build(owner_id, period)?, ReportSource::Live));
        }

        if let Some(stored) = self.reports.find_by_key(key)? {
            tracing::debug!(%key, "serving stored report");
            return Ok((stored, ReportSource::Cached));
        }

        let built = self.build(owner_id, period)?;
        let stored = self.reports.insert_if_absent(&built)?;
        tracing::debug!(
            %key,
            categories = ?stored.category_names(),
            entries = stored.entry_count(),
            "report materialized"
        );
        Ok((stored, ReportSource::Materialized))
    }

    fn build(&self, owner_id: i64, period: YearMonth) -> Result<MonthlyReport, StorageError> {
        let aggregated = aggregate_month(self.records, owner_id, period)?;
        Ok(MonthlyReport {
            owner_id,
            year: period.year(),
            month: period.month(),
            categories: merge_categories(aggregated),
        })
    }
}
