use crate::error::StorageError;
use crate::models::{ExpenditureRecord, MonthlyReport, NewRecord, ReportKey, YearMonth};

/// Where expenditure records live.
pub(crate) trait RecordStore {
    /// Records of `owner_id` that occurred inside `period`, ordered by
    /// occurrence then insertion.
    fn find(
        &self,
        owner_id: i64,
        period: YearMonth,
    ) -> Result<Vec<ExpenditureRecord>, StorageError>;

    fn insert(&self, record: &NewRecord) -> Result<ExpenditureRecord, StorageError>;

    fn all(&self) -> Result<Vec<ExpenditureRecord>, StorageError>;

    fn for_owner(&self, owner_id: i64) -> Result<Vec<ExpenditureRecord>, StorageError>;
}

/// Where materialized reports for closed months live.
pub(crate) trait ReportStore {
    fn find_by_key(&self, key: ReportKey) -> Result<Option<MonthlyReport>, StorageError>;

    /// Store `report` unless its key is already taken, and return whatever is
    /// stored under the key afterwards. Must be atomic with respect to other
    /// writers of the same key.
    fn insert_if_absent(&self, report: &MonthlyReport) -> Result<MonthlyReport, StorageError>;
}
