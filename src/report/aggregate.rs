use chrono::Datelike;

use crate::error::StorageError;
use crate::models::{CategoryEntry, CategoryMap, ExpenditureRecord, YearMonth};
use crate::store::RecordStore;

/// Load an owner's records for `period` and group them by category.
pub(crate) fn aggregate_month<R: RecordStore + ?Sized>(
    records: &R,
    owner_id: i64,
    period: YearMonth,
) -> Result<CategoryMap, StorageError> {
    let found = records.find(owner_id, period)?;
    let in_range = found
        .into_iter()
        .filter(|r| r.owner_id == owner_id && YearMonth::containing(r.occurred_at) == period)
        .collect();
    Ok(group_by_category(in_range))
}

/// Group records by category. Entries within a category are ordered by
/// occurrence, ties broken by insertion order. Categories without records do
/// not appear in the result.
pub(crate) fn group_by_category(mut records: Vec<ExpenditureRecord>) -> CategoryMap {
    records.sort_by_key(|r| (r.occurred_at, r.id));

    let mut grouped = CategoryMap::new();
    for record in records {
        let entry = CategoryEntry {
            amount: record.amount,
            day_of_month: record.occurred_at.day(),
            description: record.description,
        };
        grouped.entry(record.category).or_default().push(entry);
    }
    grouped
}
