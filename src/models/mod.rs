mod period;
mod record;
mod report;

pub use period::{parse_number, YearMonth};
pub use record::{check_owner, ExpenditureRecord, NewRecord, OwnerTotal};
pub use report::{CategoryEntry, CategoryMap, MonthlyReport, ReportKey};
