use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::YearMonth;

/// One line of a report: a record projected down to what the report shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    #[serde(rename = "sum")]
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "day")]
    pub day_of_month: u32,
}

/// Category name to its entries, as produced by aggregation.
pub type CategoryMap = BTreeMap<String, Vec<CategoryEntry>>;

/// Identity of a materialized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub owner_id: i64,
    pub year: i32,
    pub month: u32,
}

impl ReportKey {
    pub fn new(owner_id: i64, period: YearMonth) -> Self {
        Self {
            owner_id,
            year: period.year(),
            month: period.month(),
        }
    }
}

impl std::fmt::Display for ReportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user {} {:04}-{:02}", self.owner_id, self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    #[serde(rename = "userid")]
    pub owner_id: i64,
    pub year: i32,
    pub month: u32,
    #[serde(rename = "costs", with = "category_list")]
    pub categories: Vec<(String, Vec<CategoryEntry>)>,
}

impl MonthlyReport {
    pub fn key(&self) -> ReportKey {
        ReportKey {
            owner_id: self.owner_id,
            year: self.year,
            month: self.month,
        }
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn entries(&self, category: &str) -> Option<&[CategoryEntry]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn category_total(&self, category: &str) -> Decimal {
        self.entries(category)
            .map(|entries| entries.iter().map(|e| e.amount).sum())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.categories
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .map(|e| e.amount)
            .sum()
    }

    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// Categories go over the wire as `[{"food": [...]}, {"health": [...]}]` so the
/// order survives JSON objects being unordered.
mod category_list {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::CategoryEntry;

    struct Single<'a>(&'a str, &'a [CategoryEntry]);

    impl Serialize for Single<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(self.0, self.1)?;
            map.end()
        }
    }

    pub(super) fn serialize<S: Serializer>(
        categories: &[(String, Vec<CategoryEntry>)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            categories
                .iter()
                .map(|(name, entries)| Single(name, entries)),
        )
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Vec<CategoryEntry>)>, D::Error> {
        let raw: Vec<BTreeMap<String, Vec<CategoryEntry>>> = Vec::deserialize(deserializer)?;
        let mut categories = Vec::with_capacity(raw.len());
        for group in raw {
            if group.len() != 1 {
                return Err(D::Error::custom(format!(
                    "expected exactly one category per element, found {}",
                    group.len()
                )));
            }
            categories.extend(group);
        }
        Ok(categories)
    }
}
