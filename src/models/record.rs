use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A persisted expenditure. `id` is assigned by the store in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenditureRecord {
    pub id: i64,
    pub description: String,
    pub category: String,
    #[serde(rename = "userid")]
    pub owner_id: i64,
    #[serde(rename = "sum")]
    pub amount: Decimal,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A validated record that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub description: String,
    pub category: String,
    pub owner_id: i64,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewRecord {
    /// Validate raw fields. A missing `occurred_at` defaults to `now`.
    /// Timestamps are truncated to microseconds, the precision records are
    /// stored with.
    pub fn new(
        description: &str,
        category: &str,
        owner_id: i64,
        amount: Decimal,
        occurred_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        check_owner(owner_id)?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        Ok(Self {
            description: description.to_string(),
            category: category.to_string(),
            owner_id,
            amount,
            occurred_at: occurred_at.unwrap_or(now).trunc_subsecs(6),
            created_at: now.trunc_subsecs(6),
        })
    }

    #[cfg(test)]
    pub fn into_record(self, id: i64) -> ExpenditureRecord {
        ExpenditureRecord {
            id,
            description: self.description,
            category: self.category,
            owner_id: self.owner_id,
            amount: self.amount,
            occurred_at: self.occurred_at,
            created_at: self.created_at,
        }
    }
}

/// Sum of all amounts recorded for one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerTotal {
    #[serde(rename = "userid")]
    pub owner_id: i64,
    pub total: Decimal,
}

pub fn check_owner(owner_id: i64) -> Result<(), ValidationError> {
    if owner_id <= 0 {
        return Err(ValidationError::NonPositiveOwner(owner_id));
    }
    Ok(())
}
