use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainExpense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainIncome {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub source: String,
    pub description: String,
    pub date: NaiveDate,
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter applied by the storage layer when listing expenses or incomes.
/// For incomes `category` matches the income source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
}

impl RecordFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            category: None,
        }
    }

    pub fn matches(&self, date: NaiveDate, category: &str) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        match &self.category {
            Some(wanted) => wanted.to_lowercase() == category.to_lowercase(),
            None => true,
        }
    }
}
