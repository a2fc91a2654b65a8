use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::period::YearMonth;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainBudget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    /// `YYYY-MM`
    pub month: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainBudget {
    pub fn period(&self) -> anyhow::Result<YearMonth> {
        self.month.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainGoal {
    /// Percentage of the target reached, capped at 100
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount * 100.0).min(100.0)
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: f64, target: f64) -> DomainGoal {
        let now = Utc::now();
        DomainGoal {
            id: "g1".to_string(),
            user_id: "u1".to_string(),
            title: "Viagem".to_string(),
            target_amount: target,
            current_amount: current,
            deadline: None,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(goal(50.0, 200.0).progress(), 25.0);
        assert_eq!(goal(300.0, 200.0).progress(), 100.0);
    }

    #[test]
    fn test_is_reached() {
        assert!(!goal(199.99, 200.0).is_reached());
        assert!(goal(200.0, 200.0).is_reached());
    }
}
