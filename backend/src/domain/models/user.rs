use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Feature, PlanTier};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan_tier: PlanTier,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainUser {
    /// Tier in force at `now`: an expired trial falls back to bronze
    pub fn effective_tier(&self, now: DateTime<Utc>) -> PlanTier {
        match (self.plan_tier, self.trial_ends_at) {
            (PlanTier::Trial, Some(ends_at)) if ends_at <= now => PlanTier::Bronze,
            (tier, _) => tier,
        }
    }

    pub fn can_use(&self, feature: Feature, now: DateTime<Utc>) -> bool {
        self.effective_tier(now).allows(feature)
    }

    /// Whole days left in an active trial, rounded up
    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        match (self.plan_tier, self.trial_ends_at) {
            (PlanTier::Trial, Some(ends_at)) if ends_at > now => {
                let seconds = (ends_at - now).num_seconds();
                Some((seconds + 86_399) / 86_400)
            }
            (PlanTier::Trial, Some(_)) => Some(0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(tier: PlanTier, trial_ends_at: Option<DateTime<Utc>>) -> DomainUser {
        let now = Utc::now();
        DomainUser {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            plan_tier: tier,
            trial_ends_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_trial_unlocks_everything() {
        let now = Utc::now();
        let u = user(PlanTier::Trial, Some(now + Duration::days(2)));
        assert_eq!(u.effective_tier(now), PlanTier::Trial);
        assert!(u.can_use(Feature::Calendar, now));
        assert_eq!(u.trial_days_remaining(now), Some(2));
    }

    #[test]
    fn test_expired_trial_is_bronze() {
        let now = Utc::now();
        let u = user(PlanTier::Trial, Some(now - Duration::hours(1)));
        assert_eq!(u.effective_tier(now), PlanTier::Bronze);
        assert!(!u.can_use(Feature::IncomeTracking, now));
        assert_eq!(u.trial_days_remaining(now), Some(0));
    }

    #[test]
    fn test_paid_tiers_ignore_trial_date() {
        let now = Utc::now();
        let u = user(PlanTier::Ouro, Some(now - Duration::days(30)));
        assert_eq!(u.effective_tier(now), PlanTier::Ouro);
        assert_eq!(u.trial_days_remaining(now), None);
    }
}
