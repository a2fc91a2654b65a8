//! Feature gating by plan tier

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::{Feature, FeatureAccess};

use crate::domain::errors::DomainError;
use crate::domain::models::DomainUser;

/// Fail with `FeatureLocked` unless the user's effective tier unlocks `feature`
pub fn require_feature(user: &DomainUser, feature: Feature, now: DateTime<Utc>) -> Result<()> {
    let tier = user.effective_tier(now);
    if tier.allows(feature) {
        Ok(())
    } else {
        Err(DomainError::FeatureLocked { feature, tier }.into())
    }
}

pub fn feature_access(user: &DomainUser, now: DateTime<Utc>) -> FeatureAccess {
    let effective_tier = user.effective_tier(now);
    FeatureAccess {
        plan_tier: user.plan_tier,
        effective_tier,
        trial_days_remaining: user.trial_days_remaining(now),
        income_tracking: effective_tier.allows(Feature::IncomeTracking),
        calendar: effective_tier.allows(Feature::Calendar),
        advanced_analytics: effective_tier.allows(Feature::AdvancedAnalytics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::PlanTier;

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
    fn test_bronze_is_locked_out() {
        let err = require_feature(&user(PlanTier::Bronze, None), Feature::Calendar, Utc::now()).unwrap_err();
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::FeatureLocked { feature, tier }) => {
                assert_eq!(*feature, Feature::Calendar);
                assert_eq!(*tier, PlanTier::Bronze);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_feature_access_of_expired_trial() {
        let now = Utc::now();
        let access = feature_access(&user(PlanTier::Trial, Some(now - Duration::days(1))), now);
        assert_eq!(access.plan_tier, PlanTier::Trial);
        assert_eq!(access.effective_tier, PlanTier::Bronze);
        assert!(!access.income_tracking && !access.calendar && !access.advanced_analytics);
    }

    #[test]
    fn test_ouro_has_everything() {
        let access = feature_access(&user(PlanTier::Ouro, None), Utc::now());
        assert!(access.income_tracking && access.calendar && access.advanced_analytics);
        assert!(access.trial_days_remaining.is_none());
    }
}
