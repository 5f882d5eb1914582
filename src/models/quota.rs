use crate::entities::{
    subscription_assignment_entity as assignments, subscription_plan_entity as plans,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read-only snapshot of an account's entitlements, for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuotaSummary {
    pub has_active_subscription: bool,
    pub subscription_id: Option<i64>,
    pub subscription_label: Option<String>,
    pub subscription_start: Option<DateTime<Utc>>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub max_ads: i64,
    pub max_spaces: i64,
    pub active_ads: i64,
    pub active_spaces: i64,
    pub remaining_ads: i64,
    pub remaining_spaces: i64,
}

impl QuotaSummary {
    /// Summary for an account with no active subscription: all counts zero.
    pub fn without_subscription() -> Self {
        Self {
            has_active_subscription: false,
            subscription_id: None,
            subscription_label: None,
            subscription_start: None,
            subscription_end: None,
            max_ads: 0,
            max_spaces: 0,
            active_ads: 0,
            active_spaces: 0,
            remaining_ads: 0,
            remaining_spaces: 0,
        }
    }

    pub fn from_subscription(
        assignment: &assignments::Model,
        plan: &plans::Model,
        active_ads: i64,
        active_spaces: i64,
    ) -> Self {
        let max_ads = plan.max_ads as i64;
        let max_spaces = plan.max_spaces as i64;
        Self {
            has_active_subscription: true,
            subscription_id: Some(assignment.id),
            subscription_label: Some(plan.label.clone()),
            subscription_start: Some(assignment.start_date),
            subscription_end: Some(assignment.end_date),
            max_ads,
            max_spaces,
            active_ads,
            active_spaces,
            remaining_ads: (max_ads - active_ads).max(0),
            remaining_spaces: (max_spaces - active_spaces).max(0),
        }
    }
}

/// What a downgrade reconciliation actually did, so callers can log it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DowngradeOutcome {
    pub ads_trashed: u64,
    pub spaces_deactivated: u64,
    /// Ads trashed because their parent space was deactivated.
    pub cascade_ads_trashed: u64,
}

impl DowngradeOutcome {
    pub fn is_noop(&self) -> bool {
        self.ads_trashed == 0 && self.spaces_deactivated == 0 && self.cascade_ads_trashed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn plan(max_ads: i32, max_spaces: i32) -> plans::Model {
        plans::Model {
            id: 1,
            label: "Pro".to_string(),
            max_ads,
            max_spaces,
            duration_days: 30,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn assignment() -> assignments::Model {
        let now = Utc::now();
        assignments::Model {
            id: 9,
            user_id: 1,
            plan_id: 1,
            start_date: now,
            end_date: now + Duration::days(30),
            status: true,
            created_at: None,
        }
    }

    #[test]
    fn test_without_subscription_is_all_zero() {
        let s = QuotaSummary::without_subscription();
        assert!(!s.has_active_subscription);
        assert_eq!(s.max_ads, 0);
        assert_eq!(s.active_ads, 0);
        assert_eq!(s.remaining_ads, 0);
        assert_eq!(s.remaining_spaces, 0);
        assert!(s.subscription_id.is_none());
    }

    #[test]
    fn test_from_subscription_remaining() {
        let s = QuotaSummary::from_subscription(&assignment(), &plan(5, 2), 3, 1);
        assert!(s.has_active_subscription);
        assert_eq!(s.subscription_id, Some(9));
        assert_eq!(s.subscription_label.as_deref(), Some("Pro"));
        assert_eq!(s.remaining_ads, 2);
        assert_eq!(s.remaining_spaces, 1);
    }

    #[test]
    fn test_remaining_clamps_at_zero_when_over_quota() {
        let s = QuotaSummary::from_subscription(&assignment(), &plan(5, 1), 7, 3);
        assert_eq!(s.remaining_ads, 0);
        assert_eq!(s.remaining_spaces, 0);
    }
}
