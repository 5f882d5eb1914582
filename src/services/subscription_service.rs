use crate::entities::{
    subscription_assignment_entity as assignments, subscription_plan_entity as plans,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{SubscribeResponse, SubscriptionResponse};
use crate::services::QuotaService;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SubscriptionService {
    pool: Arc<DatabaseConnection>,
    quota_service: QuotaService,
}

impl SubscriptionService {
    pub fn new(pool: impl Into<Arc<DatabaseConnection>>, quota_service: QuotaService) -> Self {
        Self {
            pool: pool.into(),
            quota_service,
        }
    }

    /// Assign `plan_id` to the account. Prior active assignments are
    /// deactivated first so at most one assignment is active per account,
    /// and usage above the new plan's limits is reconciled in the same
    /// transaction.
    pub async fn subscribe(
        &self,
        user: &users::Model,
        plan_id: i64,
    ) -> AppResult<SubscribeResponse> {
        let plan = plans::Entity::find_by_id(plan_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
        if !plan.is_active {
            return Err(AppError::ValidationError(
                "Plan is no longer available".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        // Deactivate whatever was active before.
        let previous = assignments::Entity::find()
            .filter(assignments::Column::UserId.eq(user.id))
            .filter(assignments::Column::Status.eq(true))
            .all(&txn)
            .await?;
        for old in previous {
            let mut am = old.into_active_model();
            am.status = Set(false);
            am.update(&txn).await?;
        }

        let now = Utc::now();
        let assignment = assignments::ActiveModel {
            id: NotSet,
            user_id: Set(user.id),
            plan_id: Set(plan.id),
            start_date: Set(now),
            end_date: Set(now + Duration::days(plan.duration_days as i64)),
            status: Set(true),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let downgrade = self
            .quota_service
            .enforce_quota_downgrade_on(&txn, user, &plan)
            .await?;

        txn.commit().await?;

        log::info!(
            "User {} subscribed to plan '{}' until {}",
            user.id,
            plan.label,
            assignment.end_date
        );

        Ok(SubscribeResponse {
            subscription: Self::to_response(&assignment, &plan),
            downgrade,
        })
    }

    pub async fn current_subscription(
        &self,
        user: &users::Model,
    ) -> AppResult<Option<SubscriptionResponse>> {
        let current = self.quota_service.get_active_subscription(user.id).await?;
        Ok(current.map(|(assignment, plan)| Self::to_response(&assignment, &plan)))
    }

    fn to_response(
        assignment: &assignments::Model,
        plan: &plans::Model,
    ) -> SubscriptionResponse {
        SubscriptionResponse {
            id: assignment.id,
            plan_id: plan.id,
            plan_label: plan.label.clone(),
            start_date: assignment.start_date,
            end_date: assignment.end_date,
            status: assignment.status,
        }
    }
}
