use crate::entities::{AccountType, subscription_plan_entity as plans, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{CreatePlanRequest, PlanResponse, UpdatePlanRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct PlanService {
    pool: Arc<DatabaseConnection>,
}

impl PlanService {
    pub fn new(pool: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { pool: pool.into() }
    }

    fn is_plan_admin(user: &users::Model) -> bool {
        matches!(
            user.account_type,
            AccountType::Admin | AccountType::Manager
        )
    }

    /// Plans open for subscription, cheapest entitlements first.
    pub async fn list_active_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let models = plans::Entity::find()
            .filter(plans::Column::IsActive.eq(true))
            .order_by_asc(plans::Column::MaxAds)
            .all(self.pool.as_ref())
            .await?;
        Ok(models.into_iter().map(PlanResponse::from).collect())
    }

    pub async fn list_all_plans(&self, acting: &users::Model) -> AppResult<Vec<PlanResponse>> {
        if !Self::is_plan_admin(acting) {
            return Err(AppError::PermissionDenied);
        }
        let models = plans::Entity::find()
            .order_by_asc(plans::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(models.into_iter().map(PlanResponse::from).collect())
    }

    pub async fn create_plan(
        &self,
        acting: &users::Model,
        request: CreatePlanRequest,
    ) -> AppResult<PlanResponse> {
        if !Self::is_plan_admin(acting) {
            return Err(AppError::PermissionDenied);
        }
        if request.label.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Plan label must not be empty".to_string(),
            ));
        }
        if request.max_ads < 0 || request.max_spaces < 0 || request.duration_days <= 0 {
            return Err(AppError::ValidationError(
                "Plan limits must not be negative and duration must be positive".to_string(),
            ));
        }

        let plan = plans::ActiveModel {
            id: NotSet,
            label: Set(request.label.trim().to_string()),
            max_ads: Set(request.max_ads),
            max_spaces: Set(request.max_spaces),
            duration_days: Set(request.duration_days),
            is_active: Set(true),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(PlanResponse::from(plan))
    }

    pub async fn update_plan(
        &self,
        acting: &users::Model,
        plan_id: i64,
        request: UpdatePlanRequest,
    ) -> AppResult<PlanResponse> {
        if !Self::is_plan_admin(acting) {
            return Err(AppError::PermissionDenied);
        }

        let mut model = plans::Entity::find_by_id(plan_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?
            .into_active_model();

        if let Some(label) = &request.label {
            if label.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Plan label must not be empty".to_string(),
                ));
            }
            model.label = Set(label.trim().to_string());
        }
        if let Some(max_ads) = request.max_ads {
            if max_ads < 0 {
                return Err(AppError::ValidationError(
                    "max_ads must not be negative".to_string(),
                ));
            }
            model.max_ads = Set(max_ads);
        }
        if let Some(max_spaces) = request.max_spaces {
            if max_spaces < 0 {
                return Err(AppError::ValidationError(
                    "max_spaces must not be negative".to_string(),
                ));
            }
            model.max_spaces = Set(max_spaces);
        }
        if let Some(duration_days) = request.duration_days {
            if duration_days <= 0 {
                return Err(AppError::ValidationError(
                    "duration_days must be positive".to_string(),
                ));
            }
            model.duration_days = Set(duration_days);
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }

        let updated = model.update(self.pool.as_ref()).await?;
        Ok(PlanResponse::from(updated))
    }
}
