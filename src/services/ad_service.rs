use crate::entities::{AdStatus, ad_entity as ads, space_entity as spaces, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdResponse, CreateAdRequest, PaginatedResponse, PaginationParams, ReactivateAdResponse,
};
use crate::services::QuotaService;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AdService {
    pool: Arc<DatabaseConnection>,
    quota_service: QuotaService,
}

impl AdService {
    pub fn new(pool: impl Into<Arc<DatabaseConnection>>, quota_service: QuotaService) -> Self {
        Self {
            pool: pool.into(),
            quota_service,
        }
    }

    async fn fetch_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Create an ad for the acting account. The admission check and the
    /// insert run in one transaction holding the account row lock, so
    /// concurrent creations for the same account serialize.
    pub async fn create_ad(&self, user_id: i64, request: CreateAdRequest) -> AppResult<AdResponse> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Ad title must not be empty".to_string(),
            ));
        }
        if request.price_cents < 0 {
            return Err(AppError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }

        let user = self.fetch_user(user_id).await?;

        if let Some(space_id) = request.space_id {
            let space = spaces::Entity::find_by_id(space_id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Space not found".to_string()))?;
            if space.user_id != user.id {
                return Err(AppError::Forbidden);
            }
            if !space.status {
                return Err(AppError::ValidationError(
                    "Space is not active".to_string(),
                ));
            }
        }

        let txn = self.pool.begin().await?;
        self.quota_service.lock_account_on(&txn, user.id).await?;
        if !self.quota_service.can_create_ad_on(&txn, &user).await? {
            return Err(AppError::ValidationError(
                "No active subscription or ad quota exhausted".to_string(),
            ));
        }

        let ad = ads::ActiveModel {
            id: NotSet,
            user_id: Set(user.id),
            space_id: Set(request.space_id),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description),
            price_cents: Set(request.price_cents),
            status: Set(AdStatus::Pending),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(AdResponse::from(ad))
    }

    pub async fn list_my_ads(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AdResponse>> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = ads::Entity::find()
            .filter(ads::Column::UserId.eq(user_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let models = ads::Entity::find()
            .filter(ads::Column::UserId.eq(user_id))
            .order_by_desc(ads::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?;
        let items: Vec<AdResponse> = models.into_iter().map(AdResponse::from).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn trash_ad(&self, user_id: i64, ad_id: i64) -> AppResult<AdResponse> {
        let ad = ads::Entity::find_by_id(ad_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;
        if ad.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if ad.status == AdStatus::Trash {
            return Ok(AdResponse::from(ad));
        }

        let mut am = ad.into_active_model();
        am.status = Set(AdStatus::Trash);
        let updated = am.update(self.pool.as_ref()).await?;
        Ok(AdResponse::from(updated))
    }

    /// Quota-checked reactivation. A `reactivated: false` response means a
    /// precondition failed (wrong state, no subscription, quota full), not
    /// an error.
    pub async fn reactivate_ad(
        &self,
        user_id: i64,
        ad_id: i64,
    ) -> AppResult<ReactivateAdResponse> {
        let ad = ads::Entity::find_by_id(ad_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?;
        if ad.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let reactivated = self.quota_service.reactivate_ad(&ad).await?;

        let ad = if reactivated {
            ads::Entity::find_by_id(ad_id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Ad not found".to_string()))?
        } else {
            ad
        };

        Ok(ReactivateAdResponse {
            reactivated,
            ad: AdResponse::from(ad),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AccountType, subscription_assignment_entity as assignments,
        subscription_plan_entity as plans,
    };
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn user(id: i64) -> users::Model {
        users::Model {
            id,
            email: format!("user{id}@example.com"),
            username: format!("user{id}"),
            password_hash: "x".to_string(),
            account_type: AccountType::Visitor,
            status: 1,
            created_at: None,
            updated_at: None,
        }
    }

    fn plan(max_ads: i32) -> plans::Model {
        plans::Model {
            id: 1,
            label: "Basic".to_string(),
            max_ads,
            max_spaces: 0,
            duration_days: 30,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn assignment(user_id: i64) -> assignments::Model {
        let now = Utc::now();
        assignments::Model {
            id: 100,
            user_id,
            plan_id: 1,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(29),
            status: true,
            created_at: None,
        }
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("count", sea_orm::Value::from(count))])
    }

    #[tokio::test]
    async fn test_create_ad_rejected_at_quota_limit() {
        // Owner lookup, then inside the transaction: account lock,
        // subscription, plan, active-ad count already at the maximum.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1)]])
            .append_query_results([vec![user(1)]])
            .append_query_results([vec![assignment(1)]])
            .append_query_results([vec![plan(5)]])
            .append_query_results([vec![count_row(5)]])
            .into_connection();
        let db = Arc::new(db);
        let svc = AdService::new(db.clone(), QuotaService::new(db));
        let request = CreateAdRequest {
            title: "Bike".to_string(),
            description: None,
            price_cents: 15000,
            space_id: None,
        };
        let result = svc.create_ad(1, request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
