use crate::entities::{AccountType, space_entity as spaces, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateSpaceRequest, PaginatedResponse, PaginationParams, ReactivateSpaceResponse,
    SpaceResponse,
};
use crate::services::QuotaService;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SpaceService {
    pool: Arc<DatabaseConnection>,
    quota_service: QuotaService,
}

impl SpaceService {
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

    pub async fn create_space(
        &self,
        user_id: i64,
        request: CreateSpaceRequest,
    ) -> AppResult<SpaceResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Space name must not be empty".to_string(),
            ));
        }

        let user = self.fetch_user(user_id).await?;
        if user.account_type != AccountType::Agency {
            return Err(AppError::ValidationError(
                "Only agency accounts can create spaces".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        self.quota_service.lock_account_on(&txn, user.id).await?;
        if !self.quota_service.can_create_space_on(&txn, &user).await? {
            return Err(AppError::ValidationError(
                "No active subscription or space quota exhausted".to_string(),
            ));
        }

        let space = spaces::ActiveModel {
            id: NotSet,
            user_id: Set(user.id),
            name: Set(request.name.trim().to_string()),
            status: Set(true),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(SpaceResponse::from(space))
    }

    pub async fn list_my_spaces(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<SpaceResponse>> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = spaces::Entity::find()
            .filter(spaces::Column::UserId.eq(user_id))
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let models = spaces::Entity::find()
            .filter(spaces::Column::UserId.eq(user_id))
            .order_by_desc(spaces::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?;
        let items: Vec<SpaceResponse> = models.into_iter().map(SpaceResponse::from).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn deactivate_space(&self, user_id: i64, space_id: i64) -> AppResult<SpaceResponse> {
        let space = spaces::Entity::find_by_id(space_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Space not found".to_string()))?;
        if space.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if !space.status {
            return Ok(SpaceResponse::from(space));
        }

        let mut am = space.into_active_model();
        am.status = Set(false);
        let updated = am.update(self.pool.as_ref()).await?;
        Ok(SpaceResponse::from(updated))
    }

    pub async fn reactivate_space(
        &self,
        user_id: i64,
        space_id: i64,
    ) -> AppResult<ReactivateSpaceResponse> {
        let space = spaces::Entity::find_by_id(space_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Space not found".to_string()))?;
        if space.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let user = self.fetch_user(user_id).await?;
        let reactivated = self.quota_service.reactivate_space(&user, &space).await?;

        let space = if reactivated {
            spaces::Entity::find_by_id(space_id)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Space not found".to_string()))?
        } else {
            space
        };

        Ok(ReactivateSpaceResponse {
            reactivated,
            space: SpaceResponse::from(space),
        })
    }
}
