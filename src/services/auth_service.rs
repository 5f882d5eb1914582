use crate::entities::{AccountType, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, CreateUserRequest, LoginRequest, UserResponse};
use crate::utils::{
    JwtService, hash_password, validate_email, validate_password, validate_username,
    verify_password,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};
use std::sync::Arc;

// Accounts start enabled; moderation can flip this off out of band.
const STATUS_ENABLED: i16 = 1;
const STATUS_DISABLED: i16 = 0;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: impl Into<Arc<DatabaseConnection>>, jwt_service: JwtService) -> Self {
        Self {
            pool: pool.into(),
            jwt_service,
        }
    }

    pub async fn register(&self, request: CreateUserRequest) -> AppResult<AuthResponse> {
        validate_email(&request.email)?;
        validate_username(&request.username)?;
        validate_password(&request.password)?;

        let account_type = request.account_type.unwrap_or(AccountType::Visitor);
        if !matches!(account_type, AccountType::Visitor | AccountType::Agency) {
            return Err(AppError::ValidationError(
                "Only visitor and agency accounts can self-register".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(request.email.clone()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = users::ActiveModel {
            id: NotSet,
            email: Set(request.email.trim().to_lowercase()),
            username: Set(request.username.trim().to_string()),
            password_hash: Set(password_hash),
            account_type: Set(account_type),
            status: Set(STATUS_ENABLED),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("New {} account registered: {}", user.account_type, user.id);
        self.build_auth_response(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(request.email.trim().to_lowercase()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid email or password".to_string(),
            ));
        }
        if user.status == STATUS_DISABLED {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        self.build_auth_response(user)
    }

    pub async fn refresh_token(&self, token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if user.status == STATUS_DISABLED {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }

        self.build_auth_response(user)
    }

    pub async fn get_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    fn build_auth_response(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.email)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: UserResponse::from(user),
        })
    }
}
