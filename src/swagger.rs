use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AccountType, AdStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::plan::list_plans,
        handlers::subscription::subscribe,
        handlers::subscription::current_subscription,
        handlers::subscription::quota_info,
        handlers::ad::create_ad,
        handlers::ad::list_ads,
        handlers::ad::trash_ad,
        handlers::ad::reactivate_ad,
        handlers::space::create_space,
        handlers::space::list_spaces,
        handlers::space::deactivate_space,
        handlers::space::reactivate_space,
        handlers::admin::list_all_plans,
        handlers::admin::create_plan,
        handlers::admin::update_plan,
    ),
    components(
        schemas(
            AccountType,
            AdStatus,
            UserResponse,
            CreateUserRequest,
            LoginRequest,
            AuthResponse,
            PlanResponse,
            CreatePlanRequest,
            UpdatePlanRequest,
            SubscribeRequest,
            SubscribeResponse,
            SubscriptionResponse,
            QuotaSummary,
            DowngradeOutcome,
            AdResponse,
            CreateAdRequest,
            ReactivateAdResponse,
            SpaceResponse,
            CreateSpaceRequest,
            ReactivateSpaceResponse,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "plan", description = "Subscription plans"),
        (name = "subscription", description = "Subscriptions and quota"),
        (name = "ad", description = "Classified ads"),
        (name = "space", description = "Agency spaces"),
        (name = "admin", description = "Plan administration")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
