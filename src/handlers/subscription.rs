use crate::models::*;
use crate::services::{AuthService, QuotaService, SubscriptionService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    post,
    path = "/subscription/subscribe",
    tag = "subscription",
    request_body = SubscribeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscribed, including any downgrade reconciliation", body = SubscribeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 400, description = "Plan not available")
    )
)]
pub async fn subscribe(
    auth_service: web::Data<AuthService>,
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match subscription_service.subscribe(&user, request.plan_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription/current",
    tag = "subscription",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current active subscription, null when none", body = SubscriptionResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn current_subscription(
    auth_service: web::Data<AuthService>,
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match subscription_service.current_subscription(&user).await {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription/quota",
    tag = "subscription",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Quota usage for the calling account", body = QuotaSummary),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn quota_info(
    auth_service: web::Data<AuthService>,
    quota_service: web::Data<QuotaService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match quota_service.get_quota_info(&user).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscription")
            .route("/subscribe", web::post().to(subscribe))
            .route("/current", web::get().to(current_subscription))
            .route("/quota", web::get().to(quota_info)),
    );
}
