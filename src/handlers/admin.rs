use crate::models::*;
use crate::services::{AuthService, PlanService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/admin/plans",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All plans, including inactive ones"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_all_plans(
    auth_service: web::Data<AuthService>,
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match plan_service.list_all_plans(&user).await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/plans",
    tag = "admin",
    request_body = CreatePlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan created", body = PlanResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_plan(
    auth_service: web::Data<AuthService>,
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    request: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match plan_service.create_plan(&user, request.into_inner()).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/plans/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "Plan id")),
    request_body = UpdatePlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan updated", body = PlanResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn update_plan(
    auth_service: web::Data<AuthService>,
    plan_service: web::Data<PlanService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePlanRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let user = match auth_service.get_user(user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    match plan_service
        .update_plan(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/plans", web::get().to(list_all_plans))
            .route("/plans", web::post().to(create_plan))
            .route("/plans/{id}", web::put().to(update_plan)),
    );
}
