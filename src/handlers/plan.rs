use crate::services::PlanService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/plans",
    tag = "plan",
    responses(
        (status = 200, description = "Active subscription plans")
    )
)]
pub async fn list_plans(plan_service: web::Data<PlanService>) -> Result<HttpResponse> {
    match plan_service.list_active_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn plan_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/plans", web::get().to(list_plans));
}
