use crate::models::*;
use crate::services::AdService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    post,
    path = "/ads",
    tag = "ad",
    request_body = CreateAdRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ad created, pending moderation", body = AdResponse),
        (status = 401, description = "Unauthorized"),
        (status = 400, description = "Quota exhausted or invalid request")
    )
)]
pub async fn create_ad(
    ad_service: web::Data<AdService>,
    req: HttpRequest,
    request: web::Json<CreateAdRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match ad_service.create_ad(user_id, request.into_inner()).await {
        Ok(ad) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ad
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ads",
    tag = "ad",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The calling account's ads"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_ads(
    ad_service: web::Data<AdService>,
    req: HttpRequest,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match ad_service.list_my_ads(user_id, &params).await {
        Ok(ads) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ads
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/ads/{id}/trash",
    tag = "ad",
    params(("id" = i64, Path, description = "Ad id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ad moved to trash", body = AdResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Ad not found")
    )
)]
pub async fn trash_ad(
    ad_service: web::Data<AdService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match ad_service.trash_ad(user_id, path.into_inner()).await {
        Ok(ad) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ad
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/ads/{id}/reactivate",
    tag = "ad",
    params(("id" = i64, Path, description = "Ad id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reactivation outcome; false means a precondition failed", body = ReactivateAdResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Ad not found")
    )
)]
pub async fn reactivate_ad(
    ad_service: web::Data<AdService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match ad_service.reactivate_ad(user_id, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ad_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ads")
            .route("", web::post().to(create_ad))
            .route("", web::get().to(list_ads))
            .route("/{id}/trash", web::post().to(trash_ad))
            .route("/{id}/reactivate", web::post().to(reactivate_ad)),
    );
}
