use crate::models::*;
use crate::services::SpaceService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    post,
    path = "/spaces",
    tag = "space",
    request_body = CreateSpaceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Space created", body = SpaceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 400, description = "Not an agency or quota exhausted")
    )
)]
pub async fn create_space(
    space_service: web::Data<SpaceService>,
    req: HttpRequest,
    request: web::Json<CreateSpaceRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match space_service
        .create_space(user_id, request.into_inner())
        .await
    {
        Ok(space) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": space
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/spaces",
    tag = "space",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The calling account's spaces"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_spaces(
    space_service: web::Data<SpaceService>,
    req: HttpRequest,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match space_service.list_my_spaces(user_id, &params).await {
        Ok(spaces) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": spaces
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/spaces/{id}/deactivate",
    tag = "space",
    params(("id" = i64, Path, description = "Space id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Space deactivated", body = SpaceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Space not found")
    )
)]
pub async fn deactivate_space(
    space_service: web::Data<SpaceService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match space_service
        .deactivate_space(user_id, path.into_inner())
        .await
    {
        Ok(space) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": space
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/spaces/{id}/reactivate",
    tag = "space",
    params(("id" = i64, Path, description = "Space id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reactivation outcome; false means a precondition failed", body = ReactivateSpaceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Space not found")
    )
)]
pub async fn reactivate_space(
    space_service: web::Data<SpaceService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match space_service
        .reactivate_space(user_id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn space_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/spaces")
            .route("", web::post().to(create_space))
            .route("", web::get().to(list_spaces))
            .route("/{id}/deactivate", web::post().to(deactivate_space))
            .route("/{id}/reactivate", web::post().to(reactivate_space)),
    );
}
