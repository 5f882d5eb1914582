use crate::entities::{AdStatus, ad_entity as ads};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdResponse {
    pub id: i64,
    pub user_id: i64,
    pub space_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ads::Model> for AdResponse {
    fn from(a: ads::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            space_id: a.space_id,
            title: a.title,
            description: a.description,
            price_cents: a.price_cents,
            status: a.status,
            created_at: a.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdRequest {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub space_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReactivateAdResponse {
    pub reactivated: bool,
    pub ad: AdResponse,
}
