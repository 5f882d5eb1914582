use crate::entities::space_entity as spaces;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpaceResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl From<spaces::Model> for SpaceResponse {
    fn from(s: spaces::Model) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            name: s.name,
            status: s.status,
            created_at: s.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSpaceRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReactivateSpaceResponse {
    pub reactivated: bool,
    pub space: SpaceResponse,
}
