use crate::entities::subscription_plan_entity as plans;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: i64,
    pub label: String,
    pub max_ads: i32,
    pub max_spaces: i32,
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<plans::Model> for PlanResponse {
    fn from(p: plans::Model) -> Self {
        Self {
            id: p.id,
            label: p.label,
            max_ads: p.max_ads,
            max_spaces: p.max_spaces,
            duration_days: p.duration_days,
            is_active: p.is_active,
            created_at: p.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub label: String,
    pub max_ads: i32,
    pub max_spaces: i32,
    pub duration_days: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePlanRequest {
    pub label: Option<String>,
    pub max_ads: Option<i32>,
    pub max_spaces: Option<i32>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
}
