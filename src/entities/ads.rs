use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ad_status")]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    #[sea_orm(string_value = "trash")]
    Trash,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "valid")]
    Valid,
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

impl std::fmt::Display for AdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdStatus::Trash => write!(f, "trash"),
            AdStatus::Pending => write!(f, "pending"),
            AdStatus::Valid => write!(f, "valid"),
            AdStatus::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub space_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub status: AdStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
