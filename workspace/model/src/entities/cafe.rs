use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed cafes drop out of the public listing but keep their pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CafeStatus {
    #[sea_orm(string_value = "opening")]
    Opening,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl CafeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CafeStatus::Opening => "opening",
            CafeStatus::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "opening" => Some(CafeStatus::Opening),
            "closed" => Some(CafeStatus::Closed),
            _ => None,
        }
    }
}

/// A cafe listed on the site, maintained by administrators.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cafes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// File name of the cover image inside the upload directory.
    pub image: Option<String>,
    pub opening_hours: Option<String>,
    pub status: CafeStatus,
    pub created_on: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dish::Entity")]
    Dish,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dish.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
