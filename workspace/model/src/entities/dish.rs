use sea_orm::entity::prelude::*;

/// A dish served by exactly one cafe.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cafe_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_on: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cafe::Entity",
        from = "Column::CafeId",
        to = "super::cafe::Column::Id"
    )]
    Cafe,
}

impl Related<super::cafe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
