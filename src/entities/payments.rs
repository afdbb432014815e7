//! SeaORM Entity for payments table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub consolidation_id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consolidations::Entity",
        from = "Column::ConsolidationId",
        to = "super::consolidations::Column::Id",
        on_delete = "Cascade"
    )]
    Consolidations,
}

impl Related<super::consolidations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consolidations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
