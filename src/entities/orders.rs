//! SeaORM Entity for orders table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub buyer_id: Uuid,
    pub supplier_id: i32,
    pub consolidation_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub shipping_address: Option<String>,
    pub tracking_reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
    #[sea_orm(
        belongs_to = "super::consolidations::Entity",
        from = "Column::ConsolidationId",
        to = "super::consolidations::Column::Id",
        on_delete = "SetNull"
    )]
    Consolidations,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::consolidations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consolidations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
