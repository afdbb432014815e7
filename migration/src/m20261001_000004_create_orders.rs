//! Migration to create the orders table

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20261001_000001_create_suppliers::Suppliers;
use crate::m20261001_000003_create_consolidations::Consolidations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(uuid(Orders::BuyerId).not_null())
                    .col(integer(Orders::SupplierId).not_null())
                    .col(integer_null(Orders::ConsolidationId))
                    .col(decimal_len(Orders::Amount, 16, 2).not_null())
                    .col(string_len(Orders::Currency, 3).not_null().default("USD"))
                    .col(string(Orders::Status).not_null().default("pending"))
                    .col(text_null(Orders::ShippingAddress))
                    .col(string_null(Orders::TrackingReference))
                    .col(
                        timestamp_with_time_zone(Orders::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Orders::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Orders::Amount).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_orders_supplier_id")
                    .from(Orders::Table, Orders::SupplierId)
                    .to(Suppliers::Table, Suppliers::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_orders_consolidation_id")
                    .from(Orders::Table, Orders::ConsolidationId)
                    .to(Consolidations::Table, Consolidations::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        // Index for querying by buyer
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_buyer_id")
                    .table(Orders::Table)
                    .col(Orders::BuyerId)
                    .to_owned(),
            )
            .await?;

        // Index for aggregating by consolidation
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_consolidation_id")
                    .table(Orders::Table)
                    .col(Orders::ConsolidationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    BuyerId,
    SupplierId,
    ConsolidationId,
    Amount,
    Currency,
    Status,
    ShippingAddress,
    TrackingReference,
    CreatedAt,
    UpdatedAt,
}
