//! Migration to create the products table

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20261001_000001_create_suppliers::Suppliers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(integer(Products::SupplierId).not_null())
                    .col(string(Products::Name).not_null())
                    .col(text_null(Products::Description))
                    .col(decimal_len(Products::UnitPrice, 16, 2).not_null())
                    .col(string_len(Products::Currency, 3).not_null().default("USD"))
                    .col(integer(Products::MinOrderQuantity).not_null().default(1))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_products_supplier_id")
                    .from(Products::Table, Products::SupplierId)
                    .to(Suppliers::Table, Suppliers::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    SupplierId,
    Name,
    Description,
    UnitPrice,
    Currency,
    MinOrderQuantity,
    CreatedAt,
    UpdatedAt,
}
