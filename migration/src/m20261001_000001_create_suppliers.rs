//! Migration to create the suppliers table

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(pk_auto(Suppliers::Id))
                    .col(uuid(Suppliers::OwnerId).not_null())
                    .col(string(Suppliers::CompanyName).not_null())
                    .col(string(Suppliers::ContactEmail).not_null())
                    .col(string_null(Suppliers::Phone))
                    .col(string(Suppliers::City).not_null())
                    .col(string(Suppliers::Country).not_null().default("Turkey"))
                    .col(boolean(Suppliers::Verified).default(false))
                    .col(
                        timestamp_with_time_zone(Suppliers::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Suppliers::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_suppliers_owner_id")
                    .table(Suppliers::Table)
                    .col(Suppliers::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Suppliers {
    Table,
    Id,
    OwnerId,
    CompanyName,
    ContactEmail,
    Phone,
    City,
    Country,
    Verified,
    CreatedAt,
    UpdatedAt,
}
