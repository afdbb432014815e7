//! Migration to create the consolidations table
//!
//! `amount` is the aggregate of the attached orders and is maintained by the
//! application, never written by clients.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Consolidations::Table)
                    .if_not_exists()
                    .col(pk_auto(Consolidations::Id))
                    .col(uuid(Consolidations::AdminId).not_null())
                    .col(decimal_len(Consolidations::Amount, 16, 2).not_null().default(0))
                    .col(string(Consolidations::Tier).not_null())
                    .col(string(Consolidations::Status).not_null().default("pending"))
                    .col(text_null(Consolidations::Notes))
                    .col(
                        timestamp_with_time_zone(Consolidations::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Consolidations::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_consolidations_status")
                    .table(Consolidations::Table)
                    .col(Consolidations::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consolidations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Consolidations {
    Table,
    Id,
    AdminId,
    Amount,
    Tier,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
