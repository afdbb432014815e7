//! Migration to create the payments table

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20261001_000003_create_consolidations::Consolidations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_auto(Payments::Id))
                    .col(integer(Payments::ConsolidationId).not_null())
                    .col(decimal_len(Payments::Amount, 16, 2).not_null())
                    .col(string(Payments::Method).not_null())
                    .col(string(Payments::Status).not_null().default("pending"))
                    .col(text_null(Payments::Notes))
                    .col(
                        timestamp_with_time_zone(Payments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Payments::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_payments_consolidation_id")
                    .from(Payments::Table, Payments::ConsolidationId)
                    .to(Consolidations::Table, Consolidations::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_consolidation_id")
                    .table(Payments::Table)
                    .col(Payments::ConsolidationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ConsolidationId,
    Amount,
    Method,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}
