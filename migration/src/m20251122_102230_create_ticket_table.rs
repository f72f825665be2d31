use entity::{event, ticket};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ticket::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(ticket::Column::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ticket::Column::EventId).integer().not_null())
            .col(
                ColumnDef::new(ticket::Column::WalletAddress)
                    .text()
                    .not_null(),
            )
            .col(ColumnDef::new(ticket::Column::TierId).integer().not_null())
            .col(
                ColumnDef::new(ticket::Column::Quantity)
                    .integer()
                    .not_null()
                    .default(1),
            )
            .col(ColumnDef::new(ticket::Column::QrCode).text().null())
            .col(ColumnDef::new(ticket::Column::TransactionHash).text().null())
            .col(
                ColumnDef::new(ticket::Column::Verified)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(ticket::Column::CreatedAt)
                    .big_integer()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_ticket_event")
                    .from(ticket::Entity, ticket::Column::EventId)
                    .to(event::Entity, event::Column::Id),
            )
            .to_owned();

        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_ticket_event_id")
                    .col(ticket::Column::EventId)
                    .table(ticket::Entity)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_ticket_event_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ticket::Entity).to_owned())
            .await
    }
}
