use entity::event;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(event::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(event::Column::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(event::Column::EventName).text().not_null())
            .col(ColumnDef::new(event::Column::EventDate).text().not_null())
            .col(ColumnDef::new(event::Column::Venue).text().not_null())
            .col(ColumnDef::new(event::Column::RegularPrice).text().null())
            .col(ColumnDef::new(event::Column::VipPrice).text().null())
            .col(ColumnDef::new(event::Column::VvipPrice).text().null())
            .col(ColumnDef::new(event::Column::Description).text().null())
            .col(ColumnDef::new(event::Column::FlyerImage).text().null())
            .col(ColumnDef::new(event::Column::IpfsImageHash).text().null())
            .col(ColumnDef::new(event::Column::IpfsMetadataHash).text().null())
            .col(ColumnDef::new(event::Column::ContentHash).text().null())
            .col(ColumnDef::new(event::Column::CreatorAddress).text().null())
            .col(ColumnDef::new(event::Column::BlockchainTxHash).text().null())
            .col(
                ColumnDef::new(event::Column::BlockchainEventId)
                    .big_integer()
                    .null(),
            )
            .col(
                ColumnDef::new(event::Column::CreatedAt)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(event::Column::UpdatedAt)
                    .big_integer()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_event_blockchain_event_id")
                    .col(event::Column::BlockchainEventId)
                    .table(event::Entity)
                    .unique()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_event_blockchain_event_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(event::Entity).to_owned())
            .await
    }
}
