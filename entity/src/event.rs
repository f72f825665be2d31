use sea_orm::entity::prelude::*;
use serde::Serialize;

/// events, locally created or mirrored from chain

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub event_name: String,

    /// iso-8601 start time
    #[sea_orm(column_type = "Text")]
    pub event_date: String,

    #[sea_orm(column_type = "Text")]
    pub venue: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub regular_price: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub vip_price: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub vvip_price: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// flyer as url or base64 data url
    #[sea_orm(column_type = "Text", nullable)]
    pub flyer_image: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub ipfs_image_hash: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub ipfs_metadata_hash: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub content_hash: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub creator_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub blockchain_tx_hash: Option<String>,

    /// chain-assigned id, unique; null for locally created events
    pub blockchain_event_id: Option<i64>,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
