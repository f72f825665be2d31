use sea_orm::entity::prelude::*;
use serde::Serialize;

/// minted tickets

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub event_id: i32,

    #[sea_orm(column_type = "Text")]
    pub wallet_address: String,

    pub tier_id: i32,

    pub quantity: i32,

    /// qr payload json with the on-chain verifiable fields
    #[sea_orm(column_type = "Text", nullable)]
    pub qr_code: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub transaction_hash: Option<String>,

    pub verified: bool,

    /// data create time
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
