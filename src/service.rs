use crate::{now, Error, Result};
use entity::{event, ticket};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, NotSet, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

/// incoming event document, shared by the http api and the reconciler
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDraft {
    pub event_name: String,
    pub event_date: String,
    pub venue: String,
    pub description: Option<String>,
    pub regular_price: Option<String>,
    pub vip_price: Option<String>,
    pub vvip_price: Option<String>,
    pub flyer_image: Option<String>,
    pub ipfs_image_hash: Option<String>,
    pub ipfs_metadata_hash: Option<String>,
    pub content_hash: Option<String>,
    pub creator_address: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub blockchain_event_id: Option<i64>,
}

/// minted ticket document
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketDraft {
    pub wallet_address: String,
    pub tier_id: i32,
    pub quantity: i32,
    pub transaction_hash: Option<String>,
    pub ticket_contract_address: Option<String>,
}

/// event store service. the connection is opened by the host at startup
/// and owned here for the process lifetime.
pub struct Service {
    conn: DbConn,
}

impl Service {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn db(&self) -> &DbConn {
        &self.conn
    }

    pub async fn list_events(&self) -> Result<Vec<event::Model>> {
        Ok(event::Entity::find()
            .order_by_desc(event::Column::CreatedAt)
            .order_by_desc(event::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn get_event(&self, id: i32) -> Result<Option<event::Model>> {
        Ok(event::Entity::find_by_id(id).one(self.db()).await?)
    }

    /// existence check keyed by the unique on-chain identifier
    pub async fn get_event_by_chain_id(&self, chain_id: u64) -> Result<Option<event::Model>> {
        Ok(event::Entity::find()
            .filter(event::Column::BlockchainEventId.eq(chain_id as i64))
            .one(self.db())
            .await?)
    }

    pub async fn create_event(&self, draft: EventDraft) -> Result<event::Model> {
        let time = now() as i64;
        Ok(event::ActiveModel {
            id: NotSet,
            event_name: Set(draft.event_name),
            event_date: Set(draft.event_date),
            venue: Set(draft.venue),
            regular_price: Set(draft.regular_price),
            vip_price: Set(draft.vip_price),
            vvip_price: Set(draft.vvip_price),
            description: Set(draft.description),
            flyer_image: Set(draft.flyer_image),
            ipfs_image_hash: Set(draft.ipfs_image_hash),
            ipfs_metadata_hash: Set(draft.ipfs_metadata_hash),
            content_hash: Set(draft.content_hash),
            creator_address: Set(draft.creator_address),
            blockchain_tx_hash: Set(draft.blockchain_tx_hash),
            blockchain_event_id: Set(draft.blockchain_event_id),
            created_at: Set(time),
            updated_at: Set(time),
        }
        .insert(self.db())
        .await?)
    }

    pub async fn update_event(&self, id: i32, draft: EventDraft) -> Result<event::Model> {
        let existing = self.get_event(id).await?.ok_or(Error::NotFound)?;
        Ok(event::ActiveModel {
            id: Set(existing.id),
            event_name: Set(draft.event_name),
            event_date: Set(draft.event_date),
            venue: Set(draft.venue),
            regular_price: Set(draft.regular_price),
            vip_price: Set(draft.vip_price),
            vvip_price: Set(draft.vvip_price),
            description: Set(draft.description),
            flyer_image: Set(draft.flyer_image.or(existing.flyer_image)),
            updated_at: Set(now() as i64),
            ..Default::default()
        }
        .update(self.db())
        .await?)
    }

    pub async fn delete_event(&self, id: i32) -> Result<()> {
        let res = event::Entity::delete_by_id(id).exec(self.db()).await?;
        if res.rows_affected == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub async fn create_ticket(
        &self,
        event_id: i32,
        draft: TicketDraft,
        qr_code: Option<String>,
    ) -> Result<ticket::Model> {
        Ok(ticket::ActiveModel {
            id: NotSet,
            event_id: Set(event_id),
            wallet_address: Set(draft.wallet_address),
            tier_id: Set(draft.tier_id),
            quantity: Set(draft.quantity.max(1)),
            qr_code: Set(qr_code),
            transaction_hash: Set(draft.transaction_hash),
            verified: Set(true),
            created_at: Set(now() as i64),
        }
        .insert(self.db())
        .await?)
    }

    pub async fn tickets_for_event(&self, event_id: i32) -> Result<Vec<ticket::Model>> {
        Ok(ticket::Entity::find()
            .filter(ticket::Column::EventId.eq(event_id))
            .order_by_asc(ticket::Column::Id)
            .all(self.db())
            .await?)
    }
}
