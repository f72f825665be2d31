//! http api

use crate::{
    ipfs,
    service::{EventDraft, TicketDraft},
    AppState, Error, Result,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Scope};
use serde::Deserialize;
use serde_json::{json, Value};

pub const CARGO_PKG_VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

fn version() -> String {
    CARGO_PKG_VERSION.map(ToOwned::to_owned).unwrap_or_default()
}

pub fn events_scope() -> Scope {
    web::scope("/api/events")
        .service(list_events)
        .service(create_event)
        .service(get_event)
        .service(update_event)
        .service(delete_event)
        .service(mint_ticket)
        .service(list_tickets)
}

pub fn metadata_scope() -> Scope {
    web::scope("/api/metadata")
        .service(upload_metadata)
        .service(fetch_metadata)
}

#[get("/health")]
pub async fn health() -> impl Responder {
    web::Json(json!({
        "status": "OK",
        "message": "ticketbox api is running",
        "version": version(),
    }))
}

#[get("")]
pub async fn list_events(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    let events = state.service.list_events().await?;
    Ok(web::Json(events))
}

#[get("/{id}")]
pub async fn get_event(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let event = state
        .service
        .get_event(path.into_inner())
        .await?
        .ok_or(Error::NotFound)?;
    Ok(web::Json(event))
}

fn validate_draft(draft: &EventDraft) -> Result<()> {
    if draft.event_name.is_empty() || draft.event_date.is_empty() || draft.venue.is_empty() {
        return Err(Error::InvalidParam(
            "Event name, date, and venue are required".to_owned(),
        ));
    }
    if let Some(flyer) = &draft.flyer_image {
        if flyer.starts_with("data:") {
            // rejects non-image data urls
            ipfs::decode_base64_image(flyer)?;
        }
    }
    Ok(())
}

#[post("")]
pub async fn create_event(
    state: web::Data<AppState>,
    data: web::Json<EventDraft>,
) -> Result<impl Responder, Error> {
    let draft = data.into_inner();
    validate_draft(&draft)?;
    let event = state.service.create_event(draft).await?;
    Ok(HttpResponse::Created().json(event))
}

#[put("/{id}")]
pub async fn update_event(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    data: web::Json<EventDraft>,
) -> Result<impl Responder, Error> {
    let draft = data.into_inner();
    validate_draft(&draft)?;
    let event = state.service.update_event(path.into_inner(), draft).await?;
    Ok(web::Json(event))
}

#[delete("/{id}")]
pub async fn delete_event(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_event(path.into_inner()).await?;
    Ok(web::Json(json!({"success": true})))
}

/// record a ticket mint against an event
#[post("/{id}/mint")]
pub async fn mint_ticket(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    data: web::Json<TicketDraft>,
) -> Result<impl Responder, Error> {
    let draft = data.into_inner();
    if draft.wallet_address.is_empty() {
        return Err(Error::InvalidParam("walletAddress is required".to_owned()));
    }
    let event = state
        .service
        .get_event(path.into_inner())
        .await?
        .ok_or(Error::NotFound)?;

    // on-chain verifiable payload rendered into the qr code
    let qr_code = json!({
        "contractAddress": draft.ticket_contract_address,
        "tokenId": draft.tier_id,
        "owner": draft.wallet_address,
        "eventId": event.id,
    })
    .to_string();

    let ticket = state
        .service
        .create_ticket(event.id, draft, Some(qr_code))
        .await?;
    Ok(HttpResponse::Created().json(ticket))
}

#[get("/{id}/tickets")]
pub async fn list_tickets(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let event = state
        .service
        .get_event(path.into_inner())
        .await?
        .ok_or(Error::NotFound)?;
    let tickets = state.service.tickets_for_event(event.id).await?;
    Ok(web::Json(tickets))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UploadMetadataReq {
    pub metadata: Option<Value>,
    pub r#type: String,
    pub image: Option<String>,
}

/// pin poap/badge metadata to the content-addressed store
#[post("/upload")]
pub async fn upload_metadata(
    state: web::Data<AppState>,
    data: web::Json<UploadMetadataReq>,
) -> Result<impl Responder, Error> {
    let req = data.into_inner();
    let mut metadata = req
        .metadata
        .ok_or_else(|| Error::InvalidParam("Metadata is required".to_owned()))?;
    if req.r#type != "POAP" && req.r#type != "Badge" {
        return Err(Error::InvalidParam(
            "Only POAP and Badge metadata can be uploaded to IPFS".to_owned(),
        ));
    }
    let jwt = state
        .setting
        .ipfs
        .pinata_jwt
        .clone()
        .ok_or_else(|| Error::InvalidParam("pinning is not configured".to_owned()))?;
    let pinner = ipfs::Pinner::new(state.setting.ipfs.pinata_endpoint.clone(), jwt);

    // image failures are soft, the metadata document is still pinned
    let mut ipfs_image_hash = None;
    if let Some(image) = &req.image {
        let filename = format!("{}-{}.jpg", req.r#type, crate::now());
        match ipfs::decode_base64_image(image) {
            Ok(bytes) => match pinner.pin_image(bytes, filename).await {
                Ok(hash) => {
                    metadata["image"] = Value::String(format!("ipfs://{}", hash));
                    ipfs_image_hash = Some(hash);
                }
                Err(e) => tracing::warn!(error = e.to_string(), "image pin failed"),
            },
            Err(e) => return Err(e),
        }
    }

    let name = format!("{}-metadata-{}.json", req.r#type, crate::now());
    let ipfs_hash = pinner.pin_json(&metadata, &name).await?;
    let content_hash = ipfs::content_hash(&metadata);

    Ok(web::Json(json!({
        "success": true,
        "ipfsHash": ipfs_hash,
        "ipfsImageHash": ipfs_image_hash,
        "contentHash": content_hash,
        "ipfsUri": format!("ipfs://{}", ipfs_hash),
    })))
}

/// fetch a metadata document through the gateway mirrors
#[get("/{hash}")]
pub async fn fetch_metadata(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    match state.resolver.fetch_json(&path.into_inner()).await {
        Some(data) => Ok(web::Json(json!({"success": true, "data": data}))),
        None => Err(Error::NotFound),
    }
}
