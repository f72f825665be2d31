//! pinning uploads and content hashing for off-chain metadata

use crate::{now, Error, Result};
use base64::engine::{general_purpose, Engine};
use reqwest::multipart;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// sha256 digest of the canonical json string, hex with 0x prefix
pub fn content_hash(content: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.to_string().as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// decode a base64 image, accepting an optional data url prefix.
/// only image mime types are allowed.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>> {
    let payload = if let Some(rest) = input.strip_prefix("data:") {
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::InvalidParam("invalid data url".to_owned()))?;
        if !mime.starts_with("image/") {
            return Err(Error::InvalidParam(
                "only image uploads are allowed".to_owned(),
            ));
        }
        payload
    } else {
        input
    };
    Ok(general_purpose::STANDARD.decode(payload)?)
}

/// pinata-compatible pinning client
pub struct Pinner {
    endpoint: String,
    jwt: String,
    client: reqwest::Client,
}

impl Pinner {
    pub fn new(endpoint: String, jwt: String) -> Self {
        Self {
            endpoint,
            jwt,
            client: reqwest::Client::new(),
        }
    }

    /// pin a json document, returning its cid
    pub async fn pin_json(&self, content: &Value, name: &str) -> Result<String> {
        let body = json!({
            "pinataContent": content,
            "pinataMetadata": {
                "name": name,
                "keyvalues": {"type": "metadata", "timestamp": now().to_string()},
            },
            "pinataOptions": {"cidVersion": 1},
        });
        let resp = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.endpoint))
            .bearer_auth(&self.jwt)
            .json(&body)
            .send()
            .await?;
        extract_hash(resp).await
    }

    /// pin raw image bytes, returning the cid
    pub async fn pin_image(&self, bytes: Vec<u8>, filename: String) -> Result<String> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text(
                "pinataMetadata",
                json!({
                    "name": filename,
                    "keyvalues": {"type": "event-flyer", "timestamp": now().to_string()},
                })
                .to_string(),
            )
            .text("pinataOptions", json!({"cidVersion": 1}).to_string());
        let resp = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.endpoint))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await?;
        extract_hash(resp).await
    }
}

async fn extract_hash(resp: reqwest::Response) -> Result<String> {
    if !resp.status().is_success() {
        let detail = resp.text().await.unwrap_or_default();
        return Err(Error::Message(format!("pinning failed: {}", detail)));
    }
    let val: Value = resp.json().await?;
    val.get("IpfsHash")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(Error::Str("missing IpfsHash in pinning response"))
}
