//! Microsoft Graph client for the signed-in user.

use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::cards::Attachment;
use crate::error::{ensure_success, Result};
use crate::models::GraphProfile;

/// Graph client acting as the signed-in user whose token is passed per call.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Signed-in user's profile (`GET /me`).
    #[instrument(skip_all)]
    pub async fn get_my_profile(&self, token: &str) -> Result<GraphProfile> {
        let response = self
            .client
            .get(format!("{}/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success("Microsoft Graph", response).await?;
        Ok(response.json().await?)
    }

    /// Signed-in user's photo as a `data:` URL usable in card images.
    #[instrument(skip_all)]
    pub async fn get_photo_data_url(&self, token: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/me/photo/$value", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success("Microsoft Graph", response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), %content_type, "Fetched profile photo");

        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(format!("data:{content_type};base64,{encoded}"))
    }

    /// Post a message carrying `card` into a channel.
    #[instrument(skip(self, token, card))]
    pub async fn send_channel_message(
        &self,
        token: &str,
        team_id: &str,
        channel_id: &str,
        card: &Attachment,
    ) -> Result<Value> {
        let attachment_id = uuid::Uuid::new_v4().simple().to_string();
        let message = json!({
            "subject": null,
            "body": {
                "contentType": "html",
                "content": format!("<attachment id=\"{attachment_id}\"></attachment>")
            },
            "attachments": [
                {
                    "id": attachment_id,
                    "contentType": card.content_type,
                    // Graph expects the card body as a JSON string
                    "content": card.content.to_string(),
                    "name": null,
                    "thumbnailUrl": null
                }
            ]
        });

        let response = self
            .client
            .post(format!(
                "{}/teams/{team_id}/channels/{channel_id}/messages",
                self.base_url
            ))
            .bearer_auth(token)
            .json(&message)
            .send()
            .await?;
        let response = ensure_success("Microsoft Graph", response).await?;
        Ok(response.json().await?)
    }
}
