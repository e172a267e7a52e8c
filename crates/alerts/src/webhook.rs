//! Discord webhook payloads and delivery.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    #[error("failed to encode payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to read attachment: {0}")]
    Attachment(#[from] std::io::Error),
}

/// One embed field (name/value pair rendered inline).
#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

/// A single rich embed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

/// Top-level webhook payload.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub embeds: Vec<Embed>,
}

/// Delivers payloads to webhook endpoints, as plain JSON or as a
/// multipart request when an image attachment rides along.
#[derive(Debug, Clone, Default)]
pub struct WebhookClient {
    http: reqwest::Client,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a payload. A non-2xx response is a delivery failure; the
    /// caller decides what to do, no retry happens here.
    pub async fn send(
        &self,
        endpoint: &str,
        mut payload: WebhookPayload,
        attachment: Option<&Path>,
    ) -> Result<(), DispatchError> {
        let response = match attachment {
            Some(path) => {
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "chart.png".to_string());
                if let Some(embed) = payload.embeds.first_mut() {
                    embed.image = Some(EmbedImage {
                        url: format!("attachment://{filename}"),
                    });
                }
                let bytes = std::fs::read(path)?;
                let form = reqwest::multipart::Form::new()
                    .text("payload_json", serde_json::to_string(&payload)?)
                    .part(
                        "files[0]",
                        reqwest::multipart::Part::bytes(bytes)
                            .file_name(filename)
                            .mime_str("image/png")?,
                    );
                self.http.post(endpoint).multipart(form).send().await?
            }
            None => self.http.post(endpoint).json(&payload).send().await?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        debug!(status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}
