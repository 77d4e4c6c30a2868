//! Outbound reply delivery.
//!
//! Messenger replies go out through the Graph `me/messages` endpoint.
//! Instagram restricts automated push replies, so replies to Instagram
//! messages are recorded in the log instead of delivered.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::DispatchError;
use crate::webhook::Origin;

/// Graph API base for outbound Messenger delivery.
pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Capability seam: deliver one reply to its originating platform.
#[async_trait]
pub trait ReplyDispatcher: Send + Sync {
    async fn deliver(
        &self,
        recipient_id: &str,
        text: &str,
        origin: Origin,
    ) -> Result<(), DispatchError>;
}

/// Dispatcher backed by the Facebook Graph API.
pub struct GraphDispatcher {
    graph_base: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl GraphDispatcher {
    pub fn new(access_token: SecretString) -> Self {
        Self::with_base_url(GRAPH_API_BASE.to_string(), access_token)
    }

    /// Point the dispatcher at a different Graph base URL (tests use this to
    /// target a stub server).
    pub fn with_base_url(graph_base: String, access_token: SecretString) -> Self {
        Self {
            graph_base,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/me/messages", self.graph_base)
    }

    async fn send_to_messenger(
        &self,
        recipient_id: &str,
        text: &str,
    ) -> Result<(), DispatchError> {
        let body = serde_json::json!({
            "recipient": {"id": recipient_id},
            "message": {"text": text},
        });

        let resp = self
            .client
            .post(self.messages_url())
            .query(&[("access_token", self.access_token.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::SendFailed {
                platform: "messenger".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::DeliveryRejected {
                platform: "messenger".into(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(recipient = recipient_id, "Message sent to Messenger");
        Ok(())
    }
}

#[async_trait]
impl ReplyDispatcher for GraphDispatcher {
    async fn deliver(
        &self,
        recipient_id: &str,
        text: &str,
        origin: Origin,
    ) -> Result<(), DispatchError> {
        match origin {
            Origin::Messenger => self.send_to_messenger(recipient_id, text).await,
            Origin::Instagram => {
                // Platform policy: no automated push replies on Instagram.
                // Record the would-be reply for observability.
                tracing::info!(
                    recipient = recipient_id,
                    reply = text,
                    "Instagram reply suppressed (platform restricts automated replies)"
                );
                Ok(())
            }
        }
    }
}
