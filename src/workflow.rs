//! Langflow workflow client.
//!
//! Sends one user message to a Langflow run endpoint and extracts the reply
//! from its nested result structure. The client never fails across its
//! boundary: every error path degrades to a fixed, displayable fallback
//! string, so a workflow outage shows up to the user as an apology rather
//! than a dropped conversation.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::WorkflowError;

/// Reply when the response shape does not contain the expected message path.
pub const FALLBACK_EXTRACT: &str = "Sorry, I could not process your request.";
/// Reply when the workflow endpoint answers with a non-200 status.
pub const FALLBACK_UPSTREAM: &str = "Sorry, I'm having trouble processing your request right now.";
/// Reply when the workflow endpoint is unreachable or times out.
pub const FALLBACK_UNAVAILABLE: &str = "Sorry, I'm temporarily unavailable. Please try again later.";
/// Reply for any other unexpected failure.
pub const FALLBACK_GENERIC: &str = "Sorry, something went wrong. Please try again.";

/// Upper bound on one workflow execution.
const WORKFLOW_TIMEOUT: Duration = Duration::from_secs(60);

/// Capability seam: execute the AI workflow for one message.
///
/// Always returns a displayable reply string; failures are absorbed.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync {
    async fn execute(&self, sender_id: &str, text: &str) -> String;
}

/// Client for the Langflow run API.
pub struct LangflowClient {
    base_url: String,
    workflow_id: String,
    api_token: SecretString,
    client: reqwest::Client,
}

impl LangflowClient {
    pub fn new(base_url: String, workflow_id: String, api_token: SecretString) -> Self {
        Self {
            base_url,
            workflow_id,
            api_token,
            client: reqwest::Client::builder()
                .timeout(WORKFLOW_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn run_url(&self) -> String {
        format!("{}/api/v1/run/{}", self.base_url, self.workflow_id)
    }

    /// Run the workflow and extract the reply. Callers go through
    /// [`WorkflowExecutor::execute`], which maps errors to fallbacks.
    async fn run_workflow(&self, text: &str) -> Result<String, WorkflowError> {
        let body = serde_json::json!({
            "input_value": text,
            "output_type": "chat",
            "input_type": "chat",
        });

        let resp = self
            .client
            .post(self.run_url())
            .bearer_auth(self.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkflowError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WorkflowError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = resp
            .json()
            .await
            .map_err(|e| WorkflowError::InvalidResponse {
                reason: e.to_string(),
            })?;

        extract_reply(&result)
            .map(String::from)
            .ok_or(WorkflowError::ReplyMissing)
    }
}

/// Descend the fixed reply path in a Langflow run response.
fn extract_reply(result: &Value) -> Option<&str> {
    result
        .get("outputs")?
        .get(0)?
        .get("outputs")?
        .get(0)?
        .get("results")?
        .get("message")?
        .get("text")?
        .as_str()
}

#[async_trait]
impl WorkflowExecutor for LangflowClient {
    // `sender_id` is not part of the run payload yet; it is accepted here so
    // per-sender session correlation can be added without changing the seam.
    async fn execute(&self, sender_id: &str, text: &str) -> String {
        tracing::info!(sender_id, "Sending message to Langflow");

        match self.run_workflow(text).await {
            Ok(reply) => reply,
            Err(WorkflowError::UpstreamStatus { status, body }) => {
                tracing::error!(status, body = %body, "Langflow API error");
                FALLBACK_UPSTREAM.to_string()
            }
            Err(WorkflowError::RequestFailed { reason }) => {
                tracing::error!(reason = %reason, "Request to Langflow failed");
                FALLBACK_UNAVAILABLE.to_string()
            }
            Err(WorkflowError::ReplyMissing) => {
                tracing::error!("Error extracting AI message from Langflow response");
                FALLBACK_EXTRACT.to_string()
            }
            Err(WorkflowError::InvalidResponse { reason }) => {
                tracing::error!(reason = %reason, "Error processing Langflow response");
                FALLBACK_GENERIC.to_string()
            }
        }
    }
}
