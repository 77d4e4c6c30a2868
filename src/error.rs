//! Error types for the relay.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Workflow-execution errors. These never cross the `WorkflowExecutor`
/// boundary; the client absorbs them into fixed fallback replies.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Workflow endpoint returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid workflow response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Workflow response has no reply at the expected path")]
    ReplyMissing,
}

/// Outbound delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to send reply to {platform}: {reason}")]
    SendFailed { platform: String, reason: String },

    #[error("{platform} rejected the reply with status {status}: {body}")]
    DeliveryRejected {
        platform: String,
        status: u16,
        body: String,
    },
}
