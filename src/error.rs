//! Error types for rizos-bot.

use std::time::Duration;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures posting an envelope to the Graph API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientInit(String),

    #[error("Failed to serialize envelope: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Inbound webhook errors.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("Invalid request signature")]
    InvalidSignature,

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Payload is not a WhatsApp message event")]
    NotAMessageEvent,

    #[error("Unsupported message type: {0}")]
    UnsupportedMessage(String),
}

/// Canned content errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Message file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
