//! Webhook HTTP surface: Meta verification handshake, message delivery, health.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::content::ContentStore;
use crate::error::WebhookError;
use crate::pipeline::{GreetingTracker, MessageProcessor, Responder};
use crate::whatsapp::signature::{SIGNATURE_HEADER, verify_signature};
use crate::whatsapp::{WhatsAppClient, extract_message, is_status_update, is_valid_message_event};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<MessageProcessor>,
    /// Token Meta must echo during the handshake.
    pub verify_token: SecretString,
    /// Signature checks are skipped when `None`.
    pub app_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(
        processor: Arc<MessageProcessor>,
        verify_token: SecretString,
        app_secret: Option<SecretString>,
    ) -> Self {
        Self {
            processor,
            verify_token,
            app_secret,
        }
    }

    /// Wire the Graph API client, greeting tracker and responder from config.
    pub fn from_config(config: &BotConfig) -> crate::error::Result<Self> {
        let client = WhatsAppClient::new(config.whatsapp.clone())?;
        let responder = Responder::with_store(ContentStore::new(&config.messages_dir));
        let processor = MessageProcessor::new(
            Arc::new(client),
            Arc::new(GreetingTracker::new()),
            Arc::new(responder),
            config.welcome.clone(),
        );

        if config.whatsapp.app_secret.is_none() {
            warn!("APP_SECRET not set, webhook signatures will not be verified");
        }

        Ok(Self::new(
            Arc::new(processor),
            config.whatsapp.verify_token.clone(),
            config.whatsapp.app_secret.clone(),
        ))
    }
}

/// Build the Axum router with the webhook and health routes.
pub fn webhook_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify).post(receive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

fn ok_body() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                error_body(StatusCode::FORBIDDEN, "Invalid signature")
            }
            WebhookError::InvalidJson(_) => {
                error_body(StatusCode::BAD_REQUEST, "Invalid JSON provided")
            }
            WebhookError::NotAMessageEvent => {
                error_body(StatusCode::NOT_FOUND, "Not a WhatsApp API event")
            }
            WebhookError::UnsupportedMessage(_) => ok_body().into_response(),
        }
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "rizos-bot"
    }))
}

// ── Verification handshake ─────────────────────────────────────────────

/// Query Meta sends when (re)subscribing the webhook.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

async fn verify(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    let mode = query.mode.filter(|m| !m.is_empty());
    let token = query.verify_token.filter(|t| !t.is_empty());

    let (Some(mode), Some(token)) = (mode, token) else {
        info!("Webhook verification missing parameters");
        return error_body(StatusCode::BAD_REQUEST, "Missing parameters");
    };

    if mode == "subscribe" && token == state.verify_token.expose_secret() {
        info!("Webhook verified");
        (StatusCode::OK, query.challenge.unwrap_or_default()).into_response()
    } else {
        info!(mode = %mode, "Webhook verification failed");
        error_body(StatusCode::FORBIDDEN, "Verification failed")
    }
}

// ── Message delivery ───────────────────────────────────────────────────

async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, WebhookError> {
    if let Some(secret) = &state.app_secret {
        let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        verify_signature(secret.expose_secret(), &body, header).inspect_err(|e| {
            info!(error = %e, "Signature verification failed");
        })?;
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Failed to decode webhook JSON");
        WebhookError::InvalidJson(e.to_string())
    })?;

    if is_status_update(&payload) {
        info!("Received a WhatsApp status update");
        return Ok(ok_body());
    }

    if !is_valid_message_event(&payload) {
        return Err(WebhookError::NotAMessageEvent);
    }

    let message = match extract_message(&payload) {
        Ok(message) => message,
        Err(WebhookError::UnsupportedMessage(kind)) => {
            info!(kind = %kind, "Ignoring non-text message");
            return Ok(ok_body());
        }
        Err(e) => {
            warn!(error = %e, "Message event missing sender or text");
            return Err(e);
        }
    };

    let outcome = state.processor.process(&message).await;
    info!(
        wa_id = %message.wa_id,
        welcomed = outcome.welcomed,
        topic = outcome.topic.map(|t| t.as_str()).unwrap_or("default"),
        failed_sends = outcome.failed_sends,
        "Message processed"
    );

    Ok(ok_body())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_query_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: VerifyQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("test123"));
        assert_eq!(query.challenge.as_deref(), Some("challenge123"));
    }

    #[test]
    fn verify_query_fields_are_optional() {
        let query: VerifyQuery = serde_json::from_str("{}").unwrap();
        assert!(query.mode.is_none() && query.verify_token.is_none() && query.challenge.is_none());
    }

    #[test]
    fn webhook_errors_map_to_status_codes() {
        let cases = [
            (WebhookError::MissingSignature, StatusCode::FORBIDDEN),
            (WebhookError::InvalidSignature, StatusCode::FORBIDDEN),
            (WebhookError::InvalidJson("eof".into()), StatusCode::BAD_REQUEST),
            (WebhookError::NotAMessageEvent, StatusCode::NOT_FOUND),
            (WebhookError::UnsupportedMessage("image".into()), StatusCode::OK),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
