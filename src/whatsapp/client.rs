//! Graph API transport. Posts envelopes to `/{version}/{phone_number_id}/messages`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use tracing::{error, info};

use super::envelope::{OutboundMessage, Template};
use crate::config::WhatsAppConfig;
use crate::error::TransportError;

/// What the provider answered to a successful send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Anything that can deliver an outbound message.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, TransportError>;
}

/// WhatsApp Cloud API client.
pub struct WhatsAppClient {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppClient {
    /// Build a client whose every request is bounded by `config.request_timeout`.
    pub fn new(config: WhatsAppConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::ClientInit(e.to_string()))?;

        info!(
            phone_number_id = %config.phone_number_id,
            api_version = %config.api_version,
            "WhatsApp client initialized"
        );

        Ok(Self { config, client })
    }

    pub fn messages_url(&self) -> String {
        self.config.messages_url()
    }

    /// Post an already-serialized envelope.
    pub async fn send_raw(&self, body: String) -> Result<SendReceipt, TransportError> {
        let timeout = self.config.request_timeout;

        let resp = self
            .client
            .post(self.messages_url())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(self.config.access_token.expose_secret())
            .body(body)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .text()
            .await
            .map_err(|e| classify_reqwest_error(e, timeout))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "WhatsApp API rejected message");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or(""),
            body = %body,
            "Message accepted"
        );

        Ok(SendReceipt {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error, timeout: Duration) -> TransportError {
    if e.is_timeout() {
        error!(?timeout, "Timeout occurred while sending message");
        TransportError::Timeout { timeout }
    } else {
        error!(error = %e, "Request failed");
        TransportError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, TransportError> {
        let body = message.to_json()?;
        self.send_raw(body).await
    }
}

/// Send Meta's stock `hello_world` template to check credentials end to end.
pub async fn send_test_template(
    sender: &dyn MessageSender,
    recipient: &str,
) -> Result<SendReceipt, TransportError> {
    let template = Template::new("hello_world").with_language("en_US");
    sender.send(&OutboundMessage::template(recipient, template)).await
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use serde_json::Value;
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    async fn accept(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        captured.requests.lock().unwrap().push((headers, body));
        Json(serde_json::json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "1", "wa_id": "1"}],
            "messages": [{"id": "wamid.ok"}]
        }))
    }

    async fn reject() -> impl IntoResponse {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": {"message": "Invalid parameter", "code": 100}})),
        )
    }

    async fn stall() -> impl IntoResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        StatusCode::OK
    }

    /// Start a fake Graph API, return its base URL.
    async fn fake_graph_api(captured: Captured) -> String {
        let app = Router::new()
            .route("/v18.0/{phone}/messages", post(accept))
            .route("/v18.0/reject/messages", post(reject))
            .route("/v18.0/stall/messages", post(stall))
            .with_state(captured);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{port}")
    }

    fn client_for(base: &str, phone: &str, timeout: Duration) -> WhatsAppClient {
        let mut config = WhatsAppConfig::new("test-token", phone, "verify");
        config.api_base_url = base.to_string();
        config.request_timeout = timeout;
        WhatsAppClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn send_posts_envelope_with_bearer_token() {
        let captured = Captured::default();
        let base = fake_graph_api(captured.clone()).await;
        let client = client_for(&base, "1029384756", REQUEST_TIMEOUT_FOR_TESTS);

        let receipt = client
            .send(&OutboundMessage::text("5215512345678", "hola"))
            .await
            .unwrap();

        assert_eq!(receipt.status, 200);
        assert!(receipt.body.contains("wamid.ok"));
        assert_eq!(receipt.content_type.as_deref(), Some("application/json"));

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (headers, body) = &requests[0];
        assert_eq!(headers["authorization"], "Bearer test-token");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body["to"], "5215512345678");
        assert_eq!(body["text"]["body"], "hola");
    }

    #[tokio::test]
    async fn send_template_reaches_provider() {
        let captured = Captured::default();
        let base = fake_graph_api(captured.clone()).await;
        let client = client_for(&base, "1029384756", REQUEST_TIMEOUT_FOR_TESTS);

        let template =
            Template::new("mensaje_de_bienvenida").with_header_image("https://x.example/a.jpg");
        client
            .send(&OutboundMessage::template("52155", template))
            .await
            .unwrap();

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests[0].1["type"], "template");
        assert_eq!(requests[0].1["template"]["name"], "mensaje_de_bienvenida");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let base = fake_graph_api(Captured::default()).await;
        let client = client_for(&base, "reject", REQUEST_TIMEOUT_FOR_TESTS);

        let err = client
            .send(&OutboundMessage::text("1", "hola"))
            .await
            .unwrap_err();

        match err {
            TransportError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid parameter"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let base = fake_graph_api(Captured::default()).await;
        let client = client_for(&base, "stall", Duration::from_millis(200));

        let err = client
            .send(&OutboundMessage::text("1", "hola"))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                TransportError::Timeout { timeout } if timeout == Duration::from_millis(200)
            ),
            "expected Timeout, got {err:?}"
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_generic_failure() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = client_for(
            &format!("http://127.0.0.1:{port}"),
            "1",
            REQUEST_TIMEOUT_FOR_TESTS,
        );
        let err = client
            .send(&OutboundMessage::text("1", "hola"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::RequestFailed(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_template_is_hello_world() {
        let captured = Captured::default();
        let base = fake_graph_api(captured.clone()).await;
        let client = client_for(&base, "1029384756", REQUEST_TIMEOUT_FOR_TESTS);

        send_test_template(&client, "5215550001111").await.unwrap();

        let requests = captured.requests.lock().unwrap();
        let body = &requests[0].1;
        assert_eq!(body["to"], "5215550001111");
        assert_eq!(body["template"]["name"], "hello_world");
        assert_eq!(body["template"]["language"]["code"], "en_US");
    }

    const REQUEST_TIMEOUT_FOR_TESTS: Duration = Duration::from_secs(5);
}
