//! Pipeline types.

/// A text message pulled out of a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender's WhatsApp ID.
    pub wa_id: String,
    /// Profile display name (may be empty).
    pub name: String,
    /// Provider message ID, when present.
    pub message_id: Option<String>,
    /// Text body as typed by the sender.
    pub body: String,
}

impl InboundMessage {
    pub fn new(wa_id: impl Into<String>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            wa_id: wa_id.into(),
            name: name.into(),
            message_id: None,
            body: body.into(),
        }
    }
}
