//! Inbound webhook payloads.
//!
//! Validation works on the raw `serde_json::Value` with "present and
//! non-empty" checks, so a payload is accepted or rejected before any typed
//! extraction runs.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::WebhookError;
use crate::pipeline::types::InboundMessage;

/// Present and non-empty: not null, not `false`, not `0`, not `""`, `[]` or `{}`.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn first_change_value(body: &Value) -> Option<&Value> {
    body.get("entry")?
        .get(0)?
        .get("changes")?
        .get(0)?
        .get("value")
}

/// Whether the body has the minimal shape of a message notification:
/// `object`, `entry`, `entry[0].changes`, `changes[0].value`,
/// `value.messages` and `messages[0]` all present and non-empty.
pub fn is_valid_message_event(body: &Value) -> bool {
    if !is_present(body.get("object")) || !is_present(body.get("entry")) {
        return false;
    }
    let Some(entry) = body.get("entry").and_then(|e| e.get(0)) else {
        return false;
    };
    if !is_present(entry.get("changes")) {
        return false;
    }
    let value = entry.get("changes").and_then(|c| c.get(0)).and_then(|c| c.get("value"));
    if !is_present(value) {
        return false;
    }
    let messages = value.and_then(|v| v.get("messages"));
    is_present(messages) && is_present(messages.and_then(|m| m.get(0)))
}

/// Whether the body is a delivery/read status notification.
pub fn is_status_update(body: &Value) -> bool {
    is_present(first_change_value(body).and_then(|v| v.get("statuses")))
}

#[derive(Debug, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    wa_id: String,
    #[serde(default)]
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    message_type: Option<String>,
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    body: String,
}

/// Pull the sender and text out of `entry[0].changes[0].value`.
///
/// Call after [`is_valid_message_event`]. Non-text messages yield
/// `WebhookError::UnsupportedMessage`.
pub fn extract_message(body: &Value) -> Result<InboundMessage, WebhookError> {
    let value = first_change_value(body).ok_or(WebhookError::NotAMessageEvent)?;
    // Well-formed JSON in an unexpected shape is not a message event.
    let value = ChangeValue::deserialize(value).map_err(|e| {
        debug!(error = %e, "Message event has unexpected shape");
        WebhookError::NotAMessageEvent
    })?;

    let contact = value
        .contacts
        .into_iter()
        .next()
        .ok_or(WebhookError::NotAMessageEvent)?;
    let message = value
        .messages
        .into_iter()
        .next()
        .ok_or(WebhookError::NotAMessageEvent)?;

    let Some(text) = message.text else {
        return Err(WebhookError::UnsupportedMessage(
            message.message_type.unwrap_or_else(|| "unknown".to_string()),
        ));
    };

    Ok(InboundMessage {
        wa_id: contact.wa_id,
        name: contact.profile.and_then(|p| p.name).unwrap_or_default(),
        message_id: message.id,
        body: text.body,
    })
}
