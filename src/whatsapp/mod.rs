//! WhatsApp Cloud API plumbing.
//!
//! - `payload` — inbound webhook validation and extraction
//! - `envelope` — outbound text/template envelopes
//! - `client` — Graph API transport (`MessageSender`)
//! - `signature` — `X-Hub-Signature-256` verification

pub mod client;
pub mod envelope;
pub mod payload;
pub mod signature;

pub use client::{MessageSender, SendReceipt, WhatsAppClient};
pub use envelope::{OutboundMessage, Template};
pub use payload::{extract_message, is_status_update, is_valid_message_event};
