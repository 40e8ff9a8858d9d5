//! Rizos Bot: keyword-routed WhatsApp assistant for a curly-hair salon.

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod webhook;
pub mod whatsapp;
