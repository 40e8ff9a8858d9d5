//! Message intake: welcome first-time contacts, then answer the message.

use std::sync::Arc;

use tracing::{error, info};

use super::greeting::GreetingTracker;
use super::responder::Responder;
use super::rules::Topic;
use super::types::InboundMessage;
use crate::config::WelcomeConfig;
use crate::whatsapp::{MessageSender, OutboundMessage, Template};

/// What happened while processing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// The welcome sequence was sent (first contact).
    pub welcomed: bool,
    /// Topic of the reply, `None` for the default prompt.
    pub topic: Option<Topic>,
    /// Sends the provider did not accept.
    pub failed_sends: usize,
}

/// Runs the welcome flow and keyword reply for each inbound message.
pub struct MessageProcessor {
    sender: Arc<dyn MessageSender>,
    tracker: Arc<GreetingTracker>,
    responder: Arc<Responder>,
    welcome: WelcomeConfig,
}

impl MessageProcessor {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        tracker: Arc<GreetingTracker>,
        responder: Arc<Responder>,
        welcome: WelcomeConfig,
    ) -> Self {
        Self {
            sender,
            tracker,
            responder,
            welcome,
        }
    }

    pub fn tracker(&self) -> &GreetingTracker {
        &self.tracker
    }

    /// Process one message to completion. Send failures are logged and
    /// counted; later steps still run.
    pub async fn process(&self, message: &InboundMessage) -> ProcessOutcome {
        info!(
            wa_id = %message.wa_id,
            name = %message.name,
            message_id = message.message_id.as_deref().unwrap_or(""),
            "Processing inbound message"
        );

        let mut failed_sends = 0;

        let welcomed = self.tracker.should_greet(&message.wa_id);
        if welcomed {
            info!(wa_id = %message.wa_id, "Sending welcome messages to new contact");
            failed_sends += self.send_welcome(&message.wa_id).await;
        }

        let reply = self.responder.respond(&message.body).await;
        if !self
            .deliver(&OutboundMessage::text(&message.wa_id, reply.body), "reply")
            .await
        {
            failed_sends += 1;
        }

        ProcessOutcome {
            welcomed,
            topic: reply.topic,
            failed_sends,
        }
    }

    /// Template with header image, fixed wait, then the text menu.
    /// Returns the number of failed sends.
    async fn send_welcome(&self, wa_id: &str) -> usize {
        let mut template =
            Template::new(&self.welcome.template_name).with_language(&self.welcome.language_code);
        if let Some(url) = &self.welcome.header_image_url {
            template = template.with_header_image(url);
        }

        let mut failed = 0;
        if !self
            .deliver(&OutboundMessage::template(wa_id, template), "welcome template")
            .await
        {
            failed += 1;
        }

        // Lets the template land before the menu; not a retry.
        if !self.welcome.delay.is_zero() {
            tokio::time::sleep(self.welcome.delay).await;
        }

        let menu = self.responder.welcome_message().await;
        if !self
            .deliver(&OutboundMessage::text(wa_id, menu), "welcome menu")
            .await
        {
            failed += 1;
        }
        failed
    }

    async fn deliver(&self, message: &OutboundMessage, what: &str) -> bool {
        match self.sender.send(message).await {
            Ok(receipt) => {
                info!(to = %message.to(), what, status = receipt.status, "Message sent");
                true
            }
            Err(e) => {
                error!(to = %message.to(), what, error = %e, "Message send failed");
                false
            }
        }
    }
}
