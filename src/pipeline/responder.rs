//! Turns message text into a reply body.

use tracing::info;

use super::rules::{ResponseRules, Topic};
use crate::content::{ContentStore, files};

/// A reply chosen for an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Matched topic, `None` for the default prompt.
    pub topic: Option<Topic>,
    pub body: String,
}

/// Keyword rules backed by the canned content store.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: ResponseRules,
    content: ContentStore,
}

impl Responder {
    pub fn new(rules: ResponseRules, content: ContentStore) -> Self {
        Self { rules, content }
    }

    /// Default rules over the given store.
    pub fn with_store(content: ContentStore) -> Self {
        Self::new(ResponseRules::default_rules(), content)
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Reply for `text`. Never fails: missing content becomes an error string.
    pub async fn respond(&self, text: &str) -> Reply {
        match self.rules.evaluate(text) {
            Some(topic) => {
                info!(topic = %topic, "Matched reply topic");
                Reply {
                    topic: Some(topic),
                    body: self.content.load(topic.content_file()).await,
                }
            }
            None => {
                info!("No keyword matched, sending default prompt");
                Reply {
                    topic: None,
                    body: default_reply(text),
                }
            }
        }
    }

    /// Text menu sent after the welcome template.
    pub async fn welcome_message(&self) -> String {
        self.content.load(files::WELCOME).await
    }

    /// Every file this responder can read, welcome included.
    pub fn required_files() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Topic::ALL.iter().map(|t| t.content_file()).collect();
        names.push(files::WELCOME);
        names
    }
}

/// Clarifying prompt that echoes the original text verbatim.
pub fn default_reply(original: &str) -> String {
    format!(
        "Recibí tu mensaje: '{original}'. ¿Puedes ser más específico? Escribe 'servicios' para ver lo que ofrecemos."
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    /// Responder over the shipped `messages/` directory.
    fn shipped() -> Responder {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("messages");
        Responder::with_store(ContentStore::new(dir))
    }

    #[tokio::test]
    async fn consulta_reply_mentions_consulta() {
        for text in ["consulta", "consulta capilar"] {
            let reply = shipped().respond(text).await;
            assert_eq!(reply.topic, Some(Topic::HairConsultation));
            assert!(reply.body.to_lowercase().contains("consulta"), "body: {}", reply.body);
        }
    }

    #[tokio::test]
    async fn case_variants_get_same_reply() {
        let responder = shipped();
        let lower = responder.respond("consulta").await;
        let upper = responder.respond("CONSULTA").await;
        let mixed = responder.respond("CoNsUlTa").await;
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
    }

    #[tokio::test]
    async fn unknown_text_gets_default_with_original() {
        let reply = shipped().respond("  XYZ123 Unknown ").await;
        assert_eq!(reply.topic, None);
        assert!(reply.body.contains("Recibí tu mensaje"));
        assert!(reply.body.contains("'  XYZ123 Unknown '"));
    }

    #[tokio::test]
    async fn shipped_content_covers_every_topic() {
        let responder = shipped();
        assert!(responder.content().missing(&Responder::required_files()).await.is_empty());

        for topic in Topic::ALL {
            let body = responder.content().load(topic.content_file()).await;
            assert!(!body.is_empty(), "{topic} is empty");
            assert!(!body.starts_with("Error:"), "{topic}: {body}");
        }
    }

    #[tokio::test]
    async fn shipped_reply_is_file_text_unchanged() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("messages");
        let raw = std::fs::read_to_string(dir.join("costos.txt")).unwrap();

        let reply = shipped().respond("costos").await;
        assert_eq!(reply.body, raw.trim());
        assert!(reply.body.starts_with("*Costos*"));
    }

    #[tokio::test]
    async fn shipped_welcome_is_present() {
        let welcome = shipped().welcome_message().await;
        assert!(!welcome.is_empty());
        assert!(!welcome.starts_with("Error:"));
    }

    #[tokio::test]
    async fn missing_content_degrades_to_error_string() {
        let dir = TempDir::new().unwrap();
        let responder = Responder::with_store(ContentStore::new(dir.path()));

        let reply = responder.respond("horario").await;
        assert_eq!(reply.topic, Some(Topic::Hours));
        assert_eq!(reply.body, "Error: Message file 'horario.txt' not found.");
    }

    #[tokio::test]
    async fn reply_comes_from_topic_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("costos.txt"), "Lista de precios").unwrap();
        let responder = Responder::with_store(ContentStore::new(dir.path()));

        let reply = responder.respond("¿Cuáles son los COSTOS?").await;
        assert_eq!(reply.body, "Lista de precios");
    }

    #[test]
    fn default_reply_wording() {
        assert_eq!(
            default_reply("cita"),
            "Recibí tu mensaje: 'cita'. ¿Puedes ser más específico? Escribe 'servicios' para ver lo que ofrecemos."
        );
    }
}
