//! Outbound message envelopes for the Graph API `/messages` endpoint.

use serde::Serialize;

use crate::config::DEFAULT_TEMPLATE_LANGUAGE;

/// A message ready to be posted to `/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    messaging_product: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_type: Option<&'static str>,
    to: String,
    #[serde(flatten)]
    content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum MessageContent {
    Text { text: TextBody },
    Template { template: Template },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TextBody {
    preview_url: bool,
    body: String,
}

/// A pre-approved template, optionally with a header image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    name: String,
    language: Language,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Language {
    code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Component {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Parameter {
    Image { image: MediaLink },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MediaLink {
    link: String,
}

impl Template {
    /// Template in the default locale, no components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: Language {
                code: DEFAULT_TEMPLATE_LANGUAGE.to_string(),
            },
            components: Vec::new(),
        }
    }

    /// Override the locale.
    #[must_use]
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language.code = code.into();
        self
    }

    /// Attach (or replace) the header image.
    #[must_use]
    pub fn with_header_image(mut self, url: impl Into<String>) -> Self {
        self.components.retain(|c| c.kind != "header");
        self.components.push(Component {
            kind: "header",
            parameters: vec![Parameter::Image {
                image: MediaLink { link: url.into() },
            }],
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl OutboundMessage {
    /// Plain text message with link previews disabled.
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: Some("individual"),
            to: to.into(),
            content: MessageContent::Text {
                text: TextBody {
                    preview_url: false,
                    body: body.into(),
                },
            },
        }
    }

    /// Template message.
    pub fn template(to: impl Into<String>, template: Template) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: None,
            to: to.into(),
            content: MessageContent::Template { template },
        }
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    /// `"text"` or `"template"`.
    pub fn kind(&self) -> &'static str {
        match self.content {
            MessageContent::Text { .. } => "text",
            MessageContent::Template { .. } => "template",
        }
    }

    /// Text body, if this is a text message.
    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(&text.body),
            MessageContent::Template { .. } => None,
        }
    }

    /// Template, if this is a template message.
    pub fn template_ref(&self) -> Option<&Template> {
        match &self.content {
            MessageContent::Template { template } => Some(template),
            MessageContent::Text { .. } => None,
        }
    }

    /// Serialize to the JSON body the provider expects.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
