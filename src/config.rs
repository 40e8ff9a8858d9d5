//! Configuration types, built from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Graph API version.
pub const DEFAULT_API_VERSION: &str = "v18.0";

/// Default Graph API host.
pub const DEFAULT_GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";

/// Fixed bound on every outbound Graph API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Template sent to first-time contacts.
pub const DEFAULT_WELCOME_TEMPLATE: &str = "mensaje_de_bienvenida";

/// Header image attached to the welcome template.
pub const DEFAULT_WELCOME_IMAGE_URL: &str =
    "https://www.rizosafrosymas.com/_next/image?url=%2Fram1.jpg&w=2048&q=75";

/// Locale used for templates unless told otherwise.
pub const DEFAULT_TEMPLATE_LANGUAGE: &str = "es";

/// Full bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub whatsapp: WhatsAppConfig,
    pub welcome: WelcomeConfig,
    pub server: ServerConfig,
    /// Directory holding the canned response files.
    pub messages_dir: PathBuf,
    /// Directory for rolling log files.
    pub log_dir: PathBuf,
}

/// Graph API credentials and endpoint settings.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub access_token: SecretString,
    pub phone_number_id: String,
    pub api_version: String,
    pub api_base_url: String,
    /// Token Meta echoes back during the webhook handshake.
    pub verify_token: SecretString,
    /// App secret for `X-Hub-Signature-256` checks. `None` disables them.
    pub app_secret: Option<SecretString>,
    /// Recipient for `send-test`.
    pub recipient_waid: Option<String>,
    pub request_timeout: Duration,
}

impl WhatsAppConfig {
    /// Create with required fields and defaults for the rest.
    pub fn new(
        access_token: impl Into<String>,
        phone_number_id: impl Into<String>,
        verify_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            phone_number_id: phone_number_id.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_base_url: DEFAULT_GRAPH_API_BASE_URL.to_string(),
            verify_token: SecretString::from(verify_token.into()),
            app_secret: None,
            recipient_waid: None,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Messages endpoint for the configured sender number.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.api_base_url.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id
        )
    }
}

/// First-contact welcome sequence.
#[derive(Debug, Clone)]
pub struct WelcomeConfig {
    pub template_name: String,
    pub language_code: String,
    pub header_image_url: Option<String>,
    /// Wait between the template and the text menu so they arrive in order.
    pub delay: Duration,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            template_name: DEFAULT_WELCOME_TEMPLATE.to_string(),
            language_code: DEFAULT_TEMPLATE_LANGUAGE.to_string(),
            header_image_url: Some(DEFAULT_WELCOME_IMAGE_URL.to_string()),
            delay: Duration::from_secs(2),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "RIZOS_BOT_HOST".into(),
                message: e.to_string(),
            })
    }
}

impl BotConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.into()));

        let mut whatsapp = WhatsAppConfig::new(
            require("ACCESS_TOKEN")?,
            require("PHONE_NUMBER_ID")?,
            require("VERIFY_TOKEN")?,
        );
        if let Some(version) = get("VERSION") {
            whatsapp.api_version = version;
        }
        if let Some(base) = get("GRAPH_API_BASE_URL") {
            whatsapp.api_base_url = base;
        }
        whatsapp.app_secret = get("APP_SECRET").map(SecretString::from);
        whatsapp.recipient_waid = get("RECIPIENT_WAID");

        let mut welcome = WelcomeConfig::default();
        if let Some(template) = get("RIZOS_BOT_WELCOME_TEMPLATE") {
            welcome.template_name = template;
        }
        if let Some(url) = get("RIZOS_BOT_WELCOME_IMAGE_URL") {
            welcome.header_image_url = Some(url);
        }
        if let Some(ms) = get("RIZOS_BOT_WELCOME_DELAY_MS") {
            welcome.delay = Duration::from_millis(parse_number("RIZOS_BOT_WELCOME_DELAY_MS", &ms)?);
        }

        let mut server = ServerConfig::default();
        if let Some(host) = get("RIZOS_BOT_HOST") {
            server.host = host;
        }
        if let Some(port) = get("RIZOS_BOT_PORT") {
            server.port = parse_number("RIZOS_BOT_PORT", &port)?;
        }

        Ok(Self {
            whatsapp,
            welcome,
            server,
            messages_dir: get("RIZOS_BOT_MESSAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("messages")),
            log_dir: get("RIZOS_BOT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        })
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
