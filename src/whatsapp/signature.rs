//! Webhook payload signature verification (HMAC-SHA256 with the app secret).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Header Meta signs webhook deliveries with.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Check `header` (`sha256=<hex>`) against the HMAC of the raw request body.
pub fn verify_signature(
    app_secret: &str,
    payload: &[u8],
    header: Option<&str>,
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(WebhookError::InvalidSignature)?;
    let expected = hex::decode(hex_sig).map_err(|_| WebhookError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(payload);

    // verify_slice compares in constant time
    mac.verify_slice(&expected).map_err(|_| {
        warn!("Webhook signature verification failed");
        WebhookError::InvalidSignature
    })?;

    debug!("Webhook signature verified");
    Ok(())
}

/// Compute the header value Meta would send for `payload`.
pub fn sign(app_secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "app-secret";
    const BODY: &[u8] = br#"{"object":"whatsapp_business_account"}"#;

    #[test]
    fn accepts_valid_signature() {
        let header = sign(SECRET, BODY);
        assert!(header.starts_with("sha256="));
        assert!(verify_signature(SECRET, BODY, Some(&header)).is_ok());
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        let header = sign("Jefe", b"what do ya want for nothing?");
        assert_eq!(
            header,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            verify_signature(SECRET, BODY, None),
            Err(WebhookError::MissingSignature)
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = sign("other-secret", BODY);
        assert!(matches!(
            verify_signature(SECRET, BODY, Some(&header)),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_tampered_body() {
        let header = sign(SECRET, BODY);
        assert!(verify_signature(SECRET, b"{}", Some(&header)).is_err());
    }

    #[test]
    fn rejects_missing_prefix_and_bad_hex() {
        let header = sign(SECRET, BODY);
        let bare = header.trim_start_matches("sha256=");
        assert!(verify_signature(SECRET, BODY, Some(bare)).is_err());
        assert!(verify_signature(SECRET, BODY, Some("sha256=zz-not-hex")).is_err());
    }
}
