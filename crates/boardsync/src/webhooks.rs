//! Webhook signature verification and header parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a GitHub webhook signature using HMAC-SHA256.
///
/// # Arguments
/// * `body` - Raw webhook body bytes
/// * `signature` - Value of the `X-Hub-Signature-256` header
///   (`sha256=<hex>`)
/// * `secret` - Webhook signing secret
///
/// # Returns
/// `true` if signature is valid, `false` otherwise
#[must_use]
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let Ok(signature_bytes) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    // Constant-time comparison to prevent timing attacks
    computed.as_slice().ct_eq(&signature_bytes).into()
}

/// Parsed webhook headers
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    /// Unique delivery ID
    pub delivery_id: Option<String>,
    /// Event type
    pub event_type: Option<String>,
    /// HMAC signature
    pub signature: Option<String>,
}

impl WebhookHeaders {
    /// Parse headers from a request
    #[must_use]
    pub fn from_header_map(get_header: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            delivery_id: get_header("x-github-delivery"),
            event_type: get_header("x-github-event"),
            signature: get_header("x-hub-signature-256"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_verify_webhook_signature_valid() {
        let body = b"test payload";
        let secret = "test-secret";
        let signature = sign(body, secret);

        assert!(verify_webhook_signature(body, &signature, secret));
    }

    #[test]
    fn test_verify_webhook_signature_invalid() {
        let body = b"test payload";
        let secret = "test-secret";
        let wrong_signature =
            "sha256=0000000000000000000000000000000000000000000000000000000000000000";

        assert!(!verify_webhook_signature(body, wrong_signature, secret));
    }

    #[test]
    fn test_verify_webhook_signature_missing_prefix() {
        let body = b"test payload";
        let secret = "test-secret";

        // Valid digest but without the sha256= scheme prefix
        let unprefixed = sign(body, secret).trim_start_matches("sha256=").to_string();
        assert!(!verify_webhook_signature(body, &unprefixed, secret));
    }

    #[test]
    fn test_verify_webhook_signature_malformed() {
        let body = b"test payload";
        let secret = "test-secret";

        // Not valid hex
        assert!(!verify_webhook_signature(body, "sha256=not-hex", secret));
    }

    #[test]
    fn test_headers_from_header_map() {
        let headers = WebhookHeaders::from_header_map(|name| match name {
            "x-github-delivery" => Some("delivery-1".to_string()),
            "x-github-event" => Some("issues".to_string()),
            _ => None,
        });

        assert_eq!(headers.delivery_id.as_deref(), Some("delivery-1"));
        assert_eq!(headers.event_type.as_deref(), Some("issues"));
        assert!(headers.signature.is_none());
    }
}
