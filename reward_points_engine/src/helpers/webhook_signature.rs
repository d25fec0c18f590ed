//! Webhook authenticity checks.
//!
//! Shopify signs every webhook delivery with HMAC-SHA256 over the raw request body, keyed with the app's shared
//! secret, and sends the base64-encoded MAC in the `X-Shopify-Hmac-SHA256` header. The body must be verified exactly
//! as received: re-serializing parsed JSON changes the bytes and breaks the signature.
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Computes the base64-encoded HMAC-SHA256 of `raw_body` under `shared_secret`.
pub fn calculate_webhook_signature(raw_body: &[u8], shared_secret: &str) -> String {
    keyed_mac(shared_secret, raw_body).map(|mac| base64::encode(mac.finalize().into_bytes())).unwrap_or_default()
}

/// Checks a claimed signature against the body.
///
/// A failed check is an expected outcome for untrusted traffic, so this returns `false` rather than an error, for a
/// wrong MAC and for a signature that isn't valid base64 alike. The comparison is constant-time.
pub fn verify_webhook_signature(raw_body: &[u8], provided_signature: &str, shared_secret: &str) -> bool {
    if shared_secret.is_empty() {
        warn!("🔐️ No webhook secret is configured. Every signature will be rejected.");
        return false;
    }
    let provided = match base64::decode(provided_signature.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("🔐️ Webhook signature is not valid base64. {e}");
            return false;
        },
    };
    keyed_mac(shared_secret, raw_body).is_some_and(|mac| mac.verify_slice(&provided).is_ok())
}

// HMAC accepts keys of any length, so this only returns `None` if the hmac crate changes its contract.
fn keyed_mac(shared_secret: &str, raw_body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(shared_secret.as_bytes()).ok()?;
    mac.update(raw_body);
    Some(mac)
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "459a1eb3fff01f2eaa7fd1e5d446c1cd";
    const BODY: &[u8] = br#"{"id":12345,"name":"Order Test","items":[{"product_id":67890,"quantity":2}]}"#;

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        let sig = calculate_webhook_signature(b"what do ya want for nothing?", "Jefe");
        assert_eq!(sig, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
        assert!(verify_webhook_signature(b"what do ya want for nothing?", &sig, "Jefe"));
    }

    #[test]
    fn correct_secret_verifies() {
        let sig = calculate_webhook_signature(BODY, SECRET);
        assert!(verify_webhook_signature(BODY, &sig, SECRET));
        assert!(verify_webhook_signature(BODY, &format!(" {sig}\n"), SECRET));
    }

    #[test]
    fn any_single_byte_mutation_fails() {
        let sig = calculate_webhook_signature(BODY, SECRET);
        for i in 0..BODY.len() {
            let mut body = BODY.to_vec();
            body[i] ^= 0x01;
            assert!(!verify_webhook_signature(&body, &sig, SECRET), "mutation at byte {i} was accepted");
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = calculate_webhook_signature(BODY, "not-the-secret");
        assert!(!verify_webhook_signature(BODY, &sig, SECRET));
    }

    #[test]
    fn garbage_signatures_fail() {
        assert!(!verify_webhook_signature(BODY, "", SECRET));
        assert!(!verify_webhook_signature(BODY, "not base64!!", SECRET));
        assert!(!verify_webhook_signature(BODY, "AAAA", SECRET));
    }

    #[test]
    fn empty_secret_never_verifies() {
        let sig = calculate_webhook_signature(BODY, "");
        assert!(!verify_webhook_signature(BODY, &sig, ""));
    }
}
