//! Webhook payload signature verification.
//!
//! Messenger signs the raw POST body with HMAC-SHA256 over the app secret
//! and sends it as `X-Hub-Signature-256: sha256=<hex>`. Comparison is
//! constant-time; any malformed header fails closed.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verifier for `X-Hub-Signature-256` headers.
pub struct SignatureVerifier {
    app_secret: Secret<String>,
}

impl SignatureVerifier {
    /// Creates a verifier with the given app secret.
    pub fn new(app_secret: impl Into<String>) -> Self {
        Self {
            app_secret: Secret::new(app_secret.into()),
        }
    }

    /// Verifies the header against the raw payload.
    pub fn verify(&self, payload: &[u8], header: &str) -> bool {
        let Some(hex_signature) = header.strip_prefix(SIGNATURE_PREFIX) else {
            return false;
        };
        let Ok(claimed) = hex::decode(hex_signature) else {
            return false;
        };
        constant_time_compare(&self.compute(payload), &claimed)
    }

    fn compute(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.app_secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid header value for test fixtures.
#[cfg(test)]
pub fn sign_for_tests(app_secret: &str, payload: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(payload);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "app-secret-123";

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let verifier = SignatureVerifier::new(SECRET);
        let payload = br#"{"object":"page"}"#;
        let header = sign_for_tests(SECRET, payload);
        assert!(verifier.verify(payload, &header));
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let verifier = SignatureVerifier::new(SECRET);
        let header = sign_for_tests(SECRET, br#"{"object":"page"}"#);
        assert!(!verifier.verify(br#"{"object":"evil"}"#, &header));
    }

    #[test]
    fn rejects_a_wrong_secret() {
        let verifier = SignatureVerifier::new(SECRET);
        let payload = br#"{"object":"page"}"#;
        let header = sign_for_tests("other-secret", payload);
        assert!(!verifier.verify(payload, &header));
    }

    #[test]
    fn rejects_malformed_headers() {
        let verifier = SignatureVerifier::new(SECRET);
        let payload = b"x";
        assert!(!verifier.verify(payload, "sha1=abcd"));
        assert!(!verifier.verify(payload, "sha256=not-hex"));
        assert!(!verifier.verify(payload, ""));
    }
}
