//! Payload signature verification.
//!
//! Signed payloads carry an HMAC-SHA256 hex signature after a `~` delimiter:
//! `/api/signal/<payload>~<signature>.gif`. Verification compares the suffix
//! against the keyed hash of the payload in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Delimiter separating the payload from its signature suffix.
pub const SIGNATURE_DELIMITER: char = '~';

/// Result of signature validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the signature is valid.
    pub is_valid: bool,
    /// Error message if validation failed.
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn valid() -> Self {
        Self { is_valid: true, error_message: None }
    }

    /// Creates a failed validation result with error message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, error_message: Some(message.into()) }
    }
}

/// Validates a payload signature using HMAC-SHA256.
///
/// The expected signature is the lowercase hex HMAC-SHA256 of the payload
/// bytes under the shared secret. Comparison is timing-safe.
///
/// # Example
///
/// ```
/// use beacon::crypto::{generate_hmac_hex, validate_signature};
///
/// let signature = generate_hmac_hex(b"Hello", "my_secret_key");
/// let result = validate_signature(b"Hello", &signature, "my_secret_key");
/// assert!(result.is_valid);
/// ```
pub fn validate_signature(payload: &[u8], signature: &str, secret: &str) -> ValidationResult {
    if signature.is_empty() {
        return ValidationResult::invalid("signature is empty");
    }

    if secret.is_empty() {
        return ValidationResult::invalid("secret key is empty");
    }

    let expected_signature = generate_hmac_hex(payload, secret);

    if timing_safe_eq(&signature.to_ascii_lowercase(), &expected_signature) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid("signature mismatch")
    }
}

/// Generates an HMAC-SHA256 signature as a lowercase hex string.
pub fn generate_hmac_hex(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");

    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Timing-safe string comparison to prevent timing attacks.
///
/// Uses constant-time comparison to avoid leaking information
/// about the expected signature through timing analysis.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_signature_success() {
        let payload = b"test payload";
        let secret = "test_secret";

        let signature = generate_hmac_hex(payload, secret);

        let result = validate_signature(payload, &signature, secret);
        assert!(result.is_valid);
        assert!(result.error_message.is_none());
    }

    #[test]
    fn validate_signature_accepts_uppercase_hex() {
        let payload = b"test payload";
        let secret = "test_secret";

        let signature = generate_hmac_hex(payload, secret).to_ascii_uppercase();

        let result = validate_signature(payload, &signature, secret);
        assert!(result.is_valid);
    }

    #[test]
    fn validate_signature_mismatch() {
        let payload = b"test payload";
        let signature = generate_hmac_hex(b"different payload", "test_secret");

        let result = validate_signature(payload, &signature, "test_secret");
        assert!(!result.is_valid);
        assert_eq!(result.error_message.unwrap(), "signature mismatch");
    }

    #[test]
    fn validate_signature_empty() {
        let result = validate_signature(b"test payload", "", "test_secret");
        assert!(!result.is_valid);
        assert_eq!(result.error_message.unwrap(), "signature is empty");
    }

    #[test]
    fn validate_signature_wrong_secret() {
        let payload = b"test payload";
        let signature = generate_hmac_hex(payload, "secret_a");

        let result = validate_signature(payload, &signature, "secret_b");
        assert!(!result.is_valid);
    }

    #[test]
    fn timing_safe_eq_same() {
        assert!(timing_safe_eq("hello", "hello"));
    }

    #[test]
    fn timing_safe_eq_different() {
        assert!(!timing_safe_eq("hello", "world"));
    }

    #[test]
    fn timing_safe_eq_different_length() {
        assert!(!timing_safe_eq("hello", "hello_world"));
    }

    #[test]
    fn generate_hmac_hex_consistent() {
        let payload = b"test payload";
        let secret = "secret";

        let sig1 = generate_hmac_hex(payload, secret);
        let sig2 = generate_hmac_hex(payload, secret);

        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64); // SHA256 hex is 64 chars
    }
}
