//! Webhook signature verification.
//!
//! Verifies the `X-Hub-Signature` header (`sha1=<hex>`) against an
//! HMAC-SHA1 of the raw request body. The sender dictates the algorithm, so
//! the legacy SHA-1 scheme is the only one accepted; any other identifier
//! (including `sha256`) is reported as unsupported rather than silently
//! checked with a different hash.

use hmac::{Hmac, Mac};
use hubsync_core::{AuthError, Secret};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Longest algorithm identifier echoed back in errors and logs.
const MAX_ALGORITHM_LEN: usize = 32;

/// Keyed-hash algorithms accepted in the signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, identifier `sha1`.
    HmacSha1,
}

impl SignatureAlgorithm {
    /// Parses a header identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "sha1" => Some(Self::HmacSha1),
            _ => None,
        }
    }

    /// Identifier as it appears in the header.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::HmacSha1 => "sha1",
        }
    }

    /// Length of the lowercase hex digest.
    pub fn hex_len(self) -> usize {
        match self {
            Self::HmacSha1 => 40,
        }
    }
}

/// Parsed `<algorithm>=<hexDigest>` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    /// Validated algorithm.
    pub algorithm: SignatureAlgorithm,
    /// Digest exactly as sent; may be any length.
    pub hex_digest: &'a str,
}

impl<'a> SignatureHeader<'a> {
    /// Parses a header value, splitting on the first `=`.
    ///
    /// A value without `=` is read as a bare algorithm identifier with an
    /// empty digest.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSignature` for an absent or empty value
    /// and `AuthError::UnsupportedAlgorithm` for any identifier other than
    /// `sha1`.
    pub fn parse(value: Option<&'a str>) -> Result<Self, AuthError> {
        let value = value.filter(|v| !v.is_empty()).ok_or(AuthError::MissingSignature)?;

        let (identifier, hex_digest) = value.split_once('=').unwrap_or((value, ""));

        let algorithm = SignatureAlgorithm::from_identifier(identifier).ok_or_else(|| {
            AuthError::UnsupportedAlgorithm {
                algorithm: identifier.chars().take(MAX_ALGORITHM_LEN).collect(),
            }
        })?;

        Ok(Self { algorithm, hex_digest })
    }
}

/// Verifies a webhook signature header against the raw body.
///
/// Checks, in order: presence of the header, the algorithm identifier, and
/// finally the digest using a constant-time comparison.
///
/// # Example
///
/// ```
/// use hubsync_api::crypto::{signature_header_value, verify_signature};
/// use hubsync_core::Secret;
///
/// let secret = Secret::from("my_secret_key");
/// let body = br#"{"repository":{"name":"demo"}}"#;
/// let header = signature_header_value(secret.expose(), body);
///
/// assert!(verify_signature(&secret, body, Some(&header)).is_ok());
/// ```
///
/// # Errors
///
/// Returns `MissingSignature`, `UnsupportedAlgorithm` or
/// `SignatureMismatch`.
pub fn verify_signature(secret: &Secret, body: &[u8], header: Option<&str>) -> Result<(), AuthError> {
    let header = SignatureHeader::parse(header)?;

    let expected = generate_hmac_hex(body, secret.expose());

    if timing_safe_eq(&expected, header.hex_digest) {
        Ok(())
    } else {
        Err(AuthError::SignatureMismatch)
    }
}

/// Generates the HMAC-SHA1 of `payload` as lowercase hex.
pub fn generate_hmac_hex(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a complete `sha1=<hex>` header value for `payload`.
pub fn signature_header_value(secret: &[u8], payload: &[u8]) -> String {
    format!("{}={}", SignatureAlgorithm::HmacSha1.identifier(), generate_hmac_hex(payload, secret))
}

/// Constant-time comparison of hex digests.
///
/// The expected digest has a fixed, public length, so the length check
/// leaks nothing; the content comparison does not short-circuit on the
/// first differing byte.
fn timing_safe_eq(expected: &str, provided: &str) -> bool {
    if expected.len() != provided.len() {
        return false;
    }

    bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 2202 test case 2.
    const RFC2202_KEY: &[u8] = b"Jefe";
    const RFC2202_DATA: &[u8] = b"what do ya want for nothing?";
    const RFC2202_DIGEST: &str = "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79";

    #[test]
    fn generate_hmac_hex_matches_rfc_vector() {
        assert_eq!(generate_hmac_hex(RFC2202_DATA, RFC2202_KEY), RFC2202_DIGEST);
    }

    #[test]
    fn validate_signature_success() {
        let secret = Secret::new(RFC2202_KEY.to_vec());
        let header = format!("sha1={RFC2202_DIGEST}");

        assert_eq!(verify_signature(&secret, RFC2202_DATA, Some(&header)), Ok(()));
    }

    #[test]
    fn validate_signature_mismatch() {
        let secret = Secret::from("test_secret");
        let header = "sha1=0000000000000000000000000000000000000000";

        assert_eq!(
            verify_signature(&secret, b"test payload", Some(header)),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn validate_signature_missing() {
        let secret = Secret::from("test_secret");

        assert_eq!(verify_signature(&secret, b"x", None), Err(AuthError::MissingSignature));
        assert_eq!(verify_signature(&secret, b"x", Some("")), Err(AuthError::MissingSignature));
    }

    #[test]
    fn sha256_is_unsupported() {
        let secret = Secret::from("test_secret");
        let result = verify_signature(&secret, b"x", Some("sha256=abcdef"));

        assert_eq!(result, Err(AuthError::UnsupportedAlgorithm { algorithm: "sha256".into() }));
    }

    #[test]
    fn algorithm_checked_before_digest() {
        // A correct SHA-1 digest under the wrong identifier is still unsupported.
        let secret = Secret::new(RFC2202_KEY.to_vec());
        let header = format!("SHA1={RFC2202_DIGEST}");

        assert!(matches!(
            verify_signature(&secret, RFC2202_DATA, Some(&header)),
            Err(AuthError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn parse_splits_on_first_equals_only() {
        let parsed = SignatureHeader::parse(Some("sha1=abc=def")).unwrap();
        assert_eq!(parsed.algorithm, SignatureAlgorithm::HmacSha1);
        assert_eq!(parsed.hex_digest, "abc=def");
    }

    #[test]
    fn parse_without_equals_is_bare_algorithm() {
        let parsed = SignatureHeader::parse(Some("sha1")).unwrap();
        assert_eq!(parsed.hex_digest, "");

        assert!(matches!(
            SignatureHeader::parse(Some("deadbeef")),
            Err(AuthError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn unsupported_algorithm_is_truncated() {
        let long = format!("{}=00", "a".repeat(500));
        match SignatureHeader::parse(Some(&long)) {
            Err(AuthError::UnsupportedAlgorithm { algorithm }) => {
                assert_eq!(algorithm.len(), MAX_ALGORITHM_LEN);
            },
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn uppercase_digest_does_not_match() {
        let secret = Secret::new(RFC2202_KEY.to_vec());
        let header = format!("sha1={}", RFC2202_DIGEST.to_uppercase());

        assert_eq!(
            verify_signature(&secret, RFC2202_DATA, Some(&header)),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn truncated_digest_does_not_match() {
        let secret = Secret::new(RFC2202_KEY.to_vec());
        let header = format!("sha1={}", &RFC2202_DIGEST[..39]);

        assert_eq!(
            verify_signature(&secret, RFC2202_DATA, Some(&header)),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn header_value_helper_round_trips() {
        let header = signature_header_value(b"secret", b"body");
        assert!(header.starts_with("sha1="));
        assert_eq!(header.len(), 5 + SignatureAlgorithm::HmacSha1.hex_len());
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
}
