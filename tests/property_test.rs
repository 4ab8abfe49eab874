//! Property-based tests for signature verification.
//!
//! For arbitrary bodies and secrets: the correct header verifies, any
//! single-digit mutation of it is a mismatch, foreign algorithms are
//! unsupported regardless of digest, and only the exact header is accepted.

use hubsync_api::crypto::{generate_hmac_hex, signature_header_value, verify_signature};
use hubsync_core::{AuthError, Secret};
use hubsync_testing::strategies::{
    body_strategy, foreign_algorithm_strategy, mutate_hex_digit, secret_strategy,
};
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

/// Creates property test configuration based on environment.
///
/// `PROPTEST_CASES` overrides the number of cases.
fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(64);
    ProptestConfig::with_cases(cases)
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn correct_signature_always_verifies(body in body_strategy(), secret in secret_strategy()) {
        let header = signature_header_value(secret.as_bytes(), &body);
        let key = Secret::from(secret.as_str());

        prop_assert_eq!(verify_signature(&key, &body, Some(&header)), Ok(()));
    }

    #[test]
    fn single_digit_mutation_is_mismatch(
        body in body_strategy(),
        secret in secret_strategy(),
        index in 0usize..40,
        offset in any::<u8>(),
    ) {
        let digest = generate_hmac_hex(&body, secret.as_bytes());
        let header = format!("sha1={}", mutate_hex_digit(&digest, index, offset));
        let key = Secret::from(secret.as_str());

        prop_assert_eq!(
            verify_signature(&key, &body, Some(&header)),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn foreign_algorithm_is_unsupported(
        body in body_strategy(),
        secret in secret_strategy(),
        algorithm in foreign_algorithm_strategy(),
    ) {
        // Even a correct SHA-1 digest does not rescue an unknown identifier.
        let header = format!("{algorithm}={}", generate_hmac_hex(&body, secret.as_bytes()));
        let key = Secret::from(secret.as_str());

        let is_unsupported = matches!(
            verify_signature(&key, &body, Some(&header)),
            Err(AuthError::UnsupportedAlgorithm { .. })
        );
        prop_assert!(is_unsupported);
    }

    #[test]
    fn signature_from_other_secret_is_mismatch(
        body in body_strategy(),
        secret in secret_strategy(),
        other in secret_strategy(),
    ) {
        prop_assume!(secret != other);

        let header = signature_header_value(other.as_bytes(), &body);
        let key = Secret::from(secret.as_str());

        prop_assert_eq!(
            verify_signature(&key, &body, Some(&header)),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn arbitrary_headers_never_panic(
        body in body_strategy(),
        header in "\\PC{0,128}",
    ) {
        let key = Secret::from("fixed-secret");
        let _ = verify_signature(&key, &body, Some(&header));
    }
}
