#![no_main]

//! Fuzz target for webhook signature validation.
//!
//! Splits the input into a header value, a secret and a body and runs the
//! verifier over them. Verification must never panic, and a header built
//! from the same secret and body must always verify.

use hubsync_api::crypto::{signature_header_value, verify_signature, SignatureHeader};
use hubsync_core::Secret;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    fuzz_signature_validation(data);
});

fn fuzz_signature_validation(data: &[u8]) {
    let (header, rest) = split_at_byte(data, 0);
    let (secret, body) = split_at_byte(rest, 0);

    let secret = Secret::new(secret.to_vec());

    if let Ok(header) = std::str::from_utf8(header) {
        let _ = SignatureHeader::parse(Some(header));
        let _ = verify_signature(&secret, body, Some(header));
    }

    let valid = signature_header_value(secret.expose(), body);
    assert!(verify_signature(&secret, body, Some(&valid)).is_ok());
}

fn split_at_byte(data: &[u8], separator: u8) -> (&[u8], &[u8]) {
    match data.iter().position(|&b| b == separator) {
        Some(index) => (&data[..index], &data[index + 1..]),
        None => (data, &[]),
    }
}
