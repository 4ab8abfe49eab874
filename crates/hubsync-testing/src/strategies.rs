//! proptest strategies for signature properties.

use proptest::{collection::vec, prelude::*};

/// Arbitrary request bodies, including empty and non-UTF-8 ones.
pub fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..2048)
}

/// Non-empty printable secrets.
pub fn secret_strategy() -> impl Strategy<Value = String> {
    "[!-~]{1,64}"
}

/// Header algorithm identifiers other than `sha1`.
pub fn foreign_algorithm_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sha256".to_string()),
        Just("sha512".to_string()),
        Just("SHA1".to_string()),
        Just("md5".to_string()),
        "[a-z0-9]{1,12}".prop_filter("must not be sha1", |s| s != "sha1"),
    ]
}

/// Replaces the hex digit at `index` with a different lowercase hex digit.
pub fn mutate_hex_digit(digest: &str, index: usize, offset: u8) -> String {
    const HEX: &[u8] = b"0123456789abcdef";

    let mut bytes = digest.as_bytes().to_vec();
    let index = index % bytes.len();
    let current = HEX.iter().position(|&c| c == bytes[index]).unwrap_or(0);
    // offset in 1..16 guarantees a different digit
    let shift = usize::from(offset % 15) + 1;
    bytes[index] = HEX[(current + shift) % HEX.len()];

    String::from_utf8_lossy(&bytes).into_owned()
}
