#![no_main]

//! Fuzz target for best-effort payload inspection.
//!
//! The repository name is read from arbitrary, possibly hostile bodies for
//! logging only; reading it must never panic and never alter the body that
//! signature verification sees.

use bytes::Bytes;
use http::HeaderMap;
use hubsync_core::WebhookRequest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let request = WebhookRequest::new(HeaderMap::new(), Bytes::copy_from_slice(data));

    let _ = request.repository_name();

    assert_eq!(request.body(), data);
});
