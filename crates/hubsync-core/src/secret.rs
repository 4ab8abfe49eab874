//! Sensitive byte strings scoped to a single request.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};

/// Opaque secret material such as the webhook signing secret or an API
/// token.
///
/// The bytes are zeroized on drop. `Secret` is neither `Clone` nor
/// comparable, and its `Debug` output never contains the material itself.
///
/// # Example
///
/// ```
/// use hubsync_core::Secret;
///
/// let secret = Secret::from("s3cr3t");
/// assert_eq!(secret.expose(), b"s3cr3t");
/// assert_eq!(format!("{secret:?}"), "Secret([REDACTED])");
/// ```
pub struct Secret(SecretBox<[u8]>);

impl Secret {
    /// Wraps raw bytes as a secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(SecretBox::new(bytes.into().into_boxed_slice()))
    }

    /// Returns the secret bytes.
    ///
    /// Callers must not log or persist the returned slice.
    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Returns `true` if the secret holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}
