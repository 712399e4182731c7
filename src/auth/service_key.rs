// Shared internal-service-key handling

use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// The static secret every service attaches to inter-service calls.
///
/// Comparison hashes both sides first so neither the content nor the
/// length of the configured key leaks through timing.
#[derive(Clone)]
pub struct ServiceKey {
    value: String,
    digest: [u8; 32],
}

impl ServiceKey {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let digest = Self::digest(&value);
        Self { value, digest }
    }

    /// Constant-time check of a presented header value
    pub fn matches(&self, presented: &str) -> bool {
        let presented = Self::digest(presented);
        self.digest[..].ct_eq(&presented[..]).into()
    }

    /// Raw value, for attaching to outbound requests only
    pub fn expose(&self) -> &str {
        &self.value
    }

    fn digest(value: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        hasher.finalize().into()
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey").field("value", &"<REDACTED>").finish()
    }
}
