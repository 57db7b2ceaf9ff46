//! Key configuration.
//!
//! The host process supplies both secrets base64-encoded at startup.
//! Absence or malformation is a fatal construction error — there is no
//! degraded mode without keys.

use crate::error::CryptoResult;
use crate::key::{SealKey, SigningSecret};

/// Key material for one process: the record encryption key and the
/// access-token signing secret.
#[derive(Clone, Debug)]
pub struct KeyConfig {
    pub seal_key: SealKey,
    pub signing_secret: SigningSecret,
}

impl KeyConfig {
    pub fn new(seal_key: SealKey, signing_secret: SigningSecret) -> Self {
        Self { seal_key, signing_secret }
    }

    /// Builds a config from the base64 values handed over by the
    /// configuration provider. Fails fast on missing or malformed input.
    pub fn from_base64(seal_key_b64: &str, signing_secret_b64: &str) -> CryptoResult<Self> {
        Ok(Self {
            seal_key: SealKey::from_base64(seal_key_b64)?,
            signing_secret: SigningSecret::from_base64(signing_secret_b64)?,
        })
    }
}
