//! Password hashing and credential material.
//!
//! Argon2id with a fresh salt per hash; the PHC string embeds salt and
//! work-factor parameters so verification needs nothing but the digest.
//! Deliberately slow — this is for password checking only, never for
//! content integrity (the digest module owns that and is orders of
//! magnitude faster).

use crate::error::{AuthError, AuthResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

/// One user's authentication material.
///
/// Normally exactly one of the two fields is populated; both are set
/// when a password account and a federated identity were linked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Credential {
    /// PHC-format Argon2id digest. Absent for federated-only identities.
    pub password_digest: Option<String>,
    /// External-identity marker (provider subject id).
    pub federated_id: Option<String>,
}

impl Credential {
    pub fn from_password_digest(digest: String) -> Self {
        Self {
            password_digest: Some(digest),
            federated_id: None,
        }
    }

    pub fn federated(federated_id: &str) -> Self {
        Self {
            password_digest: None,
            federated_id: Some(federated_id.to_string()),
        }
    }

    /// A credential with neither field is invalid and must be rejected
    /// at construction time by whoever stores it.
    pub fn is_usable(&self) -> bool {
        self.password_digest.is_some() || self.federated_id.is_some()
    }
}

/// Outcome of resolving a federated identity against existing accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// The provider id was already attached to an account.
    Linked,
    /// No provider match, but the email matched an existing account;
    /// the provider id has now been attached to it.
    Matched,
    /// Neither matched; a new account was created.
    Created,
}

/// One-way password hashing and verification.
pub struct CredentialStore {
    argon: Argon2<'static>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Library-default Argon2id parameters: sub-second interactive login,
    /// offline brute force still expensive.
    pub fn new() -> Self {
        Self {
            argon: Argon2::default(),
        }
    }

    /// Custom work factor (memory KiB, iterations, parallelism) for
    /// deployments that tune login latency.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> AuthResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a password with a fresh random salt. Two calls on the same
    /// password produce different digests; both verify.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verifies a password against an optional stored digest.
    ///
    /// Never errors: a malformed digest and an absent digest
    /// (federated-only account) both deterministically return false.
    pub fn verify_password(&self, password: &str, digest: Option<&str>) -> bool {
        let Some(digest) = digest else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
