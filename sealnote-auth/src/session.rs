//! Request-time session contract.
//!
//! Routing code hands the guard whatever credential the carrier produced
//! (a bearer header value or equivalent); the guard returns either an
//! authenticated principal or a typed failure. Nothing is attached to
//! ambient request state — the caller carries the result forward.

use crate::credential::Credential;
use crate::error::{AuthError, AuthResult, SessionError, TokenError};
use crate::token::TokenService;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// An authenticated subject as resolved by the identity store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Principal {
    pub subject_id: String,
    pub login_id: String,
    pub display_name: String,
}

/// Identity store seam.
///
/// Resolves subject ids to principals and login identifiers to
/// credentials; assumed to enforce uniqueness of the login identifier.
pub trait IdentityStore: Send + Sync {
    fn find_principal(&self, subject_id: &str) -> AuthResult<Option<Principal>>;

    /// Resolves a login identifier to `(subject_id, credential)`.
    fn find_credential(&self, login_id: &str) -> AuthResult<Option<(String, Credential)>>;

    fn find_subject_by_federated(&self, federated_id: &str) -> AuthResult<Option<String>>;

    /// Creates a subject and returns its id. Rejects duplicate login
    /// identifiers and unusable credentials.
    fn create_subject(
        &self,
        login_id: &str,
        display_name: &str,
        credential: Credential,
    ) -> AuthResult<String>;

    /// Attaches a federated id to an existing subject (account linking).
    fn link_federated(&self, subject_id: &str, federated_id: &str) -> AuthResult<()>;
}

#[derive(Clone, Debug)]
struct SubjectRow {
    subject_id: String,
    login_id: String,
    display_name: String,
    credential: Credential,
}

/// In-memory identity store for tests and embedding.
#[derive(Default)]
pub struct MemoryIdentityStore {
    subjects: RwLock<HashMap<String, SubjectRow>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn find_principal(&self, subject_id: &str) -> AuthResult<Option<Principal>> {
        let subjects = self.subjects.read().unwrap();
        Ok(subjects.get(subject_id).map(|row| Principal {
            subject_id: row.subject_id.clone(),
            login_id: row.login_id.clone(),
            display_name: row.display_name.clone(),
        }))
    }

    fn find_credential(&self, login_id: &str) -> AuthResult<Option<(String, Credential)>> {
        let subjects = self.subjects.read().unwrap();
        Ok(subjects
            .values()
            .find(|row| row.login_id == login_id)
            .map(|row| (row.subject_id.clone(), row.credential.clone())))
    }

    fn find_subject_by_federated(&self, federated_id: &str) -> AuthResult<Option<String>> {
        let subjects = self.subjects.read().unwrap();
        Ok(subjects
            .values()
            .find(|row| row.credential.federated_id.as_deref() == Some(federated_id))
            .map(|row| row.subject_id.clone()))
    }

    fn create_subject(
        &self,
        login_id: &str,
        display_name: &str,
        credential: Credential,
    ) -> AuthResult<String> {
        if !credential.is_usable() {
            return Err(AuthError::InvalidCredential);
        }

        let mut subjects = self.subjects.write().unwrap();
        if subjects.values().any(|row| row.login_id == login_id) {
            return Err(AuthError::LoginTaken(login_id.to_string()));
        }

        let subject_id = Uuid::new_v4().to_string();
        subjects.insert(
            subject_id.clone(),
            SubjectRow {
                subject_id: subject_id.clone(),
                login_id: login_id.to_string(),
                display_name: display_name.to_string(),
                credential,
            },
        );
        Ok(subject_id)
    }

    fn link_federated(&self, subject_id: &str, federated_id: &str) -> AuthResult<()> {
        let mut subjects = self.subjects.write().unwrap();
        let row = subjects
            .get_mut(subject_id)
            .ok_or_else(|| AuthError::Storage(format!("unknown subject: {subject_id}")))?;
        row.credential.federated_id = Some(federated_id.to_string());
        Ok(())
    }
}

/// Turns a bearer credential into an authenticated principal.
pub struct SessionGuard {
    tokens: Arc<TokenService>,
    identities: Arc<dyn IdentityStore>,
}

impl SessionGuard {
    pub fn new(tokens: Arc<TokenService>, identities: Arc<dyn IdentityStore>) -> Self {
        Self { tokens, identities }
    }

    /// Authenticates an optional bearer value.
    ///
    /// Accepts either the raw token or an RFC 6750 `Bearer <token>`
    /// value; the carrier mechanism itself is the caller's concern.
    pub fn authenticate(&self, bearer: Option<&str>) -> Result<Principal, SessionError> {
        let raw = bearer.ok_or(SessionError::NoCredential)?;
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(SessionError::NoCredential);
        }

        let subject_id = self.tokens.validate_access(token).map_err(|e| match e {
            TokenError::Expired => SessionError::Expired,
            _ => SessionError::Invalid,
        })?;

        self.identities
            .find_principal(&subject_id)
            .map_err(|e| SessionError::Lookup(e.to_string()))?
            .ok_or(SessionError::PrincipalNotFound)
    }
}
