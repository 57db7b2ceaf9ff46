//! Registration, login, and federated-identity flows.
//!
//! Composes the credential store, token service, and identity store.
//! All password failures surface as the uniform
//! [`AuthError::InvalidCredentials`] so callers cannot distinguish
//! unknown accounts from wrong passwords.

use crate::credential::{Credential, CredentialStore, LinkOutcome};
use crate::error::{AuthError, AuthResult};
use crate::session::IdentityStore;
use crate::token::{TokenPair, TokenService};
use std::sync::Arc;
use tracing::debug;

const MIN_PASSWORD_LEN: usize = 8;

/// A successful registration or login.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub subject_id: String,
    pub tokens: TokenPair,
}

/// Login, registration, logout, and federated linking.
pub struct AuthFlow {
    credentials: CredentialStore,
    tokens: Arc<TokenService>,
    identities: Arc<dyn IdentityStore>,
}

impl AuthFlow {
    pub fn new(
        credentials: CredentialStore,
        tokens: Arc<TokenService>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            identities,
        }
    }

    /// Registers a password account and issues its first token pair.
    pub fn register(
        &self,
        login_id: &str,
        display_name: &str,
        password: &str,
    ) -> AuthResult<LoginOutcome> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let digest = self.credentials.hash_password(password)?;
        let subject_id = self.identities.create_subject(
            login_id,
            display_name,
            Credential::from_password_digest(digest),
        )?;

        debug!(subject_id = %subject_id, "subject registered");
        Ok(LoginOutcome {
            tokens: self.tokens.issue_pair(&subject_id),
            subject_id,
        })
    }

    /// Password login.
    ///
    /// Unknown login, wrong password, and federated-only accounts (no
    /// password digest) all fail with the same error.
    pub fn login(&self, login_id: &str, password: &str) -> AuthResult<LoginOutcome> {
        let Some((subject_id, credential)) = self.identities.find_credential(login_id)? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .credentials
            .verify_password(password, credential.password_digest.as_deref())
        {
            return Err(AuthError::InvalidCredentials);
        }

        debug!(subject_id = %subject_id, "password login");
        Ok(LoginOutcome {
            tokens: self.tokens.issue_pair(&subject_id),
            subject_id,
        })
    }

    /// Rotates a refresh token into a new pair.
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        Ok(self.tokens.refresh(refresh_token)?)
    }

    /// Logout: revokes every active refresh token for the subject.
    pub fn logout(&self, subject_id: &str) {
        self.tokens.revoke_all(subject_id);
    }

    /// Resolves a federated identity: match by provider id, else match by
    /// email, else create a new account. Returns the tokens plus the
    /// tagged outcome of the three-way decision.
    pub fn federated_login(
        &self,
        federated_id: &str,
        email: &str,
        display_name: &str,
    ) -> AuthResult<(LoginOutcome, LinkOutcome)> {
        let (subject_id, outcome) =
            if let Some(subject_id) = self.identities.find_subject_by_federated(federated_id)? {
                (subject_id, LinkOutcome::Linked)
            } else if let Some((subject_id, _)) = self.identities.find_credential(email)? {
                self.identities.link_federated(&subject_id, federated_id)?;
                (subject_id, LinkOutcome::Matched)
            } else {
                let subject_id = self.identities.create_subject(
                    email,
                    display_name,
                    Credential::federated(federated_id),
                )?;
                (subject_id, LinkOutcome::Created)
            };

        debug!(subject_id = %subject_id, ?outcome, "federated login");
        Ok((
            LoginOutcome {
                tokens: self.tokens.issue_pair(&subject_id),
                subject_id,
            },
            outcome,
        ))
    }
}
