//! Auth error types.
//!
//! Three small taxonomies: credential/flow errors, token validation
//! errors, and the typed session failures handed to routing code. All of
//! them are per-request and recoverable — nothing here crashes a caller,
//! and no variant carries secret material.

use thiserror::Error;

/// Result type for credential and flow operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors from credential handling and login/registration flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Uniform rejection for unknown subject, wrong password, and
    /// password attempts against federated-only accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A credential with neither a password digest nor a federated id.
    #[error("credential has neither password digest nor federated id")]
    InvalidCredential,

    #[error("password too short (min 8 characters)")]
    PasswordTooShort,

    #[error("login identifier already registered: {0}")]
    LoginTaken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The identity store collaborator failed.
    #[error("identity store error: {0}")]
    Storage(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Access/refresh token validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token structure could not be decoded.
    #[error("malformed token")]
    Malformed,

    /// Signature did not verify.
    #[error("bad token signature")]
    BadSignature,

    /// Signature verified but the token is past its expiry.
    #[error("token expired")]
    Expired,

    /// Refresh token is absent, expired, rotated, or revoked.
    #[error("invalid token")]
    InvalidToken,
}

/// Typed authentication failures returned to routing code by the
/// session guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no credential presented")]
    NoCredential,

    #[error("access token expired")]
    Expired,

    #[error("invalid access token")]
    Invalid,

    #[error("principal not found")]
    PrincipalNotFound,

    /// The identity store collaborator failed during resolution.
    #[error("identity lookup failed: {0}")]
    Lookup(String),
}
