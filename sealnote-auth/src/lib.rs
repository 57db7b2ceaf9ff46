//! Credential, token, and session layer for Sealnote.
//!
//! Gates access to the record pipeline:
//! - Argon2id password hashing — no recoverable plaintext password is
//!   ever persisted
//! - HMAC-SHA256 signed access tokens, validated statelessly
//! - Opaque server-tracked refresh tokens with single-use rotation and
//!   revocation bookkeeping
//! - A session guard that turns a bearer credential into an
//!   authenticated principal
//!
//! # Token lifecycle
//!
//! Every refresh token moves `Active -> Rotated` (used once) or
//! `Active -> Revoked` (logout / compromise), both terminal. Replay of a
//! rotated token is treated as a theft signal: the token is rejected and
//! every active session for that subject is revoked.
//!
//! Access tokens are validated by signature and expiry alone — no store
//! lookup — so they stay valid until natural expiry even after logout.
//! That is a deliberate trade-off for stateless validation, bounded by
//! the short access-token lifetime.

mod credential;
mod error;
mod flow;
mod session;
mod token;

pub use credential::{Credential, CredentialStore, LinkOutcome};
pub use error::{AuthError, AuthResult, SessionError, TokenError};
pub use flow::{AuthFlow, LoginOutcome};
pub use session::{IdentityStore, MemoryIdentityStore, Principal, SessionGuard};
pub use token::{
    RefreshState, TokenPair, TokenService, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS,
};
