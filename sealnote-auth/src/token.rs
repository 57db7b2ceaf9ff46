//! Access and refresh token lifecycle.
//!
//! Access tokens are HMAC-SHA256 signed JSON payloads
//! (`base64url(payload).base64url(mac)`), validated statelessly by
//! signature and expiry alone. Refresh tokens are opaque random strings
//! tracked server-side so rotation and revocation stay trivial to audit.
//!
//! The refresh store is the only shared mutable state in the core. Every
//! mutation holds the write lock across the whole check-and-transition,
//! so two callers racing on the same refresh token serialize: exactly one
//! rotates it, the other observes the consumed state.

use crate::error::TokenError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::RwLock;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Access token lifetime: short, because validation is stateless and
/// revocation cannot reach tokens already issued.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Refresh token lifetime.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims carried inside a signed access token.
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Refresh token state machine. Both non-active states are terminal —
/// no transition leaves a token re-usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Active,
    /// Consumed by a successful refresh.
    Rotated,
    /// Invalidated by logout or compromise response.
    Revoked,
}

#[derive(Clone, Debug)]
struct RefreshRecord {
    subject_id: String,
    state: RefreshState,
    expires_at: DateTime<Utc>,
}

/// Tokens issued at registration, login, and refresh.
#[derive(Clone, Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, validates, rotates, and revokes bearer tokens.
pub struct TokenService {
    secret: sealnote_crypto::SigningSecret,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_store: RwLock<HashMap<String, RefreshRecord>>,
}

impl TokenService {
    pub fn new(secret: sealnote_crypto::SigningSecret) -> Self {
        Self::with_ttls(secret, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS)
    }

    /// Custom lifetimes, mainly for tests exercising expiry.
    pub fn with_ttls(
        secret: sealnote_crypto::SigningSecret,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            secret,
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
            refresh_store: RwLock::new(HashMap::new()),
        }
    }

    // ── Access tokens ──

    /// Issues a signed access token for a subject.
    pub fn issue_access_token(&self, subject_id: &str) -> String {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: subject_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let payload = serde_json::to_vec(&claims).expect("claims serialize");
        let mac = self.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(mac)
        )
    }

    /// Validates an access token and returns its subject id.
    ///
    /// Signature first (constant-time compare), claims parsed only after
    /// the signature holds, then expiry. Never consults the refresh
    /// store.
    pub fn validate_access(&self, token: &str) -> Result<String, TokenError> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let provided_mac = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| TokenError::Malformed)?;

        let expected_mac = self.sign(&payload);
        if provided_mac.ct_eq(expected_mac.as_slice()).unwrap_u8() != 1 {
            return Err(TokenError::BadSignature);
        }

        let claims: AccessClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    // ── Refresh tokens ──

    /// Issues an opaque refresh token and records it as `Active`.
    pub fn issue_refresh_token(&self, subject_id: &str) -> String {
        let mut store = self.refresh_store.write().unwrap();
        Self::issue_refresh_locked(&mut store, subject_id, self.refresh_ttl)
    }

    /// Issues a full access + refresh pair.
    pub fn issue_pair(&self, subject_id: &str) -> TokenPair {
        TokenPair {
            access_token: self.issue_access_token(subject_id),
            refresh_token: self.issue_refresh_token(subject_id),
        }
    }

    /// Rotates a refresh token: the old token is consumed and a new pair
    /// is issued atomically.
    ///
    /// Absent, expired, or revoked tokens fail with
    /// [`TokenError::InvalidToken`]. Replay of an already-rotated token
    /// additionally revokes every active session for that subject —
    /// a rotated token coming back means someone holds a stolen copy.
    pub fn refresh(&self, old_refresh_token: &str) -> Result<TokenPair, TokenError> {
        let mut store = self.refresh_store.write().unwrap();

        let record = store
            .get_mut(old_refresh_token)
            .ok_or(TokenError::InvalidToken)?;

        match record.state {
            RefreshState::Active => {}
            RefreshState::Rotated => {
                let subject_id = record.subject_id.clone();
                warn!(
                    subject_id = %subject_id,
                    "rotated refresh token replayed; revoking all sessions"
                );
                Self::revoke_all_locked(&mut store, &subject_id);
                return Err(TokenError::InvalidToken);
            }
            RefreshState::Revoked => return Err(TokenError::InvalidToken),
        }

        if record.expires_at <= Utc::now() {
            return Err(TokenError::InvalidToken);
        }

        record.state = RefreshState::Rotated;
        let subject_id = record.subject_id.clone();

        let refresh_token = Self::issue_refresh_locked(&mut store, &subject_id, self.refresh_ttl);
        drop(store);

        debug!(subject_id = %subject_id, "refresh token rotated");
        Ok(TokenPair {
            access_token: self.issue_access_token(&subject_id),
            refresh_token,
        })
    }

    /// Marks every active refresh token for a subject `Revoked`. Used on
    /// logout and on detected compromise. Outstanding access tokens are
    /// unaffected (stateless validation trade-off).
    pub fn revoke_all(&self, subject_id: &str) {
        let mut store = self.refresh_store.write().unwrap();
        let revoked = Self::revoke_all_locked(&mut store, subject_id);
        debug!(subject_id = %subject_id, revoked, "revoked all refresh tokens");
    }

    /// Drops expired and terminal rows. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let mut store = self.refresh_store.write().unwrap();
        let now = Utc::now();
        let before = store.len();
        store.retain(|_, r| r.state == RefreshState::Active && r.expires_at > now);
        before - store.len()
    }

    fn issue_refresh_locked(
        store: &mut HashMap<String, RefreshRecord>,
        subject_id: &str,
        ttl: Duration,
    ) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        store.insert(
            token.clone(),
            RefreshRecord {
                subject_id: subject_id.to_string(),
                state: RefreshState::Active,
                expires_at: Utc::now() + ttl,
            },
        );
        token
    }

    fn revoke_all_locked(store: &mut HashMap<String, RefreshRecord>, subject_id: &str) -> usize {
        let mut revoked = 0;
        for record in store.values_mut() {
            if record.subject_id == subject_id && record.state == RefreshState::Active {
                record.state = RefreshState::Revoked;
                revoked += 1;
            }
        }
        revoked
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealnote_crypto::SigningSecret;

    fn service() -> TokenService {
        TokenService::new(SigningSecret::generate())
    }

    #[test]
    fn access_token_roundtrip() {
        let service = service();
        let token = service.issue_access_token("alice");
        assert_eq!(service.validate_access(&token).unwrap(), "alice");
    }

    #[test]
    fn garbage_token_is_malformed() {
        let service = service();
        assert_eq!(
            service.validate_access("no-dot-here").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            service.validate_access("a.b.c").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            service.validate_access("").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn foreign_signature_rejected() {
        let issuing = service();
        let validating = service();
        let token = issuing.issue_access_token("alice");
        assert_eq!(
            validating.validate_access(&token).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn tampered_payload_rejected() {
        let service = service();
        let token = service.issue_access_token("alice");
        let (payload_b64, mac_b64) = token.split_once('.').unwrap();

        // Re-encode a payload naming a different subject with the old mac
        let mut payload = URL_SAFE_NO_PAD.decode(payload_b64).unwrap();
        let text = String::from_utf8(payload.clone()).unwrap();
        payload = text.replace("alice", "mallory").into_bytes();
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), mac_b64);

        assert_eq!(
            service.validate_access(&forged).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn expired_access_token_rejected() {
        let service =
            TokenService::with_ttls(SigningSecret::generate(), -1, REFRESH_TOKEN_TTL_SECS);
        let token = service.issue_access_token("alice");
        assert_eq!(
            service.validate_access(&token).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn refresh_rotates_exactly_once() {
        let service = service();
        let token = service.issue_refresh_token("alice");

        let pair = service.refresh(&token).unwrap();
        assert_ne!(pair.refresh_token, token);
        assert_eq!(service.validate_access(&pair.access_token).unwrap(), "alice");

        // Replay of the consumed token fails
        assert_eq!(
            service.refresh(&token).unwrap_err(),
            TokenError::InvalidToken
        );
    }

    #[test]
    fn replay_revokes_the_whole_session_family() {
        let service = service();
        let original = service.issue_refresh_token("alice");
        let pair = service.refresh(&original).unwrap();

        // Replay the consumed token: rejected, and the legitimate
        // replacement dies with it
        assert_eq!(
            service.refresh(&original).unwrap_err(),
            TokenError::InvalidToken
        );
        assert_eq!(
            service.refresh(&pair.refresh_token).unwrap_err(),
            TokenError::InvalidToken
        );
    }

    #[test]
    fn unknown_refresh_token_rejected() {
        let service = service();
        assert_eq!(
            service.refresh("never-issued").unwrap_err(),
            TokenError::InvalidToken
        );
    }

    #[test]
    fn expired_refresh_token_rejected() {
        let service = TokenService::with_ttls(SigningSecret::generate(), ACCESS_TOKEN_TTL_SECS, -1);
        let token = service.issue_refresh_token("alice");
        assert_eq!(
            service.refresh(&token).unwrap_err(),
            TokenError::InvalidToken
        );
    }

    #[test]
    fn revoke_all_kills_active_tokens_only_for_that_subject() {
        let service = service();
        let alice = service.issue_refresh_token("alice");
        let bob = service.issue_refresh_token("bob");

        service.revoke_all("alice");

        assert_eq!(service.refresh(&alice).unwrap_err(), TokenError::InvalidToken);
        assert!(service.refresh(&bob).is_ok());
    }

    #[test]
    fn revoke_all_does_not_touch_outstanding_access_tokens() {
        let service = service();
        let access = service.issue_access_token("alice");
        service.revoke_all("alice");
        // Stateless validation: still valid until natural expiry
        assert_eq!(service.validate_access(&access).unwrap(), "alice");
    }

    #[test]
    fn concurrent_refresh_has_exactly_one_winner() {
        use std::sync::Arc;

        let service = Arc::new(service());
        let token = service.issue_refresh_token("alice");

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                let token = token.clone();
                std::thread::spawn(move || service.refresh(&token).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1, "exactly one racer may rotate the token");
    }

    #[test]
    fn prune_drops_terminal_and_expired_rows() {
        let service = service();
        let a = service.issue_refresh_token("alice");
        service.issue_refresh_token("alice");
        service.refresh(&a).unwrap();

        // a is Rotated and gets pruned; the two Active ones stay
        let pruned = service.prune_expired();
        assert_eq!(pruned, 1);
    }
}
