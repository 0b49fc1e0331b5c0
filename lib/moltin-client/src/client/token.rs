//! Access token types and caching.

use std::fmt;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::SecureString;

/// An access token issued by the Moltin token endpoint, with expiration tracking.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken {
    access_token: SecureString,
    token_type: String,
    #[zeroize(skip)]
    expires_at: Timestamp,
    expires_in: i64,
}

impl AccessToken {
    /// Creates a token from its parts.
    pub fn new(
        access_token: impl Into<SecureString>,
        token_type: impl Into<String>,
        expires_at: Timestamp,
        expires_in: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at,
            expires_in,
        }
    }

    /// Builds a token from the token endpoint response.
    ///
    /// The absolute `expires` timestamp wins when the server sends one; otherwise
    /// the expiry is `issued_at + expires_in`. An unrepresentable expiry falls back
    /// to the unix epoch, which makes the token due for refresh immediately.
    pub(crate) fn from_response(response: TokenResponse, issued_at: Timestamp) -> Self {
        let TokenResponse {
            access_token,
            token_type,
            expires,
            expires_in,
        } = response;

        let expires_at = match expires {
            0 => issued_at.checked_add(SignedDuration::from_secs(expires_in)),
            expires => Timestamp::from_second(expires),
        };
        let expires_at = expires_at.unwrap_or(Timestamp::UNIX_EPOCH);

        Self::new(access_token, token_type, expires_at, expires_in)
    }

    /// Returns the access token value.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the token type, usually `"bearer"`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// When the token expires.
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Lifetime in seconds as reported by the server.
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    /// Time left before expiry at `now`, negative once expired.
    pub fn remaining_at(&self, now: Timestamp) -> SignedDuration {
        now.duration_until(self.expires_at)
    }

    /// Returns `true` if less than `threshold` remains before expiry at `now`.
    pub fn should_refresh_at(&self, threshold: SignedDuration, now: Timestamp) -> bool {
        self.remaining_at(now) < threshold
    }

    /// Returns `true` if less than `threshold` remains before expiry.
    pub fn should_refresh(&self, threshold: SignedDuration) -> bool {
        self.should_refresh_at(threshold, Timestamp::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Wire format of `POST /oauth/access_token`.
///
/// Every field defaults, so a response omitting one yields the default value
/// instead of keeping the previous token's.
#[derive(Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenResponse {
    access_token: String,
    token_type: String,
    expires: i64,
    expires_in: i64,
}

/// Thread-safe slot holding the current token.
///
/// Clones share the slot. Refreshes are serialized through [`TokenCache::refresh_guard`]
/// so concurrent requests seeing a stale token only reauthenticate once.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    inner: Arc<RwLock<Option<AccessToken>>>,
    refresh: Arc<Mutex<()>>,
}

impl TokenCache {
    /// Returns the current token, stale or not.
    pub(crate) async fn get(&self) -> Option<AccessToken> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Replaces the current token.
    pub(crate) async fn set(&self, token: AccessToken) {
        let mut guard = self.inner.write().await;
        *guard = Some(token);
    }

    /// Waits for exclusive right to refresh the token.
    pub(crate) async fn refresh_guard(&self) -> MutexGuard<'_, ()> {
        self.refresh.lock().await
    }
}
