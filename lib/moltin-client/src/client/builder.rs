use jiff::SignedDuration;
use tracing::warn;
use url::Url;

use super::token::TokenCache;
use super::{
    Credentials, DEFAULT_BASE_URL, DEFAULT_REFRESH_THRESHOLD, MoltinClient, MoltinError,
    RefreshPolicy,
};

/// Builder for [`MoltinClient`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `https://api.molt.in`
/// - **Refresh threshold**: 5 minutes
/// - **Refresh policy**: [`RefreshPolicy::BestEffort`]
/// - **HTTP client**: `reqwest::Client::new()`, no timeout
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use jiff::SignedDuration;
/// use moltin_client::{MoltinClient, RefreshPolicy};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let http = reqwest::Client::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let (client, authenticated) = MoltinClient::builder("client-id", "client-secret")
///     .with_base_url("https://staging.molt.in")?
///     .with_refresh_threshold(SignedDuration::from_mins(10))
///     .with_refresh_policy(RefreshPolicy::Strict)
///     .with_http_client(http)
///     .connect()
///     .await;
/// authenticated?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MoltinClientBuilder {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    refresh_threshold: SignedDuration,
    refresh_policy: RefreshPolicy,
}

impl MoltinClientBuilder {
    pub(super) fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            refresh_policy: RefreshPolicy::default(),
        }
    }

    /// Builds the client without authenticating.
    ///
    /// The client holds no token: call [`MoltinClient::authenticate`] before
    /// issuing requests, or use [`MoltinClientBuilder::connect`].
    pub fn build(self) -> MoltinClient {
        let Self {
            client,
            base_url,
            credentials,
            refresh_threshold,
            refresh_policy,
        } = self;

        MoltinClient {
            http: client,
            base_url,
            credentials,
            tokens: TokenCache::default(),
            refresh_threshold,
            refresh_policy,
        }
    }

    /// Builds the client and performs the initial authentication.
    ///
    /// The client is returned together with the authentication outcome, even when
    /// it failed. A client that failed to authenticate sends its requests without
    /// an `Authorization` header.
    pub async fn connect(self) -> (MoltinClient, Result<(), MoltinError>) {
        let client = self.build();
        let result = client.authenticate().await;
        if let Err(error) = &result {
            warn!(%error, client_id = client.client_id(), "initial authentication failed");
        }
        (client, result)
    }

    /// Sets the base URL, for staging environments or tests.
    ///
    /// # Errors
    ///
    /// Returns [`MoltinError::Url`] if `base_url` is not an absolute URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, MoltinError> {
        let base_url = Url::parse(base_url.as_ref())?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    /// Sets how long before expiry the token gets refreshed.
    pub fn with_refresh_threshold(mut self, threshold: SignedDuration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Sets what happens to a request when the proactive refresh fails.
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Uses the given HTTP client, e.g. one configured with a timeout or a proxy.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}
