use http::Method;
use jiff::{SignedDuration, Timestamp};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

mod body;
pub use self::body::RequestBody;

mod builder;
pub use self::builder::MoltinClientBuilder;

mod credentials;
pub use self::credentials::{Credentials, SecureString};

mod error;
pub use self::error::{ApiError, MoltinError};

mod execution;

mod token;
pub use self::token::AccessToken;
use self::token::{TokenCache, TokenResponse};

/// Base URL of the Moltin API.
pub const DEFAULT_BASE_URL: &str = "https://api.molt.in";

/// A token with less time left than this is refreshed before the next request.
pub const DEFAULT_REFRESH_THRESHOLD: SignedDuration = SignedDuration::from_mins(5);

const TOKEN_PATH: &str = "/oauth/access_token";

/// What a request does when the proactive token refresh fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Log the failure and send the request with the current, possibly stale, token.
    #[default]
    BestEffort,
    /// Abort the request with [`MoltinError::Reauthentication`].
    Strict,
}

/// Client for the Moltin API.
///
/// The client owns the application credentials and the current access token.
/// Every request checks the token first: when less than the refresh threshold
/// (5 minutes by default) remains, the client reauthenticates before sending.
///
/// # Example
///
/// ```rust,no_run
/// use moltin_client::MoltinClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (client, authenticated) = MoltinClient::new("client-id", "client-secret").await;
/// authenticated?;
///
/// let product = client.get_product(42).await?;
/// println!("{product}");
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// Clones share the transport and the token. The token slot is behind an async
/// lock and refreshes are serialized, so concurrent requests that all see a stale
/// token trigger a single reauthentication.
#[derive(Debug, Clone)]
pub struct MoltinClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    tokens: TokenCache,
    refresh_threshold: SignedDuration,
    refresh_policy: RefreshPolicy,
}

// Create
impl MoltinClient {
    /// Creates a client for the Moltin API and authenticates it.
    ///
    /// The client is returned whether or not authentication succeeded. When the
    /// result is an error the client holds no token, and its requests are sent
    /// without an `Authorization` header until [`MoltinClient::authenticate`] succeeds.
    pub async fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> (Self, Result<(), MoltinError>) {
        Self::builder(client_id, client_secret).connect().await
    }

    /// Starts configuring a client.
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
    ) -> MoltinClientBuilder {
        MoltinClientBuilder::new(Credentials::new(client_id, client_secret))
    }
}

// Authentication
impl MoltinClient {
    /// Requests a new token with the client-credentials grant.
    ///
    /// On success the stored token is replaced as a whole. On failure the
    /// previous token, if any, is kept.
    ///
    /// # Errors
    ///
    /// Returns the transport, API or decode error of the token request.
    pub async fn authenticate(&self) -> Result<(), MoltinError> {
        let body = RequestBody::form(&self.credentials.grant())?;
        let response = self
            .send::<TokenResponse>(Method::POST, TOKEN_PATH, Some(body), None)
            .await?;

        let token = AccessToken::from_response(response, Timestamp::now());
        info!(
            client_id = self.credentials.client_id(),
            token_type = token.token_type(),
            expires_at = %token.expires_at(),
            "authenticated"
        );
        self.tokens.set(token).await;

        Ok(())
    }

    /// Returns a snapshot of the current token.
    pub async fn token(&self) -> Option<AccessToken> {
        self.tokens.get().await
    }

    async fn current_token(&self) -> Result<Option<AccessToken>, MoltinError> {
        let Some(token) = self.tokens.get().await else {
            return Ok(None);
        };
        if !token.should_refresh(self.refresh_threshold) {
            return Ok(Some(token));
        }

        debug!(expires_at = %token.expires_at(), "token about to expire, reauthenticating");
        if let Err(error) = self.reauthenticate().await {
            match self.refresh_policy {
                RefreshPolicy::BestEffort => {
                    warn!(%error, "token refresh failed, keeping the current token");
                }
                RefreshPolicy::Strict => {
                    return Err(MoltinError::Reauthentication {
                        source: Box::new(error),
                    });
                }
            }
        }

        Ok(self.tokens.get().await)
    }

    async fn reauthenticate(&self) -> Result<(), MoltinError> {
        let _guard = self.tokens.refresh_guard().await;

        // refreshed by a concurrent request while waiting
        if let Some(token) = self.tokens.get().await
            && !token.should_refresh(self.refresh_threshold)
        {
            return Ok(());
        }

        self.authenticate().await
    }
}

// Requests
impl MoltinClient {
    /// Sends an authenticated request and decodes the `200 OK` JSON body into `T`.
    ///
    /// This is the primitive endpoint wrappers are built on.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use http::Method;
    /// use moltin_client::{MoltinClient, MoltinError, RequestBody};
    /// use serde_json::Value;
    ///
    /// # async fn example(client: &MoltinClient) -> Result<(), MoltinError> {
    /// let categories: Value = client.request(Method::GET, "/v1/categories", None).await?;
    ///
    /// let body = RequestBody::form(&[("title", "Widget"), ("status", "1")])?;
    /// let created: Value = client.request(Method::POST, "/v1/products", Some(body)).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`MoltinError::Transport`] if the request could not be sent
    /// - [`MoltinError::Api`] for any status other than `200 OK`
    /// - [`MoltinError::Decode`] if the body does not match `T`
    /// - [`MoltinError::Reauthentication`] if the token refresh failed under [`RefreshPolicy::Strict`]
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<T, MoltinError>
    where
        T: DeserializeOwned,
    {
        let token = self.current_token().await?;
        self.send(method, path, body, token.as_ref()).await
    }

    /// Fetches a product as untyped JSON from `/v1/products/{id}`.
    ///
    /// # Errors
    ///
    /// See [`MoltinClient::request`].
    pub async fn get_product(&self, id: u64) -> Result<serde_json::Value, MoltinError> {
        self.request(Method::GET, &format!("/v1/products/{id}"), None)
            .await
    }
}

// Configuration
impl MoltinClient {
    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The client identifier used to authenticate.
    pub fn client_id(&self) -> &str {
        self.credentials.client_id()
    }
}
