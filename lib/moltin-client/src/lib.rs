//! # Moltin Client
//!
//! Async client for the [Moltin](https://www.moltin.com) e-commerce API.
//!
//! The client authenticates with the OAuth2 client-credentials grant, keeps the
//! bearer token, refreshes it shortly before it expires, and decodes JSON
//! responses into your own types.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moltin_client::MoltinClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // The client is returned even when authentication fails: check the result.
//! let (client, authenticated) = MoltinClient::new("client-id", "client-secret").await;
//! authenticated?;
//!
//! let product = client.get_product(42).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom endpoints
//!
//! [`MoltinClient::request`] is the primitive every endpoint wrapper builds on:
//!
//! ```rust,no_run
//! use http::Method;
//! use moltin_client::{MoltinClient, MoltinError};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Currency {
//!     code: String,
//! }
//!
//! async fn get_currency(client: &MoltinClient, id: u64) -> Result<Currency, MoltinError> {
//!     client
//!         .request(Method::GET, &format!("/v1/currencies/{id}"), None)
//!         .await
//! }
//! ```
//!
//! ## Errors
//!
//! Any status other than `200 OK` becomes a [`MoltinError::Api`] wrapping the
//! decoded error payload:
//!
//! ```rust,no_run
//! # use moltin_client::{MoltinClient, MoltinError};
//! # async fn example(client: &MoltinClient) {
//! match client.get_product(404).await {
//!     Err(MoltinError::Api(error)) => {
//!         // e.g. "moltin error: status 404 - not found"
//!         eprintln!("{error}");
//!     }
//!     Err(other) => eprintln!("request failed: {other}"),
//!     Ok(product) => println!("{product}"),
//! }
//! # }
//! ```
//!
//! ## Token refresh
//!
//! Before each request the client checks the token: when less than
//! [`DEFAULT_REFRESH_THRESHOLD`] remains it reauthenticates first. By default a
//! failed refresh is logged and the request goes on with the current token; see
//! [`RefreshPolicy`] to make it fail the request instead.

mod client;

pub use self::client::{
    AccessToken, ApiError, Credentials, DEFAULT_BASE_URL, DEFAULT_REFRESH_THRESHOLD,
    MoltinClient, MoltinClientBuilder, MoltinError, RefreshPolicy, RequestBody, SecureString,
};
