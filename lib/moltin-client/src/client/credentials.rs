use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for the client secret and the access token, so that neither ends up in
/// logs through `Debug` and both are cleared from memory once dropped.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// The client-credentials pair identifying an application to the Moltin API.
///
/// Credentials are not validated locally, the token endpoint is the only authority.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecureString,
}

impl Credentials {
    /// Creates a credentials pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecureString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn grant(&self) -> ClientCredentialsGrant<'_> {
        ClientCredentialsGrant {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_str(),
            grant_type: "client_credentials",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Form payload of `POST /oauth/access_token`.
#[derive(Serialize)]
pub(crate) struct ClientCredentialsGrant<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}
