use std::fmt;

use serde_json::{Map, Value};

/// Errors that can occur when using the [`MoltinClient`](crate::MoltinClient).
///
/// No variant is retried internally: every failure is returned to the caller of
/// the operation that triggered it.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum MoltinError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when the connection fails, a timeout elapses, or DNS resolution fails.
    Transport(reqwest::Error),

    /// The remote API answered with a status other than `200 OK`.
    ///
    /// The [`ApiError`] is the message itself, not a `source()`.
    Api(#[error(not(source))] ApiError),

    /// URL parsing error when joining the base URL and a request path.
    Url(url::ParseError),

    /// The stored access token cannot be used as a bearer header value.
    InvalidBearerToken(headers::authorization::InvalidBearerToken),

    /// JSON response deserialization failure.
    ///
    /// Occurs when a `200 OK` body does not match the expected target type.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    Decode {
        /// The JSON path where deserialization stopped.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// Request body serialization failed.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Proactive token refresh failed while [`RefreshPolicy::Strict`](crate::RefreshPolicy::Strict) is active.
    #[display("reauthentication failed: {source}")]
    #[from(skip)]
    Reauthentication {
        /// The error returned by the token endpoint call.
        source: Box<MoltinError>,
    },
}

impl MoltinError {
    /// Returns the structured API error, if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Error payload returned by the Moltin API for any non-`200` response.
///
/// The body is kept as an open JSON object: the API does not guarantee a schema,
/// only that `status` and `error` are usually present.
#[derive(Debug, Clone, PartialEq, derive_more::Error)]
pub struct ApiError {
    status_code: u16,
    body: Map<String, Value>,
}

impl ApiError {
    pub(crate) fn new(status_code: u16, body: Map<String, Value>) -> Self {
        Self { status_code, body }
    }

    /// Decodes an error body, falling back to an empty object when it is not a JSON object.
    pub(crate) fn from_body(status_code: u16, body: &str) -> Self {
        let body = serde_json::from_str::<Map<String, Value>>(body).unwrap_or_default();
        Self::new(status_code, body)
    }

    /// HTTP status code of the response.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Looks up a key of the error payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The whole decoded error payload.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    fn write_field(f: &mut fmt::Formatter<'_>, value: Option<&Value>) -> fmt::Result {
        match value {
            None | Some(Value::Null) => f.write_str("<nil>"),
            Some(Value::String(text)) => f.write_str(text),
            Some(other) => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("moltin error: status ")?;
        Self::write_field(f, self.get("status"))?;
        f.write_str(" - ")?;
        Self::write_field(f, self.get("error"))
    }
}
