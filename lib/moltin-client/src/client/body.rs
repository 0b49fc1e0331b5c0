use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use super::MoltinError;

/// The body of an HTTP request together with its content type.
///
/// The content type is always sent alongside the payload, so form-encoded
/// bodies reach the API as `application/x-www-form-urlencoded`.
#[derive(Clone, derive_more::Debug)]
pub struct RequestBody {
    content_type: ContentType,
    #[debug(ignore)]
    data: Bytes,
}

impl RequestBody {
    /// Creates a JSON body from a serializable type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use moltin_client::RequestBody;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let body = RequestBody::json(&serde_json::json!({ "name": "Widget" }))?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MoltinError::Serialization`] if the value cannot be represented as JSON.
    pub fn json<T>(t: &T) -> Result<Self, MoltinError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(t).map_err(|err| MoltinError::Serialization {
            message: format!("Failed to serialize JSON body: {err}"),
        })?;

        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// Creates a form-encoded body from a serializable type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use moltin_client::RequestBody;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let body = RequestBody::form(&[("title", "Widget"), ("status", "1")])?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MoltinError::Serialization`] if the value is not a flat map or sequence of pairs.
    pub fn form<T>(t: &T) -> Result<Self, MoltinError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(t).map_err(|err| MoltinError::Serialization {
            message: format!("Failed to serialize form data: {err}"),
        })?;

        Ok(Self {
            content_type: ContentType::form_url_encoded(),
            data: Bytes::from(data),
        })
    }

    /// Creates a raw body with custom content type.
    pub fn raw(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// Creates a text body with `text/plain` content type.
    pub fn text(text: &str) -> Self {
        Self::raw(text.to_owned(), ContentType::text())
    }

    /// The content type sent with this body.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The encoded payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (ContentType, Bytes) {
        (self.content_type, self.data)
    }
}
