use headers::{Authorization, HeaderMapExt};
use http::{Method, StatusCode};
use reqwest::Request;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::token::AccessToken;
use super::{ApiError, MoltinClient, MoltinError, RequestBody};

impl MoltinClient {
    /// Sends a single request and classifies its response.
    ///
    /// No freshness check happens here: the token, if any, is attached as is.
    pub(super) async fn send<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        token: Option<&AccessToken>,
    ) -> Result<T, MoltinError>
    where
        T: DeserializeOwned,
    {
        let url = Self::build_url(&self.base_url, path)?;
        let request = Self::build_request(method, url, body, token)?;

        debug!(method = %request.method(), url = %request.url(), authenticated = token.is_some(), "sending...");
        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!(%status, "...receiving");

        let text = response.text().await?;
        if status != StatusCode::OK {
            let error = ApiError::from_body(status.as_u16(), &text);
            debug!(%error, "API error");
            return Err(error.into());
        }

        Self::decode(&text)
    }

    pub(super) fn build_url(base_url: &str, path: &str) -> Result<Url, MoltinError> {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = url.parse::<Url>()?;
        Ok(url)
    }

    pub(super) fn build_request(
        method: Method,
        url: Url,
        body: Option<RequestBody>,
        token: Option<&AccessToken>,
    ) -> Result<Request, MoltinError> {
        let mut request = Request::new(method, url);

        if let Some(token) = token {
            let authorization = Authorization::bearer(token.access_token())?;
            request.headers_mut().typed_insert(authorization);
        }

        if let Some(body) = body {
            let (content_type, data) = body.into_parts();
            request.headers_mut().typed_insert(content_type);
            *request.body_mut() = Some(data.into());
        }

        Ok(request)
    }

    fn decode<T>(json: &str) -> Result<T, MoltinError>
    where
        T: DeserializeOwned,
    {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(deserializer).map_err(|err| MoltinError::Decode {
            path: err.path().to_string(),
            error: err.into_inner(),
            body: json.to_string(),
        })
    }
}
