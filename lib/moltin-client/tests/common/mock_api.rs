#![allow(
    clippy::missing_errors_doc,
    dead_code,
    missing_docs,
    clippy::expect_used
)]
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use jiff::Timestamp;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use moltin_client::{MoltinClient, MoltinClientBuilder};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";

/// A canned JSON response.
#[derive(Debug, Clone)]
pub struct Canned {
    status: StatusCode,
    body: String,
}

impl Canned {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

impl IntoResponse for Canned {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Token JSON as sent by `POST /oauth/access_token`, expiring `expires_in` seconds from now.
pub fn token_json(access_token: &str, expires_in: i64) -> String {
    let expires = Timestamp::now().as_second() + expires_in;
    serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires": expires,
        "expires_in": expires_in,
    })
    .to_string()
}

/// What the mock saw on `POST /oauth/access_token`.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub form: HashMap<String, String>,
}

/// What the mock saw on any other route.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Default)]
struct MockState {
    token_responses: VecDeque<Canned>,
    resources: HashMap<String, Canned>,
    token_requests: Vec<TokenRequest>,
    resource_requests: Vec<ResourceRequest>,
}

/// In-memory stand-in for the Moltin API.
///
/// Token responses are served in queue order, the last one is repeated.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn push_token(&self, response: Canned) {
        let mut state = self.state.lock().expect("mock state");
        state.token_responses.push_back(response);
    }

    pub fn push_valid_token(&self, access_token: &str, expires_in: i64) {
        self.push_token(Canned::ok(token_json(access_token, expires_in)));
    }

    pub fn mount(&self, method: Method, path: &str, response: Canned) {
        let mut state = self.state.lock().expect("mock state");
        state.resources.insert(format!("{method} {path}"), response);
    }

    pub fn token_requests(&self) -> Vec<TokenRequest> {
        let state = self.state.lock().expect("mock state");
        state.token_requests.clone()
    }

    pub fn resource_requests(&self) -> Vec<ResourceRequest> {
        let state = self.state.lock().expect("mock state");
        state.resource_requests.clone()
    }

    fn next_token(&self, request: TokenRequest) -> Canned {
        let mut state = self.state.lock().expect("mock state");
        state.token_requests.push(request);
        let response = if state.token_responses.len() > 1 {
            state.token_responses.pop_front()
        } else {
            state.token_responses.front().cloned()
        };
        response.unwrap_or_else(|| {
            Canned::new(
                StatusCode::UNAUTHORIZED,
                r#"{"status":401,"error":"no token configured"}"#,
            )
        })
    }

    fn resource(&self, request: ResourceRequest) -> Canned {
        let mut state = self.state.lock().expect("mock state");
        let key = format!("{} {}", request.method, request.path);
        state.resource_requests.push(request);
        state.resources.get(&key).cloned().unwrap_or_else(|| {
            Canned::new(
                StatusCode::NOT_FOUND,
                r#"{"status":404,"error":"not found"}"#,
            )
        })
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn issue_token(State(api): State<MockApi>, headers: HeaderMap, body: String) -> Canned {
    let form = serde_urlencoded::from_str(&body).unwrap_or_default();
    api.next_token(TokenRequest {
        content_type: header_value(&headers, header::CONTENT_TYPE),
        authorization: header_value(&headers, header::AUTHORIZATION),
        form,
    })
}

async fn serve_resource(
    State(api): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Canned {
    api.resource(ResourceRequest {
        method,
        path: uri.path().to_string(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body,
    })
}

/// A running mock, stopped on drop.
#[derive(Debug)]
pub struct MockServer {
    pub api: MockApi,
    base_url: String,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .context("bind mock listener")?;
        let addr = listener.local_addr()?;

        let api = MockApi::default();
        let app = Router::new()
            .route("/oauth/access_token", post(issue_token))
            .fallback(serve_resource)
            .with_state(api.clone());

        info!(%addr, "launching mock Moltin API");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Ok(Self {
            api,
            base_url: format!("http://{addr}"),
            handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn builder(&self) -> MoltinClientBuilder {
        MoltinClient::builder(CLIENT_ID, CLIENT_SECRET)
            .with_base_url(&self.base_url)
            .expect("valid base url")
    }

    pub async fn connect(&self) -> MoltinClient {
        let (client, result) = self.builder().connect().await;
        result.expect("initial authentication");
        client
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
