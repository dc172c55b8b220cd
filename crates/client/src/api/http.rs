//! Shared HTTP plumbing for the API clients.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionHolder;

/// How much of an unparseable body to keep in error messages and logs.
const BODY_SNIPPET_LEN: usize = 200;

/// Shared transport: one `reqwest::Client`, the API base URL, and the session
/// holder supplying the bearer credential.
#[derive(Clone)]
pub(crate) struct Http {
    inner: Arc<HttpInner>,
}

struct HttpInner {
    client: reqwest::Client,
    base_url: String,
    session: SessionHolder,
}

impl Http {
    /// Build the shared transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub(crate) fn new(config: &ClientConfig, session: SessionHolder) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                session,
            }),
        })
    }

    /// Start a request to `path` (relative to the base URL, e.g. `cart/`).
    ///
    /// The session's bearer token, when present, is attached here so every
    /// endpoint picks up credential changes without restating them.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.inner.base_url, path);
        let mut builder = self.inner.client.request(method, url);

        if let Some(token) = self.inner.session.access_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let response = check_status(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&text),
                "failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request, discarding any response body.
    ///
    /// Used for acknowledgement-style endpoints (removals) where the
    /// synchronizer re-fetches rather than trusting the response.
    pub(crate) async fn send_ack(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        check_status(response).await.map(drop)
    }
}

/// Map non-success statuses onto the error taxonomy.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized(message)),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Rejected(message))
        }
        _ => Err(ApiError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports errors as `{"error": "..."}` or `{"detail": "..."}`;
/// anything else falls back to a snippet of the raw body.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value
            .get("error")
            .or_else(|| value.get("detail"))
            .and_then(serde_json::Value::as_str)
    {
        return message.to_owned();
    }

    snippet(body)
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
