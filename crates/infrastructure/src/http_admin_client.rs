//! reqwest client for the administrative backend.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use keel_core::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared HTTP client carrying the base URL, token and timeout.
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    http_client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl HttpAdminClient {
    /// Creates a client. `timeout` bounds every request except streams.
    pub fn new(base_url: Url, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API base URL '{base_url}' cannot carry paths"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url: with_trailing_slash(base_url),
            token: token.filter(|token| !token.trim().is_empty()),
            timeout,
        })
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` relative to the base URL.
    pub fn url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| AppError::Validation(format!("invalid API path '{path}': {error}")))
    }

    /// Starts a request bounded by the client timeout.
    pub fn request(&self, method: Method, path: &str) -> AppResult<PreparedRequest> {
        let prepared = self.stream_request(method, path)?;
        Ok(PreparedRequest {
            builder: prepared.builder.timeout(self.timeout),
            ..prepared
        })
    }

    /// Starts a long-lived request without a total timeout.
    pub fn stream_request(&self, method: Method, path: &str) -> AppResult<PreparedRequest> {
        let url = self.url(path)?;
        let request_id = Uuid::new_v4();
        let mut builder = self
            .http_client
            .request(method.clone(), url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        Ok(PreparedRequest {
            builder,
            method,
            path: path.to_owned(),
            request_id,
        })
    }

    /// Sends a request and decodes a JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: PreparedRequest) -> AppResult<T> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!("unexpected response body from '{path}': {error}"))
        })
    }

    /// Sends a request, turning transport failures and error statuses into
    /// [`AppError`].
    pub async fn send(&self, request: PreparedRequest) -> AppResult<Response> {
        let PreparedRequest {
            builder,
            method,
            path,
            request_id,
        } = request;

        debug!(%method, path = %path, request_id = %request_id, "sending API request");
        let response = builder.send().await.map_err(|error| {
            warn!(%method, path = %path, request_id = %request_id, error = %error, "API request failed");
            AppError::Network(format!("request to '{path}' failed: {error}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            %method,
            path = %path,
            request_id = %request_id,
            status = status.as_u16(),
            "API request rejected"
        );
        Err(error_from_status(status, &body))
    }
}

/// A request with its bookkeeping.
#[derive(Debug)]
pub struct PreparedRequest {
    builder: RequestBuilder,
    method: Method,
    path: String,
    request_id: Uuid,
}

impl PreparedRequest {
    /// Edits the underlying builder, for example to add a body or query.
    #[must_use]
    pub fn map(self, edit: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            builder: edit(self.builder),
            ..self
        }
    }

    /// Identifier sent in the `X-Request-Id` header.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Maps an error status and its body to an [`AppError`].
///
/// The message is the body's `msg` or `message` field, else the raw body
/// text. Blank bodies leave the message empty so callers fall back to
/// their own wording.
#[must_use]
pub fn error_from_status(status: StatusCode, body: &str) -> AppError {
    let message = body_message(body).unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

fn body_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => ["msg", "message"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|message| !message.is_empty())
            .map(ToOwned::to_owned),
        Ok(Value::String(message)) => Some(message.trim().to_owned()),
        _ => Some(body.to_owned()),
    }
}
