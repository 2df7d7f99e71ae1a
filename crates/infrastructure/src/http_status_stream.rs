use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::info;

use keel_application::{StatusEvents, StatusStream};
use keel_core::{AppError, AppResult};

use crate::HttpAdminClient;
use crate::sse::{SseDecoder, status_event};

/// Path of the server status event stream.
pub const STATUS_STREAM_PATH: &str = "monitor/server/stream";

/// Server status over server-sent events.
#[derive(Debug, Clone)]
pub struct HttpStatusStream {
    client: Arc<HttpAdminClient>,
}

impl HttpStatusStream {
    /// Creates a stream source on `client`.
    #[must_use]
    pub fn new(client: Arc<HttpAdminClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusStream for HttpStatusStream {
    async fn connect(&self) -> AppResult<StatusEvents> {
        let request = self
            .client
            .stream_request(Method::GET, STATUS_STREAM_PATH)?
            .map(|builder| {
                builder.header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            });
        let request_id = request.request_id();
        let response = self.client.send(request).await?;
        info!(request_id = %request_id, "status stream opened");

        let events = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let events: Vec<AppResult<_>> = match chunk {
                    Ok(chunk) => decoder
                        .push(&chunk)
                        .iter()
                        .filter_map(|frame| status_event(frame).transpose())
                        .collect(),
                    Err(error) => vec![Err(AppError::Network(format!(
                        "status stream interrupted: {error}"
                    )))],
                };
                future::ready(Some(stream::iter(events)))
            })
            .flatten()
            .boxed();

        Ok(events)
    }
}
