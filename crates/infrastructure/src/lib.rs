//! HTTP adapters for the console's application ports.

#![forbid(unsafe_code)]

mod http_admin_client;
mod http_resource_api;
mod http_status_stream;
mod sse;
mod tracing_notifier;

pub use http_admin_client::{HttpAdminClient, PreparedRequest, error_from_status};
pub use http_resource_api::HttpResourceApi;
pub use http_status_stream::{HttpStatusStream, STATUS_STREAM_PATH};
pub use sse::{SseDecoder, SseFrame, status_event};
pub use tracing_notifier::TracingNotifier;
