//! Live server status fed by the push stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use keel_core::resolve_error_message;
use keel_domain::{ServerStatus, StatusEvent};

use crate::StatusStream;

/// Connection state of the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not started or stopped.
    #[default]
    Idle,
    /// Opening the stream.
    Connecting,
    /// Receiving events.
    Live,
    /// Stopped because the panel is hidden.
    Paused,
    /// The stream failed or closed; see the error banner.
    Disconnected,
}

/// Snapshot of the status panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusView {
    /// Last known server status, kept while disconnected.
    pub status: Option<ServerStatus>,
    /// Connection state.
    pub connection: ConnectionState,
    /// Banner shown after a failure.
    pub error: Option<String>,
}

/// Keeps a [`ServerStatus`] current while the panel is visible.
///
/// The stream task is aborted when the panel is hidden, when the monitor
/// is stopped and when it is dropped.
pub struct StatusMonitor {
    source: Arc<dyn StatusStream>,
    view: Arc<RwLock<StatusView>>,
    task: Mutex<Option<JoinHandle<()>>>,
    retry_after: Option<Duration>,
}

impl StatusMonitor {
    /// Creates a monitor. With `retry_after` set, a dropped stream is
    /// reopened after that delay.
    #[must_use]
    pub fn new(source: Arc<dyn StatusStream>, retry_after: Option<Duration>) -> Self {
        Self {
            source,
            view: Arc::new(RwLock::new(StatusView::default())),
            task: Mutex::new(None),
            retry_after,
        }
    }

    /// Opens the stream unless it is already running.
    pub fn start(&self) {
        let mut task = self.task_slot();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let source = Arc::clone(&self.source);
        let view = Arc::clone(&self.view);
        let retry_after = self.retry_after;
        *task = Some(tokio::spawn(async move {
            loop {
                follow(source.as_ref(), &view).await;
                let Some(delay) = retry_after else {
                    break;
                };
                debug!(delay_ms = delay.as_millis(), "status stream will reconnect");
                tokio::time::sleep(delay).await;
            }
        }));
    }

    /// Closes the stream, keeping the last status.
    pub async fn stop(&self) {
        self.abort();
        self.view.write().await.connection = ConnectionState::Idle;
    }

    /// Drops the current stream and opens a new one.
    pub async fn reconnect(&self) {
        self.abort();
        self.view.write().await.error = None;
        self.start();
    }

    /// Follows the panel visibility: hidden panels hold no connection.
    pub async fn set_visible(&self, visible: bool) {
        if visible {
            self.start();
        } else {
            self.abort();
            self.view.write().await.connection = ConnectionState::Paused;
        }
    }

    /// Returns true while the stream task runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Snapshot of the panel.
    pub async fn view(&self) -> StatusView {
        self.view.read().await.clone()
    }

    fn abort(&self) {
        if let Some(handle) = self.task_slot().take() {
            handle.abort();
        }
    }

    fn task_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn follow(source: &dyn StatusStream, view: &RwLock<StatusView>) {
    view.write().await.connection = ConnectionState::Connecting;

    let mut events = match source.connect().await {
        Ok(events) => events,
        Err(error) => {
            warn!(error = %error, "status stream could not be opened");
            let mut panel = view.write().await;
            panel.connection = ConnectionState::Disconnected;
            panel.error = Some(resolve_error_message(&error, "Server status is unavailable"));
            return;
        }
    };

    info!("status stream connected");
    view.write().await.connection = ConnectionState::Live;

    while let Some(event) = events.next().await {
        let mut panel = view.write().await;
        match event {
            Ok(StatusEvent::Snapshot(status)) => {
                panel.status = Some(status);
                panel.error = None;
            }
            Ok(StatusEvent::Patch(patch)) => match panel.status.as_mut() {
                Some(status) => status.apply(patch),
                None => debug!("status patch ignored before the first snapshot"),
            },
            Err(error) => {
                warn!(error = %error, "status stream failed");
                panel.connection = ConnectionState::Disconnected;
                panel.error = Some(resolve_error_message(&error, "Server status stream failed"));
                return;
            }
        }
    }

    info!("status stream closed by the server");
    let mut panel = view.write().await;
    panel.connection = ConnectionState::Disconnected;
    panel.error = Some("Server status stream closed".to_owned());
}
