use std::sync::Arc;
use std::time::Duration;

use keel_domain::{DEFAULT_PAGE_SIZE, Pagination};

use crate::{DEFAULT_DEBOUNCE, MutationCounter, Notifier};

/// Tunables shared by every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenOptions {
    /// Quiet period before free-text filters are committed.
    pub debounce: Duration,
    /// Page size a screen starts with.
    pub page_size: u32,
}

impl ScreenOptions {
    /// First page at the configured page size.
    #[must_use]
    pub fn default_pagination(&self) -> Pagination {
        Pagination::with_page_size(self.page_size)
    }
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Console-wide services handed to every screen.
#[derive(Clone)]
pub struct ConsoleContext {
    counter: MutationCounter,
    notifier: Arc<dyn Notifier>,
    options: ScreenOptions,
}

impl ConsoleContext {
    /// Creates a context with a fresh mutation counter.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, options: ScreenOptions) -> Self {
        Self {
            counter: MutationCounter::new(),
            notifier,
            options,
        }
    }

    /// Shared mutation counter.
    #[must_use]
    pub fn counter(&self) -> &MutationCounter {
        &self.counter
    }

    /// Notification sink.
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Screen tunables.
    #[must_use]
    pub fn options(&self) -> ScreenOptions {
        self.options
    }
}

impl std::fmt::Debug for ConsoleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleContext")
            .field("counter", &self.counter)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
