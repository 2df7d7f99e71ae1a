use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;

/// Refetch callback registered by a screen.
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Late-bound refresh of the active list.
///
/// The screen registers its refetch once its stores exist; mutations call
/// [`RefreshHandle::refresh`] without knowing which list they belong to.
#[derive(Clone, Default)]
pub struct RefreshHandle {
    callback: Arc<RwLock<Option<RefreshFn>>>,
}

impl RefreshHandle {
    /// Creates a handle with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the refetch, replacing any previous one.
    pub fn register(&self, callback: RefreshFn) {
        *self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Drops the registered refetch.
    pub fn clear(&self) {
        *self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Runs the registered refetch. Returns false when nothing is registered.
    pub async fn refresh(&self) -> bool {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match callback {
            Some(callback) => {
                callback().await;
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("RefreshHandle")
            .field("registered", &registered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use super::RefreshHandle;

    #[tokio::test]
    async fn refresh_without_registration_is_a_no_op() {
        assert!(!RefreshHandle::new().refresh().await);
    }

    #[tokio::test]
    async fn clones_share_the_registration() {
        let handle = RefreshHandle::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        handle.register(Arc::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            async {}.boxed()
        }));

        assert!(handle.clone().refresh().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        handle.clear();
        assert!(!handle.refresh().await);
    }
}
