use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts remote writes in flight across every screen of the console.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct MutationCounter {
    in_flight: Arc<AtomicUsize>,
}

impl MutationCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one mutation until the returned guard is dropped.
    #[must_use = "the mutation is only counted while the guard lives"]
    pub fn begin(&self) -> MutationGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        MutationGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Registers a mutation only when none is in flight.
    ///
    /// The check and the increment are one atomic step, so two writes
    /// racing for an idle counter cannot both start.
    #[must_use = "the mutation is only counted while the guard lives"]
    pub fn try_begin(&self) -> Option<MutationGuard> {
        self.in_flight
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(MutationGuard {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Number of mutations in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns true while any mutation is in flight.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.in_flight() > 0
    }
}

/// Decrements the counter when dropped, whatever the outcome.
#[derive(Debug)]
pub struct MutationGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        // Never below zero.
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            });
    }
}
