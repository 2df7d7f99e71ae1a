use std::future::Future;

use tracing::{info, warn};

use keel_core::{AppResult, resolve_error_message};

use crate::{ConsoleContext, MutationGuard};

/// Result of a user-triggered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The request succeeded and the list was refreshed.
    Completed,
    /// The request failed; the message was shown to the user.
    Failed(String),
    /// Nothing was sent: another write is in flight or there was nothing to do.
    Skipped,
}

impl MutationOutcome {
    /// Returns true for [`MutationOutcome::Completed`].
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum MutationKind {
    Create,
    Update,
    Delete,
    BulkDelete(usize),
    Reorder,
}

impl MutationKind {
    fn success_message(self, label: &str) -> String {
        match self {
            Self::Create => format!("Created {label}"),
            Self::Update => format!("Saved {label}"),
            Self::Delete => format!("Deleted {label}"),
            Self::BulkDelete(count) => format!("Deleted {count} {label} records"),
            Self::Reorder => format!("Reordered {label} entries"),
        }
    }

    fn failure_message(self, label: &str) -> String {
        match self {
            Self::Create => format!("Failed to create {label}"),
            Self::Update => format!("Failed to save {label}"),
            Self::Delete => format!("Failed to delete {label}"),
            Self::BulkDelete(_) => format!("Failed to delete {label} records"),
            Self::Reorder => format!("Failed to reorder {label} entries"),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::BulkDelete(_) => "bulk_delete",
            Self::Reorder => "reorder",
        }
    }
}

/// Runs one remote write under `guard` and reports the result.
///
/// The guard is released before this returns, so a follow-up refresh
/// is not counted as a mutation.
pub(crate) async fn run_mutation<T, Fut>(
    context: &ConsoleContext,
    guard: MutationGuard,
    label: &str,
    kind: MutationKind,
    request: Fut,
) -> Result<T, String>
where
    Fut: Future<Output = AppResult<T>>,
{
    let result = request.await;
    drop(guard);

    match result {
        Ok(value) => {
            info!(resource = label, mutation = kind.name(), "mutation completed");
            context.notifier().success(&kind.success_message(label));
            Ok(value)
        }
        Err(error) => {
            let message = resolve_error_message(&error, &kind.failure_message(label));
            warn!(
                resource = label,
                mutation = kind.name(),
                error = %error,
                "mutation failed"
            );
            context.notifier().error(&message);
            Err(message)
        }
    }
}
