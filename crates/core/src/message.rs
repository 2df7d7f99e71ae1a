use crate::AppError;

/// Fallback shown when a failed operation carries no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Operation failed, please try again";

/// Resolves the human-readable text for a failed operation.
///
/// The error's own message wins when it is not blank; otherwise the caller's
/// fallback is used, and a blank fallback degrades to
/// [`GENERIC_FAILURE_MESSAGE`].
#[must_use]
pub fn resolve_error_message(error: &AppError, fallback: &str) -> String {
    if let Some(detail) = error.detail() {
        return detail.to_owned();
    }

    let fallback = fallback.trim();
    if fallback.is_empty() {
        GENERIC_FAILURE_MESSAGE.to_owned()
    } else {
        fallback.to_owned()
    }
}
