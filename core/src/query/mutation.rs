use std::future::Future;

use crate::error::ApiError;
use crate::notify::Notifier;

/// Toast texts for one mutation.
#[derive(Debug, Clone, Copy)]
pub struct MutationMessages {
    pub success: &'static str,
    /// Shown when the server gave no message of its own.
    pub failure: &'static str,
}

/// Run a write, then `on_success` with its result (cache invalidation,
/// slot updates), then toast the outcome.
///
/// A 401 is returned without a toast. Nothing touches the cache on failure.
pub async fn run_mutation<T, Fut>(
    notifier: &dyn Notifier,
    messages: MutationMessages,
    action: Fut,
    on_success: impl FnOnce(&T),
) -> Result<T, ApiError>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    match action.await {
        Ok(value) => {
            on_success(&value);
            notifier.success(messages.success);
            Ok(value)
        }
        Err(err) => {
            if !err.is_unauthorized() {
                let message = if err.message.trim().is_empty() {
                    messages.failure
                } else {
                    err.message.as_str()
                };
                notifier.error(message);
            }
            Err(err)
        }
    }
}
