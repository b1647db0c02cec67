//! Request-scoped correlation id.
//!
//! The id lives in a task-local slot, so it is only visible to the task
//! handling that request. Installing a value is tied to a scope: it is
//! restored when the scoped future completes, panics, or is dropped, and
//! nested scopes shadow the outer value until they end.

use std::future::Future;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Run `fut` with `request_id` as the current correlation id.
pub async fn scope<F>(request_id: String, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id, fut).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<F, R>(request_id: String, f: F) -> R
where
    F: FnOnce() -> R,
{
    REQUEST_ID.sync_scope(request_id, f)
}

/// The correlation id of the calling task, if one is set.
pub fn current() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}
