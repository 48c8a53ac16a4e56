// Blocking work on tokio's blocking pool
use std::time::Duration;

use crate::types::{Result, SplitError};

/// Run `f` off the async threads, optionally bounded in time.
///
/// The clock starts when `f` is handed to the pool. An expired call is
/// reported as [`SplitError::Timeout`]; `f` itself runs to completion.
pub(crate) async fn run_blocking<T, F>(what: String, timeout: Option<Duration>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| SplitError::Timeout {
                what,
                secs: limit.as_secs(),
            })?,
        None => task.await,
    };
    joined.map_err(|e| SplitError::Join(e.to_string()))?
}
