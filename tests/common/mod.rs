pub mod engine;
pub mod fixtures;
pub mod http;

use std::future::Future;
use std::time::Duration;

/// Awaits `future` for at most `timeout`.
///
/// # Panics
///
/// Will panic if the future does not finish in time.
pub async fn within<F: Future>(timeout: Duration, what: &str, future: F) -> F::Output {
    match tokio::time::timeout(timeout, future).await {
        Ok(output) => output,
        Err(_) => panic!("timed out waiting until {what}"),
    }
}
