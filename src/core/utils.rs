use std::future::Future;
use std::time::Duration;

use super::AppError;

/// Runs `work` under a deadline. On expiry the future is dropped, which
/// cancels any query still in flight and hands its connection back to the pool.
pub async fn with_deadline<T, F>(deadline: Duration, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, work).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(deadline_ms = deadline.as_millis() as u64, "request deadline expired");
            Err(AppError::timeout())
        }
    }
}
