//! Deadline helpers shared by drivers and the engine

use std::future::Future;
use std::time::Duration;

/// Await `fut` for at most `timeout`.
///
/// Returns `None` when the deadline passes first. A zero `timeout` disables
/// the deadline and awaits `fut` to completion.
pub async fn bounded<F>(timeout: Duration, fut: F) -> Option<F::Output>
where
    F: Future,
{
    if timeout.is_zero() {
        return Some(fut.await);
    }
    tokio::time::timeout(timeout, fut).await.ok()
}

/// Convert a millisecond count into a `Duration`
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_expires() {
        let result = bounded(Duration::from_millis(20), std::future::pending::<()>()).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_zero_timeout_is_unbounded() {
        let result = bounded(Duration::ZERO, async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            7
        })
        .await;
        assert_eq!(result, Some(7));
    }
}
