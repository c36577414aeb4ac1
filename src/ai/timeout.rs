//! Bounded Vendor Calls
//!
//! Helpers that put a deadline on vendor work:
//! - [`with_timeout`]: wrap a future in place
//! - [`spawn_with_timeout`]: run the future on its own task, and on expiry
//!   cancel its token and abort the task so nothing outlives the budget
//!
//! ## Usage
//!
//! ```ignore
//! let token = CancellationToken::new();
//! let payload = spawn_with_timeout(
//!     Duration::from_millis(5000),
//!     token.clone(),
//!     async move { adapter.complete(&request).await.map_err(VoxError::DispatchFailure) },
//!     "claude",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::types::{ErrorCategory, Result, VendorError, VoxError};

/// Execute an async operation with a timeout
///
/// Returns `DispatchTimeout` naming `provider` if the operation does not
/// complete within `timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, provider: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(VoxError::timeout(provider, timeout)),
    }
}

/// Run `future` on a spawned task, bounded by `timeout`.
///
/// On expiry `token` is cancelled, the task is aborted and `DispatchTimeout`
/// is returned. A panicking task surfaces as `DispatchFailure`.
pub async fn spawn_with_timeout<T, F>(
    timeout: Duration,
    token: CancellationToken,
    future: F,
    provider: &str,
) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let mut handle = tokio::spawn(future);

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(VoxError::DispatchFailure(VendorError::new(
            ErrorCategory::Unknown,
            format!("vendor task failed: {}", join_err),
            provider,
        ))),
        Err(_) => {
            token.cancel();
            handle.abort();
            warn!(provider = %provider, timeout_ms = timeout.as_millis() as u64, "Vendor call timed out");
            Err(VoxError::timeout(provider, timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, VoxError>(42) },
            "mistral",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, VoxError>(42)
            },
            "mistral",
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            VoxError::DispatchTimeout { ref provider, .. } if provider == "mistral"
        ));
    }

    #[tokio::test]
    async fn test_spawned_call_cancelled_on_timeout() {
        let token = CancellationToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let start = Instant::now();
        let result: Result<()> = spawn_with_timeout(
            Duration::from_millis(50),
            token.clone(),
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            },
            "gemini_live",
        )
        .await;

        assert!(start.elapsed() < Duration::from_millis(1000));
        assert!(matches!(result, Err(VoxError::DispatchTimeout { .. })));
        assert!(token.is_cancelled());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_spawned_panic_is_dispatch_failure() {
        let result: Result<()> = spawn_with_timeout(
            Duration::from_secs(1),
            CancellationToken::new(),
            async {
                let nothing: Option<()> = None;
                nothing.expect("adapter blew up");
                Ok(())
            },
            "claude",
        )
        .await;
        assert!(matches!(result, Err(VoxError::DispatchFailure(ref e)) if e.provider == "claude"));
    }
}
