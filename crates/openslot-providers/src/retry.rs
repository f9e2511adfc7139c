//! Retry-on-auth-failure policy.
//!
//! A generic higher-order wrapper: run a fallible operation; if it fails
//! with an authentication error, run a recovery action (typically a token
//! renewal) and retry the whole operation once. The operation executes at
//! most twice, and only authentication failures trigger the retry.

use std::future::Future;

use tracing::warn;

use crate::error::SourceResult;

/// Runs `op`, recovering once from an authentication failure.
///
/// Any non-auth error, and an auth error on the second attempt, propagate
/// unchanged. A failing `recover` propagates its own error instead of
/// retrying.
pub async fn with_auth_retry<T, Op, Fut, Rec, RecFut>(op: Op, recover: Rec) -> SourceResult<T>
where
    Op: Fn() -> Fut,
    Fut: Future<Output = SourceResult<T>>,
    Rec: FnOnce() -> RecFut,
    RecFut: Future<Output = SourceResult<()>>,
{
    match op().await {
        Err(err) if err.is_auth() => {
            warn!(error = %err, "authentication failed, refreshing credentials and retrying");
            recover().await?;
            op().await
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SourceErrorCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn success_passes_through_without_recovery() {
        let calls = AtomicUsize::new(0);
        let recoveries = AtomicUsize::new(0);

        let result = with_auth_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            },
            || {
                recoveries.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(recoveries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn auth_failure_recovers_and_retries_once() {
        let calls = AtomicUsize::new(0);
        let recoveries = AtomicUsize::new(0);

        let result = with_auth_retry(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(SourceError::authentication("token expired"))
                    } else {
                        Ok("fresh data")
                    }
                }
            },
            || {
                recoveries.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "fresh data");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(recoveries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_auth_failure_executes_at_most_twice() {
        let calls = AtomicUsize::new(0);

        let result: SourceResult<()> = with_auth_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SourceError::authentication("still rejected")) }
            },
            || async { Ok(()) },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::AuthenticationFailed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_auth_errors_do_not_retry() {
        let calls = AtomicUsize::new(0);

        let result: SourceResult<()> = with_auth_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SourceError::network("connection refused")) }
            },
            || async { Ok(()) },
        )
        .await;

        assert_eq!(result.unwrap_err().code(), SourceErrorCode::NetworkError);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_recovery_propagates_without_second_attempt() {
        let calls = AtomicUsize::new(0);

        let result: SourceResult<()> = with_auth_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SourceError::authentication("token expired")) }
            },
            || async { Err(SourceError::configuration("helper not installed")) },
        )
        .await;

        assert_eq!(
            result.unwrap_err().code(),
            SourceErrorCode::ConfigurationError
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
