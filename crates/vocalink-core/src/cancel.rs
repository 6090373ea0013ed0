//! Cancellation support for outbound calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Result, VocalinkError};

/// Drives `fut` to completion unless `cancel` fires first, in which case the
/// future is dropped and [`VocalinkError::Cancelled`] is returned.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(VocalinkError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(VocalinkError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_passes_through_result() {
        let cancel = CancellationToken::new();
        let value = run_cancellable(&cancel, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_already_cancelled_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let polled = AtomicBool::new(false);
        let result: Result<()> = run_cancellable(&cancel, async {
            polled.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert_eq!(result, Err(VocalinkError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: Result<()> = run_cancellable(&cancel, std::future::pending()).await;
        assert_eq!(result, Err(VocalinkError::Cancelled));
    }
}
