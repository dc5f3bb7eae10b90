//! Messaging collaborator seam and fire-and-forget dispatch.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pesa_core::Notification;

/// Delivers a notification to a recipient. The pipeline never awaits the outcome.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn dispatch(&self, target: &str, subject: &str, body: &str) -> Result<()>;
}

/// Spawn delivery on the runtime, bounded by `timeout`. Failures and
/// timeouts are logged, never returned.
pub fn dispatch_detached(
    messenger: Arc<dyn Messenger>,
    notification: Notification,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let send = messenger.dispatch(
            &notification.target,
            &notification.subject,
            &notification.body,
        );
        match tokio::time::timeout(timeout, send).await {
            Ok(Ok(())) => debug!(recipient = %notification.target, "notification delivered"),
            Ok(Err(e)) => warn!(recipient = %notification.target, error = %e, "notification delivery failed"),
            Err(_) => warn!(
                recipient = %notification.target,
                timeout_secs = timeout.as_secs(),
                "notification delivery timed out"
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Messenger for Recorder {
        async fn dispatch(&self, target: &str, subject: &str, _body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((target.to_string(), subject.to_string()));
            Ok(())
        }
    }

    struct Stalled;

    #[async_trait]
    impl Messenger for Stalled {
        async fn dispatch(&self, _: &str, _: &str, _: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn note() -> Notification {
        Notification {
            target: "0712345678".to_string(),
            subject: "low".to_string(),
            body: "balance low".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_detached_delivers() {
        let recorder = Arc::new(Recorder::default());
        dispatch_detached(recorder.clone(), note(), Duration::from_secs(1))
            .await
            .unwrap();
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("0712345678".to_string(), "low".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_detached_times_out_quietly() {
        let handle = dispatch_detached(Arc::new(Stalled), note(), Duration::from_secs(2));
        // The task finishes (by timing out) rather than hanging for 60s.
        handle.await.unwrap();
    }
}
