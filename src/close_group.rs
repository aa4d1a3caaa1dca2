//! Deferred-cleanup accumulator with a bounded shutdown wait.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Collects cleanup actions (subscription deregistrations, mostly) and waits for all of
/// them to finish within a bound, since the "every subscription is released before exit"
/// invariant must not be silently violated by a cleanup that hangs.
#[derive(Default)]
pub struct CloseGroup {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

#[derive(Debug, thiserror::Error)]
#[error("close group did not finish within {0:?}")]
pub struct CloseGroupTimeout(pub Duration);

impl CloseGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cleanup future to run at shutdown. Cleanups run concurrently; their
    /// relative order is unspecified.
    pub async fn add<F>(&self, cleanup: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.lock().await.push(tokio::spawn(cleanup));
    }

    /// Awaits every recorded cleanup, bounded by `timeout`. A timeout means shutdown is
    /// stuck: the caller is expected to treat this as fatal (spec mandates panic/abort,
    /// not a silent return) rather than retry.
    pub async fn close(&self, timeout: Duration) -> Result<(), CloseGroupTimeout> {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        match tokio::time::timeout(timeout, futures::future::join_all(handles)).await {
            Ok(_) => Ok(()),
            Err(_) => Err(CloseGroupTimeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn close_waits_for_all_cleanups() {
        let group = CloseGroup::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        group.add(async move { ran_clone.store(true, Ordering::SeqCst) }).await;
        group.close(Duration::from_millis(500)).await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn close_with_no_cleanups_succeeds_immediately() {
        let group = CloseGroup::new();
        group.close(Duration::from_millis(10)).await.unwrap();
    }

    #[tokio::test]
    async fn close_times_out_on_a_stuck_cleanup() {
        let group = CloseGroup::new();
        group.add(async { tokio::time::sleep(Duration::from_secs(10)).await }).await;
        let result = group.close(Duration::from_millis(20)).await;
        assert!(result.is_err());
    }
}
