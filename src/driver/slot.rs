use async_trait::async_trait;
use std::future::Future;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::Result;

/// A remote session that must be ended explicitly.
#[async_trait]
pub trait Quit: Send + Sized {
    async fn quit(self) -> Result<()>;
}

/// Holds at most one live session.
///
/// Replacing and stopping both happen under the slot's lock, so a session is
/// never dropped without being quit.
#[derive(Debug)]
pub struct SessionSlot<S> {
    current: Mutex<Option<S>>,
}

impl<S> Default for SessionSlot<S> {
    fn default() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }
}

impl<S: Quit> SessionSlot<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, Option<S>> {
        self.current.lock().await
    }

    /// Quit the current session, then await `create` and store its result.
    ///
    /// A failure to quit the old session is logged and does not stop the new
    /// one from being created.
    pub async fn replace<F, R>(&self, create: F, on_created: impl FnOnce(&S) -> R) -> Result<R>
    where
        F: Future<Output = Result<S>>,
    {
        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            if let Err(e) = previous.quit().await {
                tracing::warn!("Failed to stop previous session: {}", e);
            }
        }

        let created = create.await?;
        let out = on_created(&created);
        *current = Some(created);
        Ok(out)
    }

    /// Quit and clear the current session. `None` if the slot was empty.
    pub async fn stop(&self) -> Option<Result<()>> {
        let mut current = self.current.lock().await;
        let previous = current.take()?;
        Some(previous.quit().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutomationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug)]
    struct CountedSession {
        id: usize,
        quits: Arc<AtomicUsize>,
        fail_quit: bool,
    }

    #[async_trait]
    impl Quit for CountedSession {
        async fn quit(self) -> Result<()> {
            self.quits.fetch_add(1, Ordering::SeqCst);
            if self.fail_quit {
                return Err(AutomationError::Driver("session already gone".into()));
            }
            Ok(())
        }
    }

    fn session(id: usize, quits: &Arc<AtomicUsize>) -> CountedSession {
        CountedSession {
            id,
            quits: quits.clone(),
            fail_quit: false,
        }
    }

    #[tokio::test]
    async fn test_replace_quits_previous_session() {
        let quits = Arc::new(AtomicUsize::new(0));
        let slot: SessionSlot<CountedSession> = SessionSlot::new();

        let first = slot.replace(async { Ok(session(1, &quits)) }, |s| s.id).await;
        assert_eq!(first.unwrap(), 1);
        assert_eq!(quits.load(Ordering::SeqCst), 0);

        let second = slot.replace(async { Ok(session(2, &quits)) }, |s| s.id).await;
        assert_eq!(second.unwrap(), 2);
        assert_eq!(quits.load(Ordering::SeqCst), 1);
        assert_eq!(slot.lock().await.as_ref().map(|s| s.id), Some(2));
    }

    #[tokio::test]
    async fn test_overlapping_replacements_quit_every_loser() {
        let quits = Arc::new(AtomicUsize::new(0));
        let slot: SessionSlot<CountedSession> = SessionSlot::new();

        let slow = slot.replace(
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(session(1, &quits))
            },
            |s| s.id,
        );
        let fast = slot.replace(async { Ok(session(2, &quits)) }, |s| s.id);
        let (slow, fast) = tokio::join!(slow, fast);
        assert!(slow.is_ok());
        assert!(fast.is_ok());

        // Two sessions were created and one is still held: the other was quit.
        assert_eq!(quits.load(Ordering::SeqCst), 1);
        assert!(slot.lock().await.is_some());

        assert!(matches!(slot.stop().await, Some(Ok(()))));
        assert_eq!(quits.load(Ordering::SeqCst), 2);
        assert!(slot.stop().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_creation_leaves_slot_empty() {
        let quits = Arc::new(AtomicUsize::new(0));
        let slot: SessionSlot<CountedSession> = SessionSlot::new();
        slot.replace(async { Ok(session(1, &quits)) }, |_| ())
            .await
            .unwrap();

        let err = slot
            .replace(
                async { Err(AutomationError::InvalidArgument("no app".into())) },
                |_: &CountedSession| (),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
        assert_eq!(quits.load(Ordering::SeqCst), 1);
        assert!(slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_quit_failure_does_not_block_replacement() {
        let quits = Arc::new(AtomicUsize::new(0));
        let slot: SessionSlot<CountedSession> = SessionSlot::new();
        let stale = CountedSession {
            id: 1,
            quits: quits.clone(),
            fail_quit: true,
        };
        slot.replace(async { Ok(stale) }, |_| ()).await.unwrap();

        let id = slot
            .replace(async { Ok(session(2, &quits)) }, |s| s.id)
            .await
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(quits.load(Ordering::SeqCst), 1);

        let result = slot.stop().await;
        assert!(matches!(result, Some(Ok(()))));
    }
}
