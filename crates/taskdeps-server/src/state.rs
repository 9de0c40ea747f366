//! Shared server state.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use taskdeps::storage::DependencyStorage;
use tokio::sync::{Mutex, broadcast};

use crate::events::{DependencyEvent, EVENT_CHANNEL_CAPACITY};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Dependency graph and task snapshots
    pub storage: Arc<dyn DependencyStorage>,
    /// Lifecycle event feed
    pub events: broadcast::Sender<DependencyEvent>,
    /// Graceful shutdown trigger
    pub shutdown_tx: broadcast::Sender<()>,
    /// When the state was created, for uptime reporting
    pub started_at: DateTime<Utc>,
    /// Held by mutating handlers from the change until it is saved.
    ///
    /// A failed save reloads the last saved state; holding this guard means
    /// the reload can only discard the failing request's own change.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Wrap `storage` with fresh event and shutdown channels.
    pub fn new(storage: Arc<dyn DependencyStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            storage,
            events,
            shutdown_tx,
            started_at: Utc::now(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, event: DependencyEvent) {
        // Err only means nobody is listening
        if self.events.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    /// Subscribe to the event feed.
    pub fn subscribe(&self) -> broadcast::Receiver<DependencyEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("started_at", &self.started_at)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeps::domain::{DependencyId, TaskId};
    use taskdeps::storage::in_memory::new_in_memory_storage;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let state = AppState::new(Arc::from(new_in_memory_storage()));
        let mut rx = state.subscribe();

        let event = DependencyEvent::DependencyRemoved {
            dependency_id: DependencyId(2),
            predecessor: TaskId(1),
            successor: TaskId(3),
        };
        state.publish(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let state = AppState::new(Arc::from(new_in_memory_storage()));
        state.publish(DependencyEvent::DependencyRemoved {
            dependency_id: DependencyId(2),
            predecessor: TaskId(1),
            successor: TaskId(3),
        });
    }
}
