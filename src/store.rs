//! Shared selection slot with broadcast capabilities
//!
//! The selected asset id is the only value the three flows have in common.
//! It is written by list clicks and by successful searches, and read by the
//! chart. Writes happen one user action at a time; the last one wins.

use crate::{constants::EVENT_CHANNEL_CAPACITY, types::DashboardEvent};
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Holds the selected asset id and fans out dashboard events
pub struct SelectionStore {
    selected: RwLock<Option<String>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl SelectionStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            selected: RwLock::new(None),
            events,
        }
    }

    /// Replaces the selected asset id and announces the change
    ///
    /// Re-selecting the same id still counts as a change.
    pub async fn set_selected(&self, asset_id: Option<String>) {
        {
            let mut selected = self.selected.write().await;
            *selected = asset_id.clone();
        }
        tracing::debug!(asset_id = ?asset_id, "Selection changed");
        self.publish(DashboardEvent::SelectionChanged {
            id: Uuid::new_v4(),
            asset_id,
            timestamp: Utc::now(),
        });
    }

    pub async fn selected(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    /// Sends an event to every current subscriber
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: DashboardEvent) {
        tracing::trace!(event_type = event.event_type(), "Publishing dashboard event");
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = SelectionStore::new();
        assert_eq!(store.selected().await, None);

        store.set_selected(Some("bitcoin".into())).await;
        store.set_selected(Some("ethereum".into())).await;
        assert_eq!(store.selected().await.as_deref(), Some("ethereum"));

        store.set_selected(None).await;
        assert_eq!(store.selected().await, None);
    }

    #[tokio::test]
    async fn test_reselect_is_announced() {
        let store = SelectionStore::new();
        let mut rx = store.subscribe();

        store.set_selected(Some("bitcoin".into())).await;
        store.set_selected(Some("bitcoin".into())).await;

        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.event_type(), "SELECTION_CHANGED");
            assert_eq!(event.to_string(), "Selected bitcoin");
        }
    }
}
