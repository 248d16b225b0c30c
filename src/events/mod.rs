use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Domain events emitted after a write has committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    InventoryItemCreated {
        item_id: i32,
        name: String,
        quantity: i32,
    },
    InventoryItemMerged {
        item_id: i32,
        name: String,
        added: i32,
        quantity: i32,
    },
    InventoryItemUpdated {
        item_id: i32,
        status: String,
    },
    DetectionFrameProcessed {
        applied: usize,
        dropped: usize,
        failed: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::InventoryItemCreated { .. } => "inventory_item_created",
            Event::InventoryItemMerged { .. } => "inventory_item_merged",
            Event::InventoryItemUpdated { .. } => "inventory_item_updated",
            Event::DetectionFrameProcessed { .. } => "detection_frame_processed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when nobody is listening.
    pub async fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, error = %e, "event dropped");
            counter!("kitchen_events.dropped", 1);
        }
    }
}

/// Creates a bounded channel and the sender wrapper around it.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event, until every sender is gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("kitchen_events.processed", 1);
        match &event {
            Event::InventoryItemCreated {
                item_id,
                name,
                quantity,
            } => info!(item_id, %name, quantity, "inventory item created"),
            Event::InventoryItemMerged {
                item_id,
                name,
                added,
                quantity,
            } => info!(item_id, %name, added, quantity, "inventory quantity merged"),
            Event::InventoryItemUpdated { item_id, status } => {
                info!(item_id, %status, "inventory item updated")
            }
            Event::DetectionFrameProcessed {
                applied,
                dropped,
                failed,
                ..
            } => debug!(applied, dropped, failed, "detection frame processed"),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver_in_order() {
        let (sender, mut rx) = channel(4);
        sender
            .send(Event::InventoryItemUpdated {
                item_id: 1,
                status: "Good".into(),
            })
            .await
            .unwrap();
        sender
            .send_or_log(Event::InventoryItemCreated {
                item_id: 2,
                name: "lemon".into(),
                quantity: 1,
            })
            .await;

        assert_eq!(rx.recv().await.unwrap().name(), "inventory_item_updated");
        assert_eq!(rx.recv().await.unwrap().name(), "inventory_item_created");
    }

    #[tokio::test]
    async fn send_fails_once_the_receiver_is_gone() {
        let (sender, rx) = channel(1);
        drop(rx);

        let result = sender
            .send(Event::InventoryItemUpdated {
                item_id: 1,
                status: "Danger".into(),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn processor_exits_when_senders_drop() {
        let (sender, rx) = channel(2);
        let handle = tokio::spawn(process_events(rx));
        sender
            .send_or_log(Event::DetectionFrameProcessed {
                applied: 1,
                dropped: 0,
                failed: 0,
                at: Utc::now(),
            })
            .await;
        drop(sender);
        handle.await.unwrap();
    }
}
