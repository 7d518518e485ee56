use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after successful writes. Consumers are
/// in-process only for now; the channel keeps handlers decoupled from
/// whatever ends up listening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MedicineCreated { medicine_id: Uuid },
    MedicineUpdated { medicine_id: Uuid },
    MedicineDeleted { medicine_id: Uuid },
    PharmacyRegistered { pharmacy_id: Uuid },
    PharmacyUpdated { pharmacy_id: Uuid },
    StockLineAdded { pharmacy_id: Uuid, medicine_id: Uuid },
    StockLineUpdated { pharmacy_id: Uuid, inventory_id: Uuid },
    StockLineRemoved { pharmacy_id: Uuid, inventory_id: Uuid },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget publish. A full or closed channel must never fail
    /// a write that already committed, so failures are only logged.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.tx.send(event).await {
            warn!("failed to publish event: {}", e);
        }
    }
}

/// Drains the event channel for the lifetime of the process.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        info!(?event, "processing event");
    }
    info!("event channel closed, processor shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender.send(Event::MedicineCreated { medicine_id: id }).await;
        assert_eq!(rx.recv().await, Some(Event::MedicineCreated { medicine_id: id }));
    }

    #[tokio::test]
    async fn send_on_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender
            .send(Event::PharmacyRegistered { pharmacy_id: Uuid::new_v4() })
            .await;
    }
}
