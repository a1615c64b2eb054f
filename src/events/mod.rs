use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::entities::order::OrderStatus;

/// Change notifications emitted by the core after every write. Write
/// operations also return the updated record, so subscribers use this
/// channel for refresh hints rather than correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCheckedIn {
        order_id: Uuid,
        technician_id: Uuid,
        double_dip: bool,
    },
    OrderStatusChanged {
        order_id: Uuid,
        technician_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCompleted {
        order_id: Uuid,
        technician_id: Uuid,
    },
    OrderEdited {
        order_id: Uuid,
    },
    OrderDeleted {
        order_id: Uuid,
    },
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
}

/// Drains the notification channel, surfacing each write as a structured
/// log line. Downstream consumers (dashboards, sheet exporters) subscribe
/// here instead of watching the store.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match event {
            Event::OrderCheckedIn {
                order_id,
                technician_id,
                double_dip,
            } => {
                info!(
                    order_id = %order_id,
                    technician_id = %technician_id,
                    double_dip = double_dip,
                    "order checked in"
                );
            }
            Event::OrderStatusChanged {
                order_id,
                technician_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    technician_id = %technician_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "order status changed"
                );
            }
            Event::OrderCompleted {
                order_id,
                technician_id,
            } => {
                info!(order_id = %order_id, technician_id = %technician_id, "order completed");
            }
            Event::OrderEdited { order_id } => {
                info!(order_id = %order_id, "order edited");
            }
            Event::OrderDeleted { order_id } => {
                info!(order_id = %order_id, "order deleted");
            }
        }
    }
}
