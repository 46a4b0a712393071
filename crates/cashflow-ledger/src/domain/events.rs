//! Cash-flow change notifications.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Fired synchronously whenever a ledger's income or expense items change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowChanged {
    /// The player owning the ledger.
    pub player_id: Uuid,
    /// Sum of all income items after the change.
    pub total_income: f64,
    /// Sum of all expense items after the change.
    pub total_expenses: f64,
    /// `total_income - total_expenses` after the change.
    pub net_cash_flow: f64,
}

/// Subscriber to ledger changes. Called inside the mutating ledger call.
pub trait CashFlowObserver: Send + Sync {
    /// Handles one change.
    fn on_cash_flow_changed(&self, event: &CashFlowChanged);
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<CashFlowChanged>,
}

impl ChannelObserver {
    /// Creates an observer together with the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CashFlowChanged>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl CashFlowObserver for ChannelObserver {
    fn on_cash_flow_changed(&self, event: &CashFlowChanged) {
        if self.sender.send(event.clone()).is_err() {
            debug!(player_id = %event.player_id, "cash flow receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_events() {
        // Arrange
        let (observer, mut receiver) = ChannelObserver::channel();
        let event = CashFlowChanged {
            player_id: Uuid::new_v4(),
            total_income: 500.0,
            total_expenses: 200.0,
            net_cash_flow: 300.0,
        };

        // Act
        observer.on_cash_flow_changed(&event);

        // Assert
        assert_eq!(receiver.try_recv().unwrap(), event);
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (observer, receiver) = ChannelObserver::channel();
        drop(receiver);

        observer.on_cash_flow_changed(&CashFlowChanged {
            player_id: Uuid::new_v4(),
            total_income: 0.0,
            total_expenses: 0.0,
            net_cash_flow: 0.0,
        });
    }
}
