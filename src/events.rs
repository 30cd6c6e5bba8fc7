// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet event channel.
//!
//! The watcher publishes one [`TransactionActivity`] per address and sweep
//! when new confirmed activity exists. Subscribers receive events through a
//! broadcast channel; events emitted while nobody listens are dropped, and
//! a new subscriber only sees activity from after it subscribed.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::blockchain::types::{NativeTransaction, Trc20Transfer};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// New confirmed activity observed for a watched address.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionActivity {
    /// The watched address the activity belongs to
    pub address: String,
    /// New confirmed transactions since the previous sweep
    pub transactions: ActivityTransactions,
    /// Account snapshot taken with the sweep, when the query succeeded
    pub balance: Option<AccountBalance>,
}

/// The transaction records behind an activity event, serialized under the
/// API's own field names.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityTransactions {
    /// Native TRX transactions
    pub trx: Vec<NativeTransaction>,
    /// TRC-20 transfers
    pub trc20: Vec<Trc20Transfer>,
}

/// Balance snapshot attached to an activity event.
#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    /// TRX balance in sun
    pub trx: i64,
    /// TRC-20 holdings, one `{contract: amount}` entry per token
    pub trc20: Vec<Value>,
}

/// Fan-out sender for wallet activity events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TransactionActivity>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Deliver an event to all current subscribers.
    pub fn emit(&self, event: TransactionActivity) {
        let _ = self.sender.send(event);
    }

    /// Open a new subscription starting at the present moment.
    pub fn subscribe(&self) -> broadcast::Receiver<TransactionActivity> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(address: &str) -> TransactionActivity {
        TransactionActivity {
            address: address.to_string(),
            transactions: ActivityTransactions {
                trx: vec![NativeTransaction {
                    tx_id: "aa".repeat(32),
                    ..NativeTransaction::default()
                }],
                trc20: vec![],
            },
            balance: Some(AccountBalance {
                trx: 1_000_000,
                trc20: vec![],
            }),
        }
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.emit(activity("TAddr"));
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(activity("TAddr"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.address, "TAddr");
        assert_eq!(event.transactions.trx.len(), 1);
        assert_eq!(event.balance.as_ref().unwrap().trx, 1_000_000);
    }

    #[tokio::test]
    async fn every_subscriber_gets_its_own_copy() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(activity("TAddr"));

        assert_eq!(a.recv().await.unwrap().address, "TAddr");
        assert_eq!(b.recv().await.unwrap().address, "TAddr");
    }

    #[tokio::test]
    async fn late_subscribers_do_not_replay_history() {
        let bus = EventBus::new();
        bus.emit(activity("TAddr"));

        let mut rx = bus.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn activity_serializes_with_wire_field_names() {
        let event = activity("TAddr");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["address"], "TAddr");
        assert_eq!(value["transactions"]["trx"][0]["txID"], "aa".repeat(32));
        assert!(value["transactions"]["trc20"].is_array());
        assert_eq!(value["balance"]["trx"], 1_000_000);
    }
}
