// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Watcher
//!
//! Background task that sweeps the TronGrid API for confirmed activity on
//! the watched addresses and publishes one [`TransactionActivity`] event per
//! address and sweep when new records exist.
//!
//! ## Strategy
//!
//! Every `poll_interval` (default 60 s) the watcher:
//! 1. Captures the next cursor as "now minus the backdate window" before
//!    any query runs, so records that confirm while the sweep is in flight
//!    fall inside the next window.
//! 2. Queries native transactions and TRC-20 transfers for every watched
//!    address, filtered to confirmed records at or after the previous
//!    cursor.
//! 3. When either listing has records, fetches the account snapshot and
//!    emits the event.
//! 4. Advances the cursor. Consecutive windows overlap by the backdate, so
//!    a record can be delivered twice but is never skipped; `txID` gives
//!    subscribers a dedup key.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown. `stop`
//! cancels the token; the sweep also checks it between addresses so a long
//! address list ends early.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::events::{AccountBalance, ActivityTransactions, EventBus, TransactionActivity};
use crate::providers::trongrid::TronGridClient;

/// Default interval between polling sweeps.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// How far behind the wall clock each window starts. Confirmation takes
/// around 19 blocks, usually 90 seconds; the extra buffer covers slow ones.
const DEFAULT_BACKDATE_WINDOW: Duration = Duration::from_secs(3 * 60);

/// Shared, idempotent collection of watched addresses.
///
/// Addresses are compared by exact string equality. Base58check is case
/// sensitive, so no normalization is applied.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    addresses: Arc<RwLock<HashSet<String>>>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address to the set. Returns whether the set grew; re-adding
    /// an existing address is a no-op.
    pub fn add(&self, address: &str) -> bool {
        if let Ok(mut set) = self.addresses.write() {
            set.insert(address.to_string())
        } else {
            false
        }
    }

    /// Add several addresses at once.
    pub fn add_all(&self, addresses: &[String]) {
        if let Ok(mut set) = self.addresses.write() {
            for address in addresses {
                set.insert(address.clone());
            }
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses
            .read()
            .map(|set| set.contains(address))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.addresses.read().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The addresses to sweep, in arbitrary order.
    pub fn snapshot(&self) -> Vec<String> {
        self.addresses
            .read()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Lifecycle state of the watcher loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatcherState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Default)]
struct WatcherControl {
    state: WatcherState,
    shutdown: Option<CancellationToken>,
}

/// Confirmed-activity watcher that runs as a background tokio task.
#[derive(Clone)]
pub struct TransactionWatcher {
    trongrid: Arc<TronGridClient>,
    watch: WatchSet,
    events: EventBus,
    control: Arc<Mutex<WatcherControl>>,
    poll_interval: Duration,
    backdate_window: Duration,
}

impl TransactionWatcher {
    /// Create a watcher over the given API client, watch set and event bus.
    pub fn new(trongrid: Arc<TronGridClient>, watch: WatchSet, events: EventBus) -> Self {
        Self {
            trongrid,
            watch,
            events,
            control: Arc::new(Mutex::new(WatcherControl::default())),
            poll_interval: DEFAULT_POLL_INTERVAL,
            backdate_window: DEFAULT_BACKDATE_WINDOW,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatcherState {
        self.control.lock().map(|c| c.state).unwrap_or_default()
    }

    /// Start the polling loop as a background task.
    ///
    /// The first sweep picks up records at or after `initial_cursor_ms`
    /// (unix millis); any past timestamp works. Starting a watcher that is
    /// already running is a no-op.
    pub fn start(&self, initial_cursor_ms: i64) {
        let token = match self.control.lock() {
            Ok(mut control) => {
                if control.state == WatcherState::Running {
                    warn!("Transaction watcher already running, ignoring start");
                    return;
                }
                let token = CancellationToken::new();
                control.state = WatcherState::Running;
                control.shutdown = Some(token.clone());
                token
            }
            Err(_) => return,
        };

        info!(
            interval_secs = self.poll_interval.as_secs(),
            addresses = self.watch.len(),
            cursor_ms = initial_cursor_ms,
            "Transaction watcher starting"
        );

        let watcher = self.clone();
        tokio::spawn(watcher.run(token, initial_cursor_ms));
    }

    /// Stop the polling loop. Safe to call on a stopped watcher.
    pub fn stop(&self) {
        if let Ok(mut control) = self.control.lock() {
            if let Some(token) = control.shutdown.take() {
                token.cancel();
                info!("Transaction watcher stop requested");
            }
            control.state = WatcherState::Stopped;
        }
    }

    /// Run the polling loop until the cancellation token is triggered.
    async fn run(self, shutdown: CancellationToken, mut cursor_ms: i64) {
        loop {
            if shutdown.is_cancelled() {
                info!("Transaction watcher shutting down");
                return;
            }

            cursor_ms = self.poll_sweep(cursor_ms, &shutdown).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Transaction watcher shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep over every watched address and return the cursor
    /// for the next sweep.
    ///
    /// The next cursor is captured before the queries run and applies no
    /// matter how the sweep went; a failed address never holds the window
    /// back for the others.
    async fn poll_sweep(&self, cursor_ms: i64, shutdown: &CancellationToken) -> i64 {
        let next_cursor_ms =
            Utc::now().timestamp_millis() - self.backdate_window.as_millis() as i64;

        for address in self.watch.snapshot() {
            if shutdown.is_cancelled() {
                break;
            }
            self.sweep_address(&address, cursor_ms).await;
        }

        next_cursor_ms
    }

    /// Query one address and emit an event when new activity exists.
    async fn sweep_address(&self, address: &str, min_timestamp: i64) {
        let native = match self
            .trongrid
            .account_transactions(address, min_timestamp)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(address = %address, error = %e, "Watcher: transaction query failed");
                return;
            }
        };

        let trc20 = match self
            .trongrid
            .account_trc20_transfers(address, min_timestamp)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(address = %address, error = %e, "Watcher: TRC-20 query failed");
                return;
            }
        };

        if !native.has_records() && !trc20.has_records() {
            return;
        }

        // The snapshot rides along with the event. A failed snapshot query
        // drops the whole event; the records come back next sweep through
        // the overlapping window. An unsuccessful or empty snapshot body
        // still emits, with no balance attached.
        let balance = match self.trongrid.account_info(address).await {
            Ok(page) if page.has_records() => page.data.into_iter().next().map(|info| {
                AccountBalance {
                    trx: info.balance,
                    trc20: info.trc20,
                }
            }),
            Ok(_) => None,
            Err(e) => {
                warn!(address = %address, error = %e, "Watcher: account snapshot query failed");
                return;
            }
        };

        info!(
            address = %address,
            native = native.data.len(),
            trc20 = trc20.data.len(),
            "Watcher: new confirmed activity"
        );

        self.events.emit(TransactionActivity {
            address: address.to_string(),
            transactions: ActivityTransactions {
                trx: native.data,
                trc20: trc20.data,
            },
            balance,
        });
    }
}
