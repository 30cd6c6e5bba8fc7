// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tronwatch::config::{self, WalletConfig};
use tronwatch::wallet::TronWallet;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match WalletConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    let wallet = match TronWallet::new(&config.mnemonic, config.network) {
        Ok(wallet) => wallet,
        Err(e) => {
            error!(error = %e, "Failed to set up wallet");
            return ExitCode::FAILURE;
        }
    };

    for &index in &config.hd_indexes {
        match wallet.hd_address(index) {
            Ok(address) => info!(index, address = %address, "Watching HD address"),
            Err(e) => {
                error!(index, error = %e, "HD derivation failed");
                return ExitCode::FAILURE;
            }
        }
    }
    wallet.watch_addresses(&config.watch_addresses);

    // Subscribe before the first sweep so nothing is missed.
    let mut events = wallet.subscribe();

    let start_ms = config
        .poll_start_ms
        .unwrap_or_else(|| Utc::now().timestamp_millis());

    info!(
        network = config.network.config().name,
        addresses = wallet.watch_set().len(),
        cursor_ms = start_ms,
        "Starting transaction watcher"
    );
    wallet.start_polling(start_ms);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(activity) => {
                    info!(
                        address = %activity.address,
                        native = activity.transactions.trx.len(),
                        trc20 = activity.transactions.trc20.len(),
                        balance = activity.balance.as_ref().map(|b| b.trx),
                        "New confirmed activity"
                    );
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    wallet.stop_polling();
    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if config::log_format().eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
