// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Interactive demo mode
//!
//! Instead of simulating registers, the demo exercises every remote endpoint
//! at a fixed cadence: store a timestamped greeting, draw a random hex
//! string, and hash the timestamp.

use chrono::Local;
use log::{info, warn};
use tokio::time;

use super::{health::health_gate, state::Lifecycle, BridgeError, BridgeState};
use crate::config::Config;
use crate::delivery::{ApiResponse, CryptoOperation, CryptoResult, DeliveryClient, DeliveryError};
use crate::simulation::TIMESTAMP_FORMAT;

/// Length in bytes of the random value requested each demo cycle
pub const DEMO_RANDOM_LENGTH: usize = 16;

/// What one demo cycle obtained from the remote endpoint
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub stored_message: Option<String>,
    pub random_hex: Option<String>,
    pub timestamp_hash: Option<String>,
}

impl DemoReport {
    pub fn all_succeeded(&self) -> bool {
        self.stored_message.is_some() && self.random_hex.is_some() && self.timestamp_hash.is_some()
    }
}

/// Run one demo cycle stamped with `timestamp`.
///
/// Every step runs even if a previous one failed.
pub async fn run_demo_cycle(client: &DeliveryClient, key: &str, timestamp: &str) -> DemoReport {
    let mut report = DemoReport::default();

    let message = format!("Hello from bridge at {}", timestamp);
    match client.store_data(key, &message).await {
        Ok(_) => {
            println!("✓ Stored message: {}", message);
            report.stored_message = Some(message);
        }
        Err(_) => println!("✗ Failed to store message"),
    }

    match crypto_result(
        client
            .crypto_operation(CryptoOperation::RandomHex, None, Some(DEMO_RANDOM_LENGTH))
            .await,
    ) {
        Some(hex_value) => {
            println!("✓ Generated hex: {}", hex_value);
            report.random_hex = Some(hex_value);
        }
        None => println!("✗ Failed to generate hex"),
    }

    match crypto_result(
        client
            .crypto_operation(CryptoOperation::Sha256, Some(timestamp), None)
            .await,
    ) {
        Some(hash_value) => {
            let prefix: String = hash_value.chars().take(16).collect();
            println!("✓ SHA256 of timestamp: {}...", prefix);
            report.timestamp_hash = Some(hash_value);
        }
        None => println!("✗ Failed to create hash"),
    }

    println!("--- Cycle completed at {} ---", timestamp);
    report
}

fn crypto_result(
    response: Result<ApiResponse<CryptoResult>, DeliveryError>,
) -> Option<String> {
    match response {
        Ok(response) if response.success => response.data.map(|data| data.result),
        Ok(response) => {
            warn!(
                "Crypto operation rejected: {}",
                response.error.unwrap_or_else(|| "no reason given".to_string())
            );
            None
        }
        Err(_) => None,
    }
}

/// Health-check the endpoint, then run demo cycles forever.
///
/// Only returns on a failed health check.
pub async fn launch_demo(config: &Config, client: DeliveryClient) -> Result<(), BridgeError> {
    let mut lifecycle = Lifecycle::new();
    lifecycle.advance(BridgeState::HealthChecking);
    if let Err(e) = health_gate(&client).await {
        lifecycle.advance(BridgeState::Stopped);
        return Err(e);
    }
    lifecycle.advance(BridgeState::Running);

    info!(
        "Demo mode: one cycle every {:?} against {}",
        config.bridge.demo_duration(),
        client.base_url()
    );
    loop {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        run_demo_cycle(&client, &config.remote.data_key, &timestamp).await;
        time::sleep(config.bridge.demo_duration()).await;
    }
}
