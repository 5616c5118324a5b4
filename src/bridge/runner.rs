// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register polling loop
//!
//! Each cycle generates fresh register values, writes them to the bank, reads
//! them back and compares the read with the last delivered snapshot. A change
//! is sent to the remote sink and only committed once the sink acknowledged
//! it, so an unreachable endpoint is retried on every following cycle that
//! reads a differing snapshot.
//!
//! Cycles never overlap: a slow endpoint delays the next cycle by the time
//! the request takes, up to the client timeout.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time;

use super::{health::health_gate, state::Lifecycle, BridgeError, BridgeState};
use crate::config::Config;
use crate::delivery::RemoteSink;
use crate::modbus::{ModbusServer, RegisterBank, RegisterStore};
use crate::simulation::{ChangeDetector, PriorState, Snapshot, SnapshotSource, ValueGenerator};

/// Result of a single polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The bank read-back returned no data, nothing was compared or sent
    ReadFailed,
    /// The snapshot equals the last delivered one
    Unchanged,
    /// The change was acknowledged by the sink and committed
    Delivered,
    /// The change could not be delivered, prior state left untouched
    DeliveryFailed,
}

/// Why and when the bridge stopped
#[derive(Debug)]
pub struct ShutdownReport {
    pub reason: BridgeError,
    pub cycles: u64,
    pub deliveries: u64,
}

/// The register polling controller.
///
/// Owns the prior state through its [`ChangeDetector`], nothing is shared
/// between cycles outside of this struct.
pub struct Bridge<S, G, B = RegisterBank> {
    bank: B,
    sink: S,
    source: G,
    detector: ChangeDetector,
    data_key: String,
    sleep: Duration,
    cycles: u64,
    deliveries: u64,
}

impl<S: RemoteSink, G: SnapshotSource, B: RegisterStore> Bridge<S, G, B> {
    pub fn new(
        bank: B,
        sink: S,
        source: G,
        data_key: impl Into<String>,
        sleep: Duration,
    ) -> Self {
        Self {
            bank,
            sink,
            source,
            detector: ChangeDetector::new(),
            data_key: data_key.into(),
            sleep,
            cycles: 0,
            deliveries: 0,
        }
    }

    pub fn prior_state(&self) -> &PriorState {
        self.detector.prior()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one generate, write, read back, compare, deliver cycle.
    ///
    /// # Errors
    ///
    /// Only bank write faults are returned, delivery failures are reported
    /// through [`CycleOutcome::DeliveryFailed`].
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, BridgeError> {
        self.cycles += 1;
        let base = self.bank.base_address();
        let count = self.bank.count();

        let values = self.source.next_values(count as usize);
        self.bank.set(base, &values)?;

        let snapshot = match self.bank.get(base, count) {
            Some(current) if !current.is_empty() => Snapshot::new(current),
            _ => {
                warn!("Register read-back returned no data, skipping cycle {}", self.cycles);
                return Ok(CycleOutcome::ReadFailed);
            }
        };

        let message = match self.detector.detect(&snapshot) {
            Some(message) => message,
            None => {
                debug!("Cycle {}: registers unchanged", self.cycles);
                return Ok(CycleOutcome::Unchanged);
            }
        };

        match self.sink.store_data(&self.data_key, message.text()).await {
            Ok(ack) => {
                println!("✓ Stored message: {}", message);
                debug!("Remote acknowledgement: {}", ack);
                self.detector.commit(message.into_snapshot());
                self.deliveries += 1;
                Ok(CycleOutcome::Delivered)
            }
            Err(e) => {
                println!("✗ Failed to store message");
                warn!("Delivery of cycle {} failed: {}", self.cycles, e);
                Ok(CycleOutcome::DeliveryFailed)
            }
        }
    }

    /// Cycle until a fault occurs and return it.
    ///
    /// The loop also stops when the Modbus server task is no longer running.
    pub async fn run(&mut self, server: &ModbusServer) -> BridgeError {
        loop {
            if !server.is_running() {
                return BridgeError::ServerStopped;
            }
            if let Err(fault) = self.run_cycle().await {
                return fault;
            }
            time::sleep(self.sleep).await;
        }
    }

    fn report(&self, reason: BridgeError) -> ShutdownReport {
        ShutdownReport {
            reason,
            cycles: self.cycles,
            deliveries: self.deliveries,
        }
    }
}

/// Run the register bridge with randomly generated values.
///
/// See [`launch_with_source`].
pub async fn launch<S: RemoteSink>(
    config: &Config,
    sink: S,
) -> Result<ShutdownReport, BridgeError> {
    launch_with_source(config, sink, ValueGenerator::new()).await
}

/// Drive the bridge through its whole lifecycle.
///
/// Returns `Err` only for startup failures (bind error, unavailable remote);
/// a fault while running is turned into a [`ShutdownReport`] after the Modbus
/// server has been stopped.
pub async fn launch_with_source<S: RemoteSink, G: SnapshotSource>(
    config: &Config,
    sink: S,
    source: G,
) -> Result<ShutdownReport, BridgeError> {
    let mut lifecycle = Lifecycle::new();

    let bank = RegisterBank::new(config.modbus.register_address, config.modbus.register_count);
    println!("Start server...");
    let server =
        match ModbusServer::start(&config.modbus.address, config.modbus.port, bank.clone()).await {
            Ok(server) => server,
            Err(err) => {
                lifecycle.advance(BridgeState::Stopped);
                return Err(BridgeError::Bind {
                    address: format!("{}:{}", config.modbus.address, config.modbus.port),
                    source: err,
                });
            }
        };
    println!("Server is online");

    lifecycle.advance(BridgeState::HealthChecking);
    if let Err(e) = health_gate(&sink).await {
        server.stop().await;
        lifecycle.advance(BridgeState::Stopped);
        return Err(e);
    }

    lifecycle.advance(BridgeState::Running);
    let mut bridge = Bridge::new(
        bank,
        sink,
        source,
        config.remote.data_key.clone(),
        config.bridge.sleep_duration(),
    );
    let fault = bridge.run(&server).await;

    lifecycle.advance(BridgeState::ShuttingDown);
    error!("Shutdown server ... {}", fault);
    println!("Shutdown server ... {}", fault);
    server.stop().await;
    println!("Server is offline");
    lifecycle.advance(BridgeState::Stopped);

    let report = bridge.report(fault);
    info!(
        "Bridge stopped after {} cycles and {} deliveries",
        report.cycles, report.deliveries
    );
    Ok(report)
}
