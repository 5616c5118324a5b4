// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Bridge Module
//!
//! Lifecycle of the bridge process: bind the Modbus server, probe the remote
//! endpoint once, then poll the simulated registers and forward every change
//! until a fault stops the loop.
//!
//! ## Usage
//!
//! ```no_run
//! use modbus_bridge::{bridge, config::Config, delivery::DeliveryClient};
//!
//! async fn run() -> Result<(), bridge::BridgeError> {
//!     let config = Config::default();
//!     let client = DeliveryClient::new(&config.remote.url, config.remote.timeout());
//!
//!     let report = bridge::launch(&config, client).await?;
//!     println!("stopped: {}", report.reason);
//!     Ok(())
//! }
//! ```

pub mod demo;
mod error;
pub mod health;
pub mod runner;
pub mod state;

pub use demo::{launch_demo, run_demo_cycle, DemoReport};
pub use error::BridgeError;
pub use health::health_gate;
pub use runner::{launch, launch_with_source, Bridge, CycleOutcome, ShutdownReport};
pub use state::{BridgeState, Lifecycle};
