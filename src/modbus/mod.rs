// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus communication module
//!
//! This module provides the simulated holding register bank and the Modbus
//! TCP server exposing it, so that external Modbus clients can watch the
//! values the bridge generates.
//!
//! ## Key Components
//!
//! - `RegisterBank`: the shared register cells, also the per-connection
//!   `tokio_modbus` service.
//! - `ModbusServer`: binds the TCP listener and serves the bank in the
//!   background.
//!
//! ## Register Map
//!
//! With the default configuration (`register_address: 0`, `register_count: 10`):
//!
//! - Registers 0-7: pseudo-random values in `[0, 100)`, refreshed every cycle
//! - Register 8: low word of the IEEE-754 float `1.0` (`0x0000`)
//! - Register 9: high word of the IEEE-754 float `1.0` (`0x3F80`)

pub mod modbus_server;
pub mod register_bank;

pub use modbus_server::ModbusServer;
pub use register_bank::{BankError, RegisterBank, RegisterStore};
