// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP server and register bank configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Modbus TCP server and the simulated register window.
///
/// # Example
///
/// ```
/// use modbus_bridge::config::ModbusConfig;
///
/// let modbus_config = ModbusConfig {
///     address: "0.0.0.0".to_string(),
///     port: 1502,
///     register_address: 100,
///     register_count: 4,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModbusConfig {
    /// The network address the Modbus server will bind to.
    ///
    /// Default is "127.0.0.1". Use "0.0.0.0" to bind to all IPv4 interfaces.
    pub address: String,

    /// The TCP port the Modbus server will listen on (default: 12345).
    ///
    /// `0` asks the operating system for a free port.
    pub port: u16,

    /// First holding register of the simulated bank (`REG_ADDR`)
    pub register_address: u16,

    /// Number of simulated holding registers (`REG_NB`).
    ///
    /// The last two always hold the float `1.0`, so at least two are required.
    pub register_count: u16,
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 12345,
            register_address: 0,
            register_count: 10,
        }
    }
}
