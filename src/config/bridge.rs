// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bridge loop configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the bridge does once the remote endpoint is reachable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    /// Simulate the registers and forward every change
    #[default]
    Registers,
    /// Exercise the storage and crypto endpoints at a fixed cadence
    Demo,
}

/// Settings of the bridge main loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub mode: BridgeMode,

    /// Pause between two register cycles, in seconds (`SLEEP_TIME`)
    pub sleep_time: f64,

    /// Pause between two demo cycles, in seconds
    pub demo_interval: f64,
}

impl BridgeConfig {
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs_f64(self.sleep_time.max(0.0))
    }

    pub fn demo_duration(&self) -> Duration {
        Duration::from_secs_f64(self.demo_interval.max(0.0))
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: BridgeMode::Registers,
            sleep_time: 2.0,
            demo_interval: 5.0,
        }
    }
}
