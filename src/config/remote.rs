// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Remote storage endpoint configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URL used when none is configured
pub const DEFAULT_REMOTE_URL: &str = "http://localhost:5000";

/// Where detected changes are delivered.
///
/// The endpoint is read once at startup and stays fixed for the lifetime of
/// the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote endpoint, `http://` or `https://`
    pub url: String,

    /// Timeout applied to every request, in seconds
    pub timeout_seconds: u64,

    /// Key under which change messages are stored (`POST {url}/data/{data_key}`)
    pub data_key: String,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REMOTE_URL.to_string(),
            timeout_seconds: 5,
            data_key: "modbus_registers".to_string(),
        }
    }
}
