// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the Modbus bridge
//!
//! The configuration is backed by a YAML file and validated against a JSON
//! schema embedded in the binary, then against a few rules the schema cannot
//! express (see [`utils::validate_specific_rules`]).
//!
//! ## Configuration Structure
//!
//! - `modbus`: Modbus TCP server binding and simulated register window
//! - `remote`: remote storage endpoint, timeout and data key
//! - `bridge`: main loop mode and cadence
//!
//! ## Usage
//!
//! ```no_run
//! use modbus_bridge::config::Config;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file("config.yaml").unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some("0.0.0.0".to_string()),             // Modbus address
//!     Some(1502),                              // Modbus port
//!     None,                                    // Register address
//!     Some(4),                                 // Register count
//!     Some("http://10.0.0.2:5000".to_string()), // Remote URL
//!     Some(0.5),                               // Sleep time
//!     false,                                   // Demo mode
//! );
//!
//! println!("Modbus port: {}", config.modbus.port);
//! ```

pub mod bridge;
pub mod modbus;
pub mod remote;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use bridge::{BridgeConfig, BridgeMode};
pub use modbus::ModbusConfig;
pub use remote::{RemoteConfig, DEFAULT_REMOTE_URL};
pub use utils::{is_valid_ip_address, output_config_schema};

/// Root configuration structure of the bridge.
///
/// Each section uses default values when not explicitly specified in the
/// configuration file, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Modbus TCP server and register bank settings.
    #[serde(default)]
    pub modbus: ModbusConfig,

    /// Remote endpoint receiving the change messages.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Bridge main loop settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. A file that
    /// fails validation produces a `*.sample.yaml` next to it and an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        Self::from_yaml_str(&contents).or_else(|err| {
            error!("Configuration error in {}: {}", path.display(), err);
            if let Err(e) = Self::create_sample_config(path) {
                error!("Failed to create sample config: {}", e);
            }
            Err(err.context(format!("Invalid configuration file {}", path.display())))
        })
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty document is null in YAML, which means "all defaults"
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;
        let json_value = match serde_json::to_value(&yaml_value)
            .context("Failed to convert YAML to JSON for validation")?
        {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };

        debug!("Validating configuration against schema");
        utils::validate_against_schema(&json_value)?;

        let config: Config = serde_json::from_value(json_value)
            .context("Failed to deserialize configuration")?;

        utils::validate_specific_rules(&config)?;
        Ok(config)
    }

    /// Validate an in-memory configuration, e.g. after command line overrides
    pub fn validate(&self) -> Result<()> {
        let json_value =
            serde_json::to_value(self).context("Failed to serialize configuration")?;
        utils::validate_against_schema(&json_value)?;
        utils::validate_specific_rules(self)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration. `demo` switches the bridge to demo mode, it never
    /// switches it back.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_args(
        &mut self,
        modbus_address: Option<String>,
        modbus_port: Option<u16>,
        register_address: Option<u16>,
        register_count: Option<u16>,
        remote_url: Option<String>,
        sleep_time: Option<f64>,
        demo: bool,
    ) {
        if let Some(address) = modbus_address {
            debug!("Overriding Modbus address from command line: {}", address);
            self.modbus.address = address;
        }
        if let Some(port) = modbus_port {
            debug!("Overriding Modbus port from command line: {}", port);
            self.modbus.port = port;
        }
        if let Some(register_address) = register_address {
            debug!(
                "Overriding register address from command line: {}",
                register_address
            );
            self.modbus.register_address = register_address;
        }
        if let Some(register_count) = register_count {
            debug!(
                "Overriding register count from command line: {}",
                register_count
            );
            self.modbus.register_count = register_count;
        }
        if let Some(url) = remote_url {
            debug!("Overriding remote URL from command line: {}", url);
            self.remote.url = url;
        }
        if let Some(sleep_time) = sleep_time {
            debug!("Overriding sleep time from command line: {}", sleep_time);
            self.bridge.sleep_time = sleep_time;
        }
        if demo {
            self.bridge.mode = BridgeMode::Demo;
        }
    }
}
