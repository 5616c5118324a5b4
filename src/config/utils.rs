// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;

/// JSON schema embedded in the binary
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./modbus_bridge --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validate a configuration document (already converted to JSON) against the
/// embedded schema.
pub fn validate_against_schema(document: &serde_json::Value) -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let validator = jsonschema::draft202012::options()
        .should_validate_formats(true)
        .build(&schema)?;

    if let Err(error) = validator.validate(document) {
        anyhow::bail!("Configuration validation failed: {}", error);
    }
    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Bind address**: the Modbus address is an IP address or `localhost`
/// - **Register window**: at least two registers, and the whole window fits
///   below address `0xFFFF`
/// - **Remote endpoint**: `http://` or `https://` URL, non-zero timeout, data
///   key usable as a single path segment
/// - **Intervals**: finite, non-negative sleep times
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if !is_valid_ip_address(&config.modbus.address) {
        anyhow::bail!("Invalid Modbus address: {}", config.modbus.address);
    }

    if config.modbus.register_count < 2 {
        anyhow::bail!(
            "At least 2 registers are required to hold the float value, got {}",
            config.modbus.register_count
        );
    }

    let window_end = config.modbus.register_address as u32 + config.modbus.register_count as u32;
    if window_end > u16::MAX as u32 + 1 {
        anyhow::bail!(
            "Register window {}..{} exceeds the Modbus address space",
            config.modbus.register_address,
            window_end
        );
    }

    let url = &config.remote.url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("Invalid remote URL {}: must start with http:// or https://", url);
    }

    if config.remote.timeout_seconds == 0 {
        anyhow::bail!("Remote timeout must be at least 1 second");
    }

    let key = &config.remote.data_key;
    if key.is_empty() || key.contains('/') || key.contains('?') || key.contains('#') {
        anyhow::bail!("Invalid data key {:?}: must be a single URL path segment", key);
    }

    for (name, value) in [
        ("sleep_time", config.bridge.sleep_time),
        ("demo_interval", config.bridge.demo_interval),
    ] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("Invalid {}: {}", name, value);
        }
    }

    Ok(())
}
