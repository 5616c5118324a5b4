// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the Modbus register bridge
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use modbus_bridge::bridge::{self, BridgeError};
use modbus_bridge::config::{self, BridgeMode, Config};
use modbus_bridge::delivery::{CryptoOperation, DeliveryClient};

/// Simulated Modbus holding registers forwarding every change to a remote store
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Modbus server address
    #[arg(long)]
    modbus_address: Option<String>,

    /// Modbus server port
    #[arg(long)]
    modbus_port: Option<u16>,

    /// First simulated holding register
    #[arg(long)]
    register_address: Option<u16>,

    /// Number of simulated holding registers
    #[arg(long)]
    register_count: Option<u16>,

    /// Base URL of the remote storage endpoint
    #[arg(long)]
    remote_url: Option<String>,

    /// Seconds between two register cycles
    #[arg(long)]
    sleep_time: Option<f64>,

    /// Run the storage/crypto demo instead of the register bridge
    #[arg(long)]
    demo: bool,

    /// Probe the remote endpoint health and exit
    #[arg(long)]
    check_health: bool,

    /// Run a single crypto operation on the remote endpoint and exit
    #[arg(long, value_enum)]
    crypto: Option<CryptoOperation>,

    /// Input data of the crypto operation (sha256)
    #[arg(long, requires = "crypto")]
    crypto_data: Option<String>,

    /// Length of the crypto operation result (random_hex, random_base64, token)
    #[arg(long, requires = "crypto")]
    crypto_length: Option<usize>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if args.show_config_schema {
        config::output_config_schema()?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            anyhow::bail!(
                "Configuration file does not exist: {}",
                validate_path.display()
            );
        }
        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {:#}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    config.apply_args(
        args.modbus_address.clone(),
        args.modbus_port,
        args.register_address,
        args.register_count,
        args.remote_url.clone(),
        args.sleep_time,
        args.demo,
    );
    config.validate()?;

    let client = DeliveryClient::new(&config.remote.url, config.remote.timeout());

    if args.check_health {
        return Ok(if client.health_check().await {
            println!("✓ Remote endpoint {} is available", client.base_url());
            ExitCode::SUCCESS
        } else {
            println!("✗ Remote endpoint {} is not available", client.base_url());
            ExitCode::FAILURE
        });
    }

    if let Some(operation) = args.crypto {
        let response = client
            .crypto_operation(operation, args.crypto_data.as_deref(), args.crypto_length)
            .await?;
        return Ok(match (response.success, response.data) {
            (true, Some(data)) => {
                println!("✓ {}: {}", data.operation, data.result);
                ExitCode::SUCCESS
            }
            _ => {
                println!(
                    "✗ {} failed: {}",
                    operation.as_str(),
                    response.error.unwrap_or_default()
                );
                ExitCode::FAILURE
            }
        });
    }

    println!("HTTP bridge to {} starting...", config.remote.url);

    let outcome = match config.bridge.mode {
        BridgeMode::Registers => bridge::launch(&config, client).await.map(|report| {
            info!(
                "Bridge stopped: {} ({} cycles, {} deliveries)",
                report.reason, report.cycles, report.deliveries
            );
        }),
        BridgeMode::Demo => bridge::launch_demo(&config, client).await,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(report_startup_failure(&err)),
    }
}

fn report_startup_failure(err: &BridgeError) -> ExitCode {
    match err {
        BridgeError::RemoteUnavailable { endpoint } => {
            println!("Error: remote server is not running at {}", endpoint);
            println!("Please start the storage server first!");
        }
        other => println!("Error: {}", other),
    }
    ExitCode::from(err.exit_code().clamp(1, 255) as u8)
}
