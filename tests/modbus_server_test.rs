// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests for the Modbus server hosting the simulated register bank
//!
//! These tests start a server instance on an OS assigned port and connect to
//! it with a Modbus client, checking that the values the bridge writes are
//! visible over Modbus TCP and that the port is released on stop.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time;
use tokio_modbus::prelude::*;

use modbus_bridge::modbus::{ModbusServer, RegisterBank};
use modbus_bridge::simulation::{decode_float, ValueGenerator};

/// Start a server for a bank of `count` registers at `base`
async fn start_test_server(
    base: u16,
    count: u16,
) -> Result<(ModbusServer, RegisterBank), Box<dyn std::error::Error>> {
    let bank = RegisterBank::new(base, count);
    let server = ModbusServer::start("127.0.0.1", 0, bank.clone()).await?;
    println!("Test server started on: {}", server.local_addr());

    // Give the server a moment to start
    time::sleep(Duration::from_millis(50)).await;

    Ok((server, bank))
}

#[tokio::test]
async fn test_generated_values_visible_over_modbus() -> Result<(), Box<dyn std::error::Error>> {
    let (server, bank) = start_test_server(0, 10).await?;

    let values = ValueGenerator::seeded(99).generate(10);
    bank.set(0, &values)?;

    let mut ctx = tcp::connect(server.local_addr()).await?;
    let data = ctx.read_holding_registers(0, 10).await??;

    assert_eq!(data, values);
    assert_eq!(decode_float(data[8], data[9]), 1.0);

    ctx.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_input_registers_mirror_holding_registers() -> Result<(), Box<dyn std::error::Error>> {
    let (server, bank) = start_test_server(100, 4).await?;
    bank.set(100, &[1, 2, 0x0000, 0x3F80])?;

    let mut ctx = tcp::connect(server.local_addr()).await?;
    let data = ctx.read_input_registers(100, 4).await??;
    assert_eq!(data, vec![1, 2, 0x0000, 0x3F80]);

    ctx.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_client_writes_reach_the_bank() -> Result<(), Box<dyn std::error::Error>> {
    let (server, bank) = start_test_server(0, 4).await?;

    let mut ctx = tcp::connect(server.local_addr()).await?;
    ctx.write_single_register(2, 999).await??;
    ctx.write_multiple_registers(0, &[101, 202]).await??;

    assert_eq!(bank.get(0, 4), Some(vec![101, 202, 999, 0]));

    ctx.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_invalid_register_address() -> Result<(), Box<dyn std::error::Error>> {
    let (server, _bank) = start_test_server(0, 4).await?;

    let mut ctx = tcp::connect(server.local_addr()).await?;
    let result = ctx.read_holding_registers(2, 4).await?;
    assert!(matches!(result, Err(ExceptionCode::IllegalDataAddress)));

    ctx.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_function() -> Result<(), Box<dyn std::error::Error>> {
    let (server, _bank) = start_test_server(0, 4).await?;

    let mut ctx = tcp::connect(server.local_addr()).await?;
    let result = ctx.read_coils(0, 1).await?;
    assert!(matches!(result, Err(ExceptionCode::IllegalFunction)));

    ctx.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_multiple_clients_share_cells() -> Result<(), Box<dyn std::error::Error>> {
    let (server, _bank) = start_test_server(0, 8).await?;

    let mut client1 = tcp::connect(server.local_addr()).await?;
    let mut client2 = tcp::connect(server.local_addr()).await?;

    client1.write_single_register(5, 888).await??;
    time::sleep(Duration::from_millis(50)).await;
    let data = client2.read_holding_registers(5, 1).await??;
    assert_eq!(data, vec![888]);

    client1.disconnect().await?;
    client2.disconnect().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_stop_releases_port() -> Result<(), Box<dyn std::error::Error>> {
    let (server, _bank) = start_test_server(0, 2).await?;
    let addr = server.local_addr();
    assert!(server.is_running());

    server.stop().await;

    let listener = TcpListener::bind(addr).await?;
    assert_eq!(listener.local_addr()?, addr);
    Ok(())
}

#[tokio::test]
async fn test_bind_conflict_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let (server, _bank) = start_test_server(0, 2).await?;
    let port = server.local_addr().port();

    let result = ModbusServer::start("127.0.0.1", port, RegisterBank::new(0, 2)).await;
    assert!(result.is_err());

    server.stop().await;
    Ok(())
}
