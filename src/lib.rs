// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus bridge library
//!
//! Simulates a bank of Modbus holding registers, detects changes between
//! consecutive register snapshots and forwards each change to a remote HTTP
//! storage endpoint.

pub mod bridge;
pub mod config;
pub mod delivery;
pub mod modbus;
pub mod simulation;
