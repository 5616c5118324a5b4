// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::io;

use thiserror::Error;

use crate::modbus::BankError;

/// Errors that end the bridge lifecycle
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("failed to bind Modbus server on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("remote endpoint {endpoint} is not available")]
    RemoteUnavailable { endpoint: String },

    #[error("register bank fault: {0}")]
    Bank(#[from] BankError),

    #[error("Modbus server task terminated unexpectedly")]
    ServerStopped,
}

impl BridgeError {
    /// Process exit code for an error returned by the bridge.
    ///
    /// Faults raised while running lead to a graceful shutdown and exit
    /// normally, only startup failures exit with a non-zero code.
    pub fn exit_code(&self) -> i32 {
        match self {
            BridgeError::RemoteUnavailable { .. } => 1,
            BridgeError::Bind { .. } => 2,
            BridgeError::Bank(_) | BridgeError::ServerStopped => 0,
        }
    }

    /// Whether the error is raised while RUNNING
    pub fn is_runtime_fault(&self) -> bool {
        matches!(self, BridgeError::Bank(_) | BridgeError::ServerStopped)
    }
}
