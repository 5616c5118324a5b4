// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! One-shot startup probe of the remote endpoint

use log::{error, info};

use super::BridgeError;
use crate::delivery::RemoteSink;

/// Fail with [`BridgeError::RemoteUnavailable`] unless the sink is reachable.
pub async fn health_gate<S: RemoteSink + ?Sized>(sink: &S) -> Result<(), BridgeError> {
    info!("Checking remote endpoint at {}", sink.endpoint());
    if sink.health_check().await {
        println!("Remote endpoint is available. Starting bridge...");
        Ok(())
    } else {
        error!("Remote endpoint {} failed the health check", sink.endpoint());
        Err(BridgeError::RemoteUnavailable {
            endpoint: sink.endpoint().to_string(),
        })
    }
}
