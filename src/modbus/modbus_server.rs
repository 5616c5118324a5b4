// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP server hosting the simulated register bank
//!
//! The listener is bound up front so that bind errors surface to the caller,
//! then connections are accepted and served in a background task. The bridge
//! loop never waits on client connections.

use std::{io, net::SocketAddr, time::Duration};

use log::{debug, error, info, warn};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use super::RegisterBank;

/// Handle on a running Modbus TCP server.
///
/// Dropping the handle does not stop the server, call [`ModbusServer::stop`]
/// to abort the serve task and release the bound port.
pub struct ModbusServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ModbusServer {
    /// Bind `address:port` and start serving `bank` to Modbus clients.
    ///
    /// Port `0` lets the operating system pick a free port, the actual one is
    /// available through [`ModbusServer::local_addr`].
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be resolved or the port cannot be bound.
    pub async fn start(address: &str, port: u16, bank: RegisterBank) -> io::Result<Self> {
        let listener = TcpListener::bind((address, port)).await?;
        let local_addr = listener.local_addr()?;
        info!("Modbus server listening on {}", local_addr);

        let server = Server::new(listener);

        // Every connection gets a clone of the bank, all clones share the same cells
        let on_connected = move |stream, socket_addr| {
            let bank = bank.clone();
            async move {
                debug!("Modbus client connected: {}", socket_addr);
                accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                    Ok(Some(bank.clone()))
                })
            }
        };

        let on_process_error = |err| {
            error!("Modbus server error: {err}");
        };

        let handle = tokio::spawn(async move {
            if let Err(e) = server.serve(&on_connected, on_process_error).await {
                error!("Modbus server stopped: {}", e);
            }
        });

        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `false` once the serve task has terminated on its own.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Abort the serve task and wait for it, releasing the bound port.
    pub async fn stop(self) {
        info!("Shutting down Modbus server on {}...", self.local_addr);
        self.handle.abort();

        match tokio::time::timeout(Duration::from_secs(5), self.handle).await {
            Ok(_) => info!("Modbus server is offline"),
            Err(_) => warn!("Modbus server shutdown timed out, forcing termination"),
        }
    }
}
