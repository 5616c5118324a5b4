// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated holding register bank
//!
//! For avoiding confusion with the Modbus master/slave terminology, this module uses
//! the terms "server" and "client" instead. The server is the device that provides data,
//! while the client is the device that requests data.
//!
//! The bank owns a fixed window of holding registers (`address..address + count`).
//! The bridge writes simulated values into it every cycle and reads them back,
//! while Modbus TCP clients can observe (and overwrite) the same cells through
//! the [`tokio_modbus::server::Service`] implementation.
//!
//! ## Supported function codes
//!
//! | Code | Function | Behaviour |
//! |------|----------|-----------|
//! | 0x03 | Read Holding Registers | reads the simulated cells |
//! | 0x04 | Read Input Registers | same cells, read-only view |
//! | 0x06 | Write Single Register | overwrites one cell |
//! | 0x10 | Write Multiple Registers | overwrites a range of cells |

use std::{
    collections::HashMap,
    future,
    sync::{Arc, Mutex},
};

use log::{debug, error};
use thiserror::Error;
use tokio_modbus::prelude::*;

/// Errors raised by direct (non-Modbus) access to the register bank
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("register {address} is outside of the simulated bank")]
    IllegalDataAddress { address: u32 },

    #[error("register bank lock poisoned")]
    Poisoned,
}

/// Register window the bridge loop writes to and reads back from.
///
/// [`RegisterBank`] is the in-process implementation served over Modbus TCP.
pub trait RegisterStore: Send {
    /// First register of the window
    fn base_address(&self) -> u16;

    /// Number of registers in the window
    fn count(&self) -> u16;

    /// Write `values` starting at `address`, all-or-nothing
    fn set(&self, address: u16, values: &[u16]) -> Result<(), BankError>;

    /// Read `count` registers starting at `address`, `None` when no data is available
    fn get(&self, address: u16, count: u16) -> Option<Vec<u16>>;
}

/// A bank of simulated holding registers shared between the bridge loop
/// and the Modbus TCP server.
///
/// Cloning a `RegisterBank` is cheap and every clone sees the same cells,
/// which is how one instance is handed to each accepted Modbus connection.
#[derive(Debug, Clone)]
pub struct RegisterBank {
    holding_registers: Arc<Mutex<HashMap<u16, u16>>>,
    base_address: u16,
    count: u16,
}

impl RegisterBank {
    /// Create a bank holding `count` registers starting at `base_address`,
    /// all initialised to zero.
    ///
    /// Cells that would fall beyond address `0xFFFF` are not allocated.
    pub fn new(base_address: u16, count: u16) -> Self {
        let holding_registers = (0..count)
            .filter_map(|i| base_address.checked_add(i))
            .map(|addr| (addr, 0))
            .collect::<HashMap<u16, u16>>();

        Self {
            holding_registers: Arc::new(Mutex::new(holding_registers)),
            base_address,
            count,
        }
    }

    pub fn base_address(&self) -> u16 {
        self.base_address
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// Write `values` into consecutive registers starting at `address`.
    ///
    /// The write is all-or-nothing: if any target cell is outside of the
    /// bank, no register is modified.
    pub fn set(&self, address: u16, values: &[u16]) -> Result<(), BankError> {
        let mut registers = self
            .holding_registers
            .lock()
            .map_err(|_| BankError::Poisoned)?;

        for i in 0..values.len() {
            let reg_addr = address as u32 + i as u32;
            let known = u16::try_from(reg_addr)
                .map(|a| registers.contains_key(&a))
                .unwrap_or(false);
            if !known {
                return Err(BankError::IllegalDataAddress { address: reg_addr });
            }
        }

        register_write(&mut registers, address, values)
            .map_err(|_| BankError::IllegalDataAddress {
                address: address as u32,
            })
    }

    /// Read `count` consecutive registers starting at `address`.
    ///
    /// Returns `None` when the read yields no data: out-of-range addresses,
    /// a poisoned lock, or an empty request.
    pub fn get(&self, address: u16, count: u16) -> Option<Vec<u16>> {
        if count == 0 {
            return None;
        }
        let registers = match self.holding_registers.lock() {
            Ok(registers) => registers,
            Err(_) => {
                error!("Register bank lock poisoned, read skipped");
                return None;
            }
        };
        register_read(&registers, address, count).ok()
    }
}

impl RegisterStore for RegisterBank {
    fn base_address(&self) -> u16 {
        self.base_address
    }

    fn count(&self) -> u16 {
        self.count
    }

    fn set(&self, address: u16, values: &[u16]) -> Result<(), BankError> {
        RegisterBank::set(self, address, values)
    }

    fn get(&self, address: u16, count: u16) -> Option<Vec<u16>> {
        RegisterBank::get(self, address, count)
    }
}

impl tokio_modbus::server::Service for RegisterBank {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    ///
    /// Any function code other than 0x03, 0x04, 0x06 and 0x10 returns an
    /// IllegalFunction exception.
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);

        let mut registers = match self.holding_registers.lock() {
            Ok(registers) => registers,
            Err(_) => {
                error!("Register bank lock poisoned, answering with ServerDeviceFailure");
                return future::ready(Err(ExceptionCode::ServerDeviceFailure));
            }
        };

        let res = match req {
            Request::ReadHoldingRegisters(addr, cnt) => {
                register_read(&registers, addr, cnt).map(Response::ReadHoldingRegisters)
            }
            Request::ReadInputRegisters(addr, cnt) => {
                register_read(&registers, addr, cnt).map(Response::ReadInputRegisters)
            }
            Request::WriteMultipleRegisters(addr, values) => {
                register_write(&mut registers, addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            Request::WriteSingleRegister(addr, value) => {
                register_write(&mut registers, addr, std::slice::from_ref(&value))
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}

/// Read `cnt` registers starting at `addr`, failing with
/// `IllegalDataAddress` on the first cell that is not part of the bank.
fn register_read(
    registers: &HashMap<u16, u16>,
    addr: u16,
    cnt: u16,
) -> Result<Vec<u16>, ExceptionCode> {
    let mut response_values = vec![0; cnt.into()];

    for i in 0..cnt {
        let value = addr
            .checked_add(i)
            .and_then(|reg_addr| registers.get(&reg_addr));
        match value {
            Some(r) => response_values[i as usize] = *r,
            None => {
                error!(
                    "Exception::IllegalDataAddress - Register {} not found",
                    addr as u32 + i as u32
                );
                return Err(ExceptionCode::IllegalDataAddress);
            }
        }
    }

    debug!("Read {} registers from address {}", cnt, addr);
    Ok(response_values)
}

/// Write a run of holding registers. Used by both the write single register
/// and write multiple registers requests.
///
/// Cells are checked before anything is written so a failing request leaves
/// the bank untouched.
fn register_write(
    registers: &mut HashMap<u16, u16>,
    addr: u16,
    values: &[u16],
) -> Result<(), ExceptionCode> {
    let mut targets = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        match u16::try_from(i)
            .ok()
            .and_then(|i| addr.checked_add(i))
            .filter(|reg_addr| registers.contains_key(reg_addr))
        {
            Some(reg_addr) => targets.push(reg_addr),
            None => {
                error!(
                    "Exception::IllegalDataAddress - Register {} not found",
                    addr as usize + i
                );
                return Err(ExceptionCode::IllegalDataAddress);
            }
        }
    }

    for (reg_addr, value) in targets.into_iter().zip(values) {
        registers.insert(reg_addr, *value);
    }

    debug!(
        "Wrote {} values starting at register {}",
        values.len(),
        addr
    );
    Ok(())
}
