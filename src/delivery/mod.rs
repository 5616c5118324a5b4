// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Delivery of detected changes to the remote store
//!
//! The bridge loop only depends on the [`RemoteSink`] trait. [`DeliveryClient`]
//! is the HTTP implementation, tests plug in-memory sinks.
//!
//! ```text
//!   Bridge loop ──► RemoteSink ──► DeliveryClient ──► POST {endpoint}/data/{key}
//!                                                 └─► GET  {endpoint}/health
//! ```

pub mod client;

pub use client::{ApiResponse, CryptoOperation, CryptoResult, DeliveryClient, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failures of a call to the remote endpoint. None of them is fatal to the
/// bridge loop.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} answered a body that is not JSON: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered an unexpected JSON document: {source}")]
    UnexpectedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Refusal reported by a [`RemoteSink`] implementation that does not
    /// speak HTTP, e.g. an in-memory or queue backed sink
    #[error("{0}")]
    Rejected(String),
}

/// Destination of change messages
#[async_trait]
pub trait RemoteSink: Send + Sync {
    /// Store `message` under `key`, returning the remote acknowledgement
    async fn store_data(&self, key: &str, message: &str) -> Result<Value, DeliveryError>;

    /// Whether the remote endpoint is reachable
    async fn health_check(&self) -> bool;

    /// Human readable location of the sink, used in log lines
    fn endpoint(&self) -> &str;
}
