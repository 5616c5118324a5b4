// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP client for the remote storage and crypto endpoint
//!
//! Every call is bounded by the configured timeout. Network errors are logged
//! and returned as [`DeliveryError`] values, they never panic and never abort
//! the caller's loop.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DeliveryError, RemoteSink};

/// Default request timeout for every endpoint
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Operations understood by the remote `/crypto` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum CryptoOperation {
    RandomHex,
    RandomBase64,
    Sha256,
    Token,
}

impl CryptoOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoOperation::RandomHex => "random_hex",
            CryptoOperation::RandomBase64 => "random_base64",
            CryptoOperation::Sha256 => "sha256",
            CryptoOperation::Token => "token",
        }
    }
}

/// Body of a `/crypto` request
#[derive(Debug, Serialize)]
struct CryptoRequest<'a> {
    operation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
}

/// Envelope returned by the remote endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Payload of a successful crypto operation
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoResult {
    pub result: String,
    pub operation: String,
}

/// Client for the remote endpoint.
///
/// The base URL is fixed at construction and kept for the lifetime of the
/// client.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DeliveryClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000`).
    ///
    /// A trailing `/` on the base URL is ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Store `message` under `key` with `POST {endpoint}/data/{key}`.
    ///
    /// Returns the JSON body of a `200 OK` answer.
    pub async fn store_data(&self, key: &str, message: &str) -> Result<Value, DeliveryError> {
        let url = self.url(&format!("data/{}", key));
        debug!("Storing {} bytes at {}", message.len(), url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(message.to_owned())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| {
                let err = DeliveryError::Network {
                    url: url.clone(),
                    source,
                };
                warn!("Error storing data: {}", err);
                err
            })?;

        parse_json_response(url, response).await
    }

    /// Run a crypto `operation` on the remote endpoint with `POST {endpoint}/crypto`.
    ///
    /// `data` is the input of `sha256`, `length` the size of the random
    /// operations. An answer with `success: false` is still returned as `Ok`,
    /// the caller inspects [`ApiResponse::success`].
    pub async fn crypto_operation(
        &self,
        operation: CryptoOperation,
        data: Option<&str>,
        length: Option<usize>,
    ) -> Result<ApiResponse<CryptoResult>, DeliveryError> {
        let url = self.url("crypto");
        let request = CryptoRequest {
            operation: operation.as_str(),
            data,
            length,
        };
        debug!("Crypto operation {} requested at {}", operation.as_str(), url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| {
                let err = DeliveryError::Network {
                    url: url.clone(),
                    source,
                };
                warn!("Error with crypto operation: {}", err);
                err
            })?;

        let body = parse_json_response(url.clone(), response).await?;
        serde_json::from_value(body).map_err(|source| DeliveryError::UnexpectedBody { url, source })
    }

    /// `true` iff `GET {endpoint}/health` answers `200 OK` within the timeout
    pub async fn health_check(&self) -> bool {
        let url = self.url("health");
        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => {
                debug!("Health check {} answered {}", url, response.status());
                response.status() == StatusCode::OK
            }
            Err(e) => {
                debug!("Health check {} failed: {}", url, e);
                false
            }
        }
    }
}

async fn parse_json_response(
    url: String,
    response: reqwest::Response,
) -> Result<Value, DeliveryError> {
    let status = response.status();
    if status != StatusCode::OK {
        let err = DeliveryError::Status {
            url,
            status: status.as_u16(),
        };
        warn!("{}", err);
        return Err(err);
    }

    response.json::<Value>().await.map_err(|source| {
        let err = DeliveryError::InvalidBody { url, source };
        warn!("{}", err);
        err
    })
}

#[async_trait]
impl RemoteSink for DeliveryClient {
    async fn store_data(&self, key: &str, message: &str) -> Result<Value, DeliveryError> {
        DeliveryClient::store_data(self, key, message).await
    }

    async fn health_check(&self) -> bool {
        DeliveryClient::health_check(self).await
    }

    fn endpoint(&self) -> &str {
        self.base_url()
    }
}
