//! JSON-RPC client for an EIP-1193 style wallet endpoint.

use async_trait::async_trait;
use microlend_abi::{hex, Bytes};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error};

use super::WalletProvider;
use crate::config::WalletConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Wallet provider reached over HTTP JSON-RPC.
pub struct RpcWallet {
    http: Client,
    url: String,
    /// Bounds reads only; account and transaction requests wait on the user
    read_timeout: Duration,
    next_id: AtomicU64,
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl RpcWallet {
    pub fn new(url: &str, read_timeout: Duration) -> AppResult<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            read_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Build a provider from config; `None` when no endpoint is configured.
    pub fn from_config(config: &WalletConfig) -> AppResult<Option<Self>> {
        match config.rpc_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Some(Self::new(url, config.request_timeout())?)),
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(
        &self,
        method: &str,
        params: Value,
        timeout: Option<Duration>,
    ) -> AppResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(method, id, "Wallet RPC request");

        let mut builder = self.http.post(&self.url).json(&body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let response: RpcResponse = builder
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            error!(method, code = err.code, "Wallet RPC error: {}", err.message);
            return Err(AppError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        response.result.ok_or_else(|| AppError::Rpc {
            code: -32603,
            message: format!("{} returned no result", method),
        })
    }
}

fn expect_str(value: Value, what: &str) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(AppError::abi(format!("{} is not a string: {}", what, other))),
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> AppResult<Vec<String>> {
        let value = self.request("eth_requestAccounts", json!([]), None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call(&self, to: &str, data: Bytes) -> AppResult<Bytes> {
        let value = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": hex::encode_prefixed(&data) }, "latest"]),
                Some(self.read_timeout),
            )
            .await?;
        let raw = expect_str(value, "eth_call result")?;
        let bytes = hex::decode(&raw).map_err(|e| AppError::abi(format!("bad hex from eth_call: {}", e)))?;
        Ok(Bytes::from(bytes))
    }

    async fn send_transaction(&self, from: &str, to: &str, data: Bytes) -> AppResult<String> {
        let value = self
            .request(
                "eth_sendTransaction",
                json!([{ "from": from, "to": to, "data": hex::encode_prefixed(&data) }]),
                None,
            )
            .await?;
        expect_str(value, "transaction hash")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trailing_slash_trimmed() {
        let wallet = RpcWallet::new("http://localhost:8545/", Duration::from_secs(5)).unwrap();
        assert_eq!(wallet.url(), "http://localhost:8545");
    }

    #[test]
    fn test_from_config_without_url() {
        let config = WalletConfig::default();
        assert!(RpcWallet::from_config(&config).unwrap().is_none());

        let blank = WalletConfig {
            rpc_url: Some("   ".to_string()),
            ..WalletConfig::default()
        };
        assert!(RpcWallet::from_config(&blank).unwrap().is_none());
    }

    #[test]
    fn test_error_object_parsing() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected the request."}}"#;
        let parsed: RpcResponse = serde_json::from_str(raw).unwrap();
        let err = parsed.error.unwrap();
        assert_eq!(err.code, 4001);
        assert!(parsed.result.is_none());
    }
}
