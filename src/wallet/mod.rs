//! Wallet provider access and the connection session.
//!
//! The wallet provider is the only component that holds keys: it hands out
//! account addresses and signs and submits transactions on the client's
//! behalf. [`ConnectionGateway`] wraps it with the session state machine.

pub mod gateway;
pub mod rpc;

pub use gateway::{ConnectOutcome, ConnectionGateway, ConnectionState, Session};
pub use rpc::RpcWallet;

use async_trait::async_trait;
use microlend_abi::Bytes;

use crate::error::AppResult;

/// Operations the client needs from a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user for account access. Returns the accounts in wallet order.
    async fn request_accounts(&self) -> AppResult<Vec<String>>;

    /// Read-only contract call against the latest block.
    async fn call(&self, to: &str, data: Bytes) -> AppResult<Bytes>;

    /// Sign and submit a transaction from `from`; returns the transaction hash
    /// as soon as the wallet accepts it.
    async fn send_transaction(&self, from: &str, to: &str, data: Bytes) -> AppResult<String>;
}
