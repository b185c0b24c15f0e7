//! EVM chain interaction abstraction.
//!
//! This crate provides two traits for interacting with EVM chains:
//!
//! - [`ChainClient`]: the narrow set of JSON-RPC primitives the vault
//!   orchestration core needs: view calls, gas estimation, gas price,
//!   nonce and balance lookups, raw transaction submission, and bounded
//!   receipt polling. [`EvmClient`] implements it over any alloy
//!   provider.
//!
//! - [`TxSigner`]: the key-holding collaborator. Given a fully
//!   populated transaction request it returns the signed, EIP-2718
//!   encoded payload. [`RawPrivateKeySigner`] signs locally from a raw
//!   private key.
//!
//! Revert decoding is built into `ChainClient::call` and
//! `ChainClient::estimate_gas` so consumers get human-readable revert
//! reasons without manual wiring.

use std::sync::Arc;
use std::time::Duration;

use alloy::consensus::TxReceipt;
use alloy::primitives::{Address, B256, Bytes, TxHash, U256};
use alloy::rpc::types::{Log, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;

mod client;
pub mod error_decoding;
mod local;

pub use client::{EvmClient, NetworkIdentity, http_client_with_retry};
pub use error_decoding::{KnownRevert, RevertReason};
pub use local::RawPrivateKeySigner;

/// Default bound for [`ChainClient::wait_for_receipt`].
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Receipt status code reported by the node for a successful transaction.
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

/// Errors that can occur during EVM operations.
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("transport error: {0}")]
    Transport(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("view call reverted: {0}")]
    CallReverted(RevertReason),
    #[error("gas estimation failed: {0}")]
    GasEstimation(RevertReason),
    #[error("no receipt for {tx_hash} after {timeout:?}")]
    ConfirmationTimeout { tx_hash: TxHash, timeout: Duration },
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[from] alloy::signers::k256::ecdsa::Error),
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] alloy::network::TransactionBuilderError<alloy::network::Ethereum>),
}

/// Confirmation record for a submitted transaction.
///
/// Only the parts the orchestration core inspects are kept: the raw
/// status code, the block it landed in, gas accounting, and the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub status: u64,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESS
    }
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            status: u64::from(receipt.inner.status()),
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            logs: receipt.inner.logs().to_vec(),
        }
    }
}

/// Read and submission primitives over a remote EVM node.
///
/// View calls are side-effect free and may be retried freely by the
/// caller. `submit_raw` must never be retried blindly: resubmitting
/// reuses the nonce and risks a double spend.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Network id reported by the endpoint at connection time.
    async fn chain_id(&self) -> Result<u64, EvmError>;

    /// Execute a view call with automatic revert decoding.
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError>;

    /// Estimate gas units for a request.
    ///
    /// Any failure is reported as [`EvmError::GasEstimation`], carrying
    /// the decoded revert reason when the node returned one.
    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, EvmError>;

    /// Current legacy gas price in wei.
    async fn gas_price(&self) -> Result<u128, EvmError>;

    /// Next nonce for `address`, including pending transactions.
    async fn nonce_for(&self, address: Address) -> Result<u64, EvmError>;

    /// Native balance of `address` in wei.
    async fn balance_of(&self, address: Address) -> Result<U256, EvmError>;

    /// Broadcast an already signed, EIP-2718 encoded transaction.
    async fn submit_raw(&self, payload: Bytes) -> Result<TxHash, EvmError>;

    /// Poll for the receipt of `tx_hash`, giving up after `timeout`.
    ///
    /// Timing out yields [`EvmError::ConfirmationTimeout`]; the
    /// transaction may still confirm later.
    async fn wait_for_receipt(&self, tx_hash: TxHash, timeout: Duration)
    -> Result<Receipt, EvmError>;
}

/// Signing identity for outgoing transactions.
///
/// Implementations hold the key material. The request handed to
/// [`sign_transaction`](TxSigner::sign_transaction) is complete (target,
/// calldata, nonce, gas limit, gas price, chain id); the signer only
/// binds it to a signature and encodes it for broadcast.
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Returns the address this signer signs transactions from.
    fn address(&self) -> Address;

    /// Sign the request and return the raw payload for `submit_raw`.
    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, EvmError>;
}

#[async_trait]
impl<T: ChainClient> ChainClient for Arc<T> {
    async fn chain_id(&self) -> Result<u64, EvmError> {
        (**self).chain_id().await
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError> {
        (**self).call(contract, calldata).await
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, EvmError> {
        (**self).estimate_gas(request).await
    }

    async fn gas_price(&self) -> Result<u128, EvmError> {
        (**self).gas_price().await
    }

    async fn nonce_for(&self, address: Address) -> Result<u64, EvmError> {
        (**self).nonce_for(address).await
    }

    async fn balance_of(&self, address: Address) -> Result<U256, EvmError> {
        (**self).balance_of(address).await
    }

    async fn submit_raw(&self, payload: Bytes) -> Result<TxHash, EvmError> {
        (**self).submit_raw(payload).await
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, EvmError> {
        (**self).wait_for_receipt(tx_hash, timeout).await
    }
}

#[async_trait]
impl<T: TxSigner> TxSigner for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, EvmError> {
        (**self).sign_transaction(request).await
    }
}
