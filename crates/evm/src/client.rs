//! [`ChainClient`] implementation over an alloy [`Provider`].

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::layers::RetryBackoffLayer;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::error_decoding::{RevertReason, decode_rpc_error};
use crate::{ChainClient, EvmError, Receipt};

/// Maximum retries for transient RPC errors (rate limits, null responses, etc.)
const RPC_MAX_RETRIES: u32 = 10;

/// Initial backoff duration in milliseconds before retrying
const RPC_INITIAL_BACKOFF_MS: u64 = 1000;

/// Compute units per second budget for rate limiting
const RPC_COMPUTE_UNITS_PER_SECOND: u64 = 100;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Creates an HTTP RPC client with retry layer for transient errors.
///
/// Use with `RootProvider::new(client)` or
/// `ProviderBuilder::new().connect_client(client)`.
pub fn http_client_with_retry(url: Url) -> RpcClient {
    let retry_layer = RetryBackoffLayer::new(
        RPC_MAX_RETRIES,
        RPC_INITIAL_BACKOFF_MS,
        RPC_COMPUTE_UNITS_PER_SECOND,
    );
    RpcClient::builder().layer(retry_layer).http(url)
}

/// The network a client is bound to, established once at connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub chain_id: u64,
    pub rpc_url: Url,
}

/// Chain client over an alloy provider.
#[derive(Debug, Clone)]
pub struct EvmClient<P> {
    provider: P,
    network: NetworkIdentity,
    poll_interval: Duration,
}

impl<P: Provider + Clone + 'static> EvmClient<P> {
    /// Connects to the endpoint and records the network it reports.
    ///
    /// A mismatch between `expected_chain_id` and the live chain id is
    /// logged as a warning and does not fail the connection.
    ///
    /// # Errors
    ///
    /// Returns [`EvmError::Transport`] if the chain id cannot be fetched.
    pub async fn connect(
        provider: P,
        rpc_url: Url,
        expected_chain_id: Option<u64>,
    ) -> Result<Self, EvmError> {
        let chain_id = provider.get_chain_id().await?;

        match expected_chain_id {
            Some(expected) if expected != chain_id => {
                warn!(
                    expected,
                    actual = chain_id,
                    "Configured chain id does not match the RPC endpoint"
                );
            }
            _ => {}
        }

        info!(chain_id, "Connected to EVM endpoint");

        Ok(Self {
            provider,
            network: NetworkIdentity { chain_id, rpc_url },
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn network(&self) -> &NetworkIdentity {
        &self.network
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> ChainClient for EvmClient<P>
where
    P: Provider + Clone + 'static,
{
    async fn chain_id(&self) -> Result<u64, EvmError> {
        Ok(self.network.chain_id)
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError> {
        let request = TransactionRequest::default()
            .with_to(contract)
            .with_input(calldata);

        self.provider.call(request).await.map_err(|err| {
            decode_rpc_error(&err).map_or(EvmError::Transport(err), EvmError::CallReverted)
        })
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, EvmError> {
        self.provider.estimate_gas(request).await.map_err(|err| {
            let reason =
                decode_rpc_error(&err).unwrap_or_else(|| RevertReason::Other(err.to_string()));
            EvmError::GasEstimation(reason)
        })
    }

    async fn gas_price(&self) -> Result<u128, EvmError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn nonce_for(&self, address: Address) -> Result<u64, EvmError> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn balance_of(&self, address: Address) -> Result<U256, EvmError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn submit_raw(&self, payload: Bytes) -> Result<TxHash, EvmError> {
        let pending = self.provider.send_raw_transaction(&payload).await?;
        let tx_hash = *pending.tx_hash();

        info!(%tx_hash, "Transaction broadcast");

        Ok(tx_hash)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, EvmError> {
        let poll = async {
            loop {
                if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                    return Ok::<_, EvmError>(Receipt::from(receipt));
                }

                debug!(%tx_hash, "Receipt not yet available");
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        if let Ok(outcome) = tokio::time::timeout(timeout, poll).await {
            outcome
        } else {
            warn!(
                %tx_hash,
                ?timeout,
                "Receipt polling timed out, transaction may still confirm"
            );
            Err(EvmError::ConfirmationTimeout { tx_hash, timeout })
        }
    }
}
