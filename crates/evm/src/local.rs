//! Local signer backed by a raw private key.
//!
//! `RawPrivateKeySigner` holds an `EthereumWallet` and signs fully
//! populated requests in-process. It never talks to the node; nonce,
//! gas and chain id are filled in by the caller beforehand.

use std::fmt;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;

use crate::{EvmError, TxSigner};

/// Signs transactions with a private key held in memory.
#[derive(Clone)]
pub struct RawPrivateKeySigner {
    wallet: EthereumWallet,
    address: Address,
}

impl RawPrivateKeySigner {
    /// Creates a signer from a 32-byte secp256k1 private key.
    ///
    /// # Errors
    ///
    /// Returns [`EvmError::InvalidPrivateKey`] when the bytes are not a
    /// valid scalar.
    pub fn new(private_key: &B256) -> Result<Self, EvmError> {
        let signer = PrivateKeySigner::from_bytes(private_key)?;
        let address = signer.address();

        Ok(Self {
            wallet: EthereumWallet::from(signer),
            address,
        })
    }
}

impl fmt::Debug for RawPrivateKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPrivateKeySigner")
            .field("address", &self.address)
            .field("wallet", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TxSigner for RawPrivateKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, EvmError> {
        let request = request.with_from(self.address);
        let envelope = request.build(&self.wallet).await?;

        debug!(
            signer = %self.address,
            tx_hash = %envelope.tx_hash(),
            "Signed transaction"
        );

        Ok(Bytes::from(envelope.encoded_2718()))
    }
}
