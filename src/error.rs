//! Top-level error type for vault operations.
//!
//! Each layer has its own error enum; `OrionError` unifies them for
//! callers of the contract wrappers and the orchestrator.

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use orion_evm::{EvmError, RevertReason};

use crate::config::ConfigError;
use crate::contracts::VaultType;
use crate::fee_model::UnknownFeeType;
use crate::guard::GuardError;
use crate::registry::RegistryError;
use crate::units::UnitsError;

#[derive(Debug, thiserror::Error)]
pub enum OrionError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("gas estimation failed: {reason}")]
    GasEstimation { reason: RevertReason },
    #[error("no receipt for {tx_hash} sent to {contract} after {timeout:?}, re-poll by hash")]
    ConfirmationTimeout {
        tx_hash: TxHash,
        contract: Address,
        timeout: Duration,
    },
    #[error("transaction {tx_hash} failed with status {status}")]
    TransactionReverted { tx_hash: TxHash, status: u64 },
    #[error("EVM error: {0}")]
    Evm(EvmError),
    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy::sol_types::Error),
    #[error("unit conversion failed: {0}")]
    Units(#[from] UnitsError),
    #[error(transparent)]
    UnknownFeeType(#[from] UnknownFeeType),
    #[error("unsupported vault type: {0}")]
    UnsupportedVaultType(VaultType),
    #[error("portfolio lists {tokens} tokens but {values} values")]
    MalformedPortfolio { tokens: usize, values: usize },
}

impl From<EvmError> for OrionError {
    fn from(error: EvmError) -> Self {
        match error {
            EvmError::GasEstimation(reason) => Self::GasEstimation { reason },
            other => Self::Evm(other),
        }
    }
}

impl OrionError {
    /// Whether the transaction may still land and should be re-polled
    /// rather than resubmitted.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::ConfirmationTimeout { .. } | Self::Evm(EvmError::ConfirmationTimeout { .. })
        )
    }
}
