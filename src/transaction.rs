//! Transaction orchestration: gas planning, signing, submission, and
//! confirmation of a single contract call.
//!
//! The orchestrator is entered only after the calling wrapper has run
//! its guards. From there it estimates gas, prices the call against the
//! signer's balance, fetches a fresh nonce, signs, broadcasts exactly
//! once, and waits for a receipt with a bounded timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use orion_evm::{ChainClient, EvmError, Receipt, TxSigner};
use tracing::info;

use crate::error::OrionError;
use crate::events::{DecodedLog, EventSchema, decode_logs};
use crate::guard::{assert_signer_is_caller, assert_sufficient_balance};

/// Safety margin applied to gas estimates, as a ratio (1.2x).
const GAS_MARGIN_NUMERATOR: u128 = 6;
const GAS_MARGIN_DENOMINATOR: u128 = 5;

/// Lifecycle of an orchestrated transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Validating,
    Estimating,
    Pricing,
    Signing,
    Submitted,
    Confirming,
    Succeeded,
    Reverted,
    TimedOut,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Estimating => "estimating",
            Self::Pricing => "pricing",
            Self::Signing => "signing",
            Self::Submitted => "submitted",
            Self::Confirming => "confirming",
            Self::Succeeded => "succeeded",
            Self::Reverted => "reverted",
            Self::TimedOut => "timed out",
        };
        write!(f, "{name}")
    }
}

/// A contract call to be executed on behalf of `caller`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub contract: Address,
    /// Solidity signature of the called function.
    pub function: &'static str,
    pub calldata: Bytes,
    pub caller: Address,
}

impl TransactionIntent {
    pub fn new<T: SolCall>(contract: Address, call: &T, caller: Address) -> Self {
        Self {
            contract,
            function: T::SIGNATURE,
            calldata: Bytes::from(call.abi_encode()),
            caller,
        }
    }

    fn request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.caller)
            .with_to(self.contract)
            .with_input(self.calldata.clone())
    }
}

/// Gas limit for an estimate: `ceil(estimate * 1.2)`, saturating.
pub fn apply_gas_margin(estimate: u64) -> u64 {
    let scaled = (u128::from(estimate) * GAS_MARGIN_NUMERATOR).div_ceil(GAS_MARGIN_DENOMINATOR);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Priced gas budget for one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPlan {
    pub estimated_gas: u64,
    pub gas_limit: u64,
    /// Wei per gas unit.
    pub gas_price: u128,
    /// `gas_limit * gas_price`, in wei.
    pub total_cost: U256,
}

impl GasPlan {
    pub fn new(estimated_gas: u64, gas_price: u128) -> Self {
        let gas_limit = apply_gas_margin(estimated_gas);

        Self {
            estimated_gas,
            gas_limit,
            gas_price,
            total_cost: U256::from(gas_limit) * U256::from(gas_price),
        }
    }
}

/// Signed payload ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub nonce: u64,
    pub raw: Bytes,
}

/// Outcome of a confirmed, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult<E> {
    pub tx_hash: TxHash,
    pub receipt: Receipt,
    /// `None` when event decoding was not requested.
    pub decoded_logs: Option<Vec<DecodedLog<E>>>,
}

/// Drives an intent from gas estimation to a classified receipt.
///
/// Submissions are never retried. A confirmation timeout leaves the
/// transaction in flight; call [`Orchestrator::resume`] with the hash to
/// poll again.
pub struct Orchestrator<C> {
    client: Arc<C>,
    receipt_timeout: Duration,
    decode_events: bool,
}

impl<C> Clone for Orchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            receipt_timeout: self.receipt_timeout,
            decode_events: self.decode_events,
        }
    }
}

impl<C> fmt::Debug for Orchestrator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("receipt_timeout", &self.receipt_timeout)
            .field("decode_events", &self.decode_events)
            .finish_non_exhaustive()
    }
}

fn transition(state: TxState) {
    info!(%state, "Transaction state");
}

impl<C: ChainClient> Orchestrator<C> {
    pub fn new(client: Arc<C>, receipt_timeout: Duration) -> Self {
        Self {
            client,
            receipt_timeout,
            decode_events: true,
        }
    }

    #[must_use]
    pub fn with_event_decoding(mut self, decode_events: bool) -> Self {
        self.decode_events = decode_events;
        self
    }

    pub fn receipt_timeout(&self) -> Duration {
        self.receipt_timeout
    }

    /// Executes a guarded intent end to end.
    ///
    /// # Errors
    ///
    /// - [`OrionError::Guard`] with `SignerMismatch` when `signer` is not
    ///   the intent's caller (nothing is estimated).
    /// - [`OrionError::GasEstimation`] when the node rejects the estimate
    ///   (nothing is signed or sent).
    /// - [`OrionError::Guard`] with `InsufficientFunds` when the signer
    ///   cannot pay `gas_limit * gas_price` (nothing is sent).
    /// - [`OrionError::ConfirmationTimeout`] when no receipt arrives in
    ///   time; the transaction may still confirm.
    /// - [`OrionError::TransactionReverted`] when the receipt status is
    ///   not success.
    #[tracing::instrument(
        skip_all,
        fields(contract = %intent.contract, function = intent.function),
        level = tracing::Level::INFO
    )]
    pub async fn execute<E: EventSchema>(
        &self,
        intent: TransactionIntent,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<E>, OrionError> {
        transition(TxState::Validating);
        assert_signer_is_caller(signer.address(), intent.caller)?;

        let plan = self.plan(&intent).await?;
        let signed = self.sign(&intent, &plan, signer).await?;

        let tx_hash = self.client.submit_raw(signed.raw).await?;
        transition(TxState::Submitted);
        info!(%tx_hash, nonce = signed.nonce, gas_limit = plan.gas_limit, "Transaction submitted");

        self.confirm(intent.contract, tx_hash).await
    }

    /// Estimates and prices an intent, checking the caller can pay.
    pub async fn plan(&self, intent: &TransactionIntent) -> Result<GasPlan, OrionError> {
        transition(TxState::Estimating);
        let estimated_gas = self.client.estimate_gas(intent.request()).await?;

        transition(TxState::Pricing);
        let gas_price = self.client.gas_price().await?;
        let plan = GasPlan::new(estimated_gas, gas_price);

        let balance = self.client.balance_of(intent.caller).await?;
        assert_sufficient_balance(balance, plan.total_cost)?;

        Ok(plan)
    }

    async fn sign(
        &self,
        intent: &TransactionIntent,
        plan: &GasPlan,
        signer: &dyn TxSigner,
    ) -> Result<SignedTransaction, OrionError> {
        transition(TxState::Signing);
        let nonce = self.client.nonce_for(intent.caller).await?;
        let chain_id = self.client.chain_id().await?;

        let request = intent
            .request()
            .with_nonce(nonce)
            .with_gas_limit(plan.gas_limit)
            .with_gas_price(plan.gas_price)
            .with_chain_id(chain_id);
        let raw = signer.sign_transaction(request).await?;

        Ok(SignedTransaction { nonce, raw })
    }

    /// Polls again for a transaction that previously timed out.
    pub async fn resume<E: EventSchema>(
        &self,
        contract: Address,
        tx_hash: TxHash,
    ) -> Result<TransactionResult<E>, OrionError> {
        info!(%tx_hash, "Resuming confirmation");
        self.confirm(contract, tx_hash).await
    }

    async fn confirm<E: EventSchema>(
        &self,
        contract: Address,
        tx_hash: TxHash,
    ) -> Result<TransactionResult<E>, OrionError> {
        transition(TxState::Confirming);
        let receipt = match self
            .client
            .wait_for_receipt(tx_hash, self.receipt_timeout)
            .await
        {
            Ok(receipt) => receipt,
            Err(EvmError::ConfirmationTimeout { tx_hash, timeout }) => {
                transition(TxState::TimedOut);
                return Err(OrionError::ConfirmationTimeout {
                    tx_hash,
                    contract,
                    timeout,
                });
            }
            Err(error) => return Err(error.into()),
        };

        if !receipt.is_success() {
            transition(TxState::Reverted);
            return Err(OrionError::TransactionReverted {
                tx_hash,
                status: receipt.status,
            });
        }

        transition(TxState::Succeeded);
        let decoded_logs = self
            .decode_events
            .then(|| decode_logs::<E>(contract, &receipt.logs));

        Ok(TransactionResult {
            tx_hash,
            receipt,
            decoded_logs,
        })
    }
}
