//! Shared test fixtures: an in-memory chain client with canned view
//! responses, a signer that records what it was asked to sign, and log
//! builders.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, LogData, TxHash, U256, address, fixed_bytes};
use alloy::rpc::types::{Log, TransactionRequest};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use orion_evm::{ChainClient, EvmError, Receipt, RevertReason, TxSigner};

use crate::bindings::{IOrionConfig, ITransparentVaultFactory, IOrionTransparentVault};

pub(crate) const SEPOLIA: u64 = 11_155_111;
pub(crate) const ORION_CONFIG: Address = address!("0xc9e19770B9Ba4bC41795698Da777d04417513FE0");
pub(crate) const FACTORY: Address = address!("0x6666666666666666666666666666666666666666");
pub(crate) const ORCHESTRATOR: Address = address!("0x7777777777777777777777777777777777777777");
pub(crate) const UNDERLYING: Address = address!("0x8888888888888888888888888888888888888888");
pub(crate) const VAULT: Address = address!("0x3333333333333333333333333333333333333333");
pub(crate) const MANAGER: Address = address!("0x1111111111111111111111111111111111111111");
pub(crate) const STRATEGIST: Address = address!("0x2222222222222222222222222222222222222222");

pub(crate) const TX_HASH: TxHash =
    fixed_bytes!("0xbeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// Builds a mined log emitted by `emitter`.
pub(crate) fn log_from(emitter: Address, data: LogData, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: emitter,
            data,
        },
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(12345),
        block_timestamp: None,
        transaction_hash: Some(TX_HASH),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

type Response = Result<Bytes, RevertReason>;

/// In-memory [`ChainClient`].
///
/// View calls are answered by `(contract, selector)`; unregistered calls
/// revert with an unknown selector so a missing fixture fails loudly.
/// Defaults: Sepolia, estimate 100k gas, 1 gwei, 10 ETH, nonce 0, and a
/// successful receipt with no logs.
pub(crate) struct MockChain {
    chain_id: AtomicU64,
    responses: Mutex<HashMap<(Address, [u8; 4]), Response>>,
    estimate: Mutex<Result<u64, RevertReason>>,
    gas_price: Mutex<u128>,
    balance: Mutex<U256>,
    balances: Mutex<HashMap<Address, U256>>,
    nonce: AtomicU64,
    nonces: Mutex<HashMap<Address, u64>>,
    receipt_status: AtomicU64,
    receipt_available: Mutex<bool>,
    receipt_logs: Mutex<Vec<Log>>,
    pub(crate) estimate_calls: AtomicUsize,
    pub(crate) nonce_calls: AtomicUsize,
    pub(crate) submit_calls: AtomicUsize,
    pub(crate) receipt_calls: AtomicUsize,
    pub(crate) estimated_requests: Mutex<Vec<TransactionRequest>>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self {
            chain_id: AtomicU64::new(SEPOLIA),
            responses: Mutex::new(HashMap::new()),
            estimate: Mutex::new(Ok(100_000)),
            gas_price: Mutex::new(1_000_000_000),
            balance: Mutex::new(U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64))),
            balances: Mutex::new(HashMap::new()),
            nonce: AtomicU64::new(0),
            nonces: Mutex::new(HashMap::new()),
            receipt_status: AtomicU64::new(1),
            receipt_available: Mutex::new(true),
            receipt_logs: Mutex::new(Vec::new()),
            estimate_calls: AtomicUsize::new(0),
            nonce_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
            estimated_requests: Mutex::new(Vec::new()),
        }
    }

    /// A chain with the Sepolia root config and an idle system wired up:
    /// factory, orchestrator, and underlying asset addresses resolve.
    pub(crate) fn with_protocol() -> Self {
        let chain = Self::new();
        chain.on::<IOrionConfig::transparentVaultFactoryCall>(ORION_CONFIG, &FACTORY);
        chain.on::<IOrionConfig::liquidityOrchestratorCall>(ORION_CONFIG, &ORCHESTRATOR);
        chain.on::<IOrionConfig::underlyingAssetCall>(ORION_CONFIG, &UNDERLYING);
        chain.on::<IOrionConfig::isSystemIdleCall>(ORION_CONFIG, &true);
        chain.on::<IOrionConfig::getAllOrionVaultsCall>(ORION_CONFIG, &vec![VAULT]);
        chain
    }

    /// [`MockChain::with_protocol`] plus a registered vault owned by
    /// [`MANAGER`] and run by [`STRATEGIST`].
    pub(crate) fn with_vault() -> Self {
        let chain = Self::with_protocol();
        chain.on::<IOrionTransparentVault::managerCall>(VAULT, &MANAGER);
        chain.on::<IOrionTransparentVault::strategistCall>(VAULT, &STRATEGIST);
        chain.on::<IOrionTransparentVault::MAX_PERFORMANCE_FEECall>(VAULT, &3000);
        chain.on::<IOrionTransparentVault::MAX_MANAGEMENT_FEECall>(VAULT, &300);
        chain
    }

    pub(crate) fn set_chain_id(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }

    /// Answers every `T` call to `contract` with `value`.
    pub(crate) fn on<T: SolCall>(&self, contract: Address, value: &T::Return) {
        let encoded = Bytes::from(T::abi_encode_returns(value));
        self.lock_responses().insert((contract, T::SELECTOR), Ok(encoded));
    }

    /// Makes every `T` call to `contract` revert with `reason`.
    pub(crate) fn revert_on<T: SolCall>(&self, contract: Address, reason: RevertReason) {
        self.lock_responses()
            .insert((contract, T::SELECTOR), Err(reason));
    }

    pub(crate) fn set_estimate(&self, estimate: Result<u64, RevertReason>) {
        *lock(&self.estimate) = estimate;
    }

    pub(crate) fn set_gas_price(&self, gas_price: u128) {
        *lock(&self.gas_price) = gas_price;
    }

    pub(crate) fn gas_price_wei(&self) -> u128 {
        *lock(&self.gas_price)
    }

    /// Balance of every account without its own entry.
    pub(crate) fn set_balance(&self, balance: U256) {
        *lock(&self.balance) = balance;
    }

    pub(crate) fn set_balance_of(&self, account: Address, balance: U256) {
        lock(&self.balances).insert(account, balance);
    }

    /// Nonce of every account without its own entry.
    pub(crate) fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }

    pub(crate) fn set_nonce_of(&self, account: Address, nonce: u64) {
        lock(&self.nonces).insert(account, nonce);
    }

    pub(crate) fn set_receipt_status(&self, status: u64) {
        self.receipt_status.store(status, Ordering::SeqCst);
    }

    pub(crate) fn set_receipt_available(&self, available: bool) {
        *lock(&self.receipt_available) = available;
    }

    pub(crate) fn set_receipt_logs(&self, logs: Vec<Log>) {
        *lock(&self.receipt_logs) = logs;
    }

    pub(crate) fn submitted(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<(Address, [u8; 4]), Response>> {
        lock(&self.responses)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, EvmError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError> {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&calldata[..4]);

        match self.lock_responses().get(&(contract, selector)) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(reason)) => Err(EvmError::CallReverted(reason.clone())),
            None => Err(EvmError::CallReverted(RevertReason::Unknown {
                selector: selector.into(),
                data: calldata,
            })),
        }
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, EvmError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.estimated_requests).push(request);
        lock(&self.estimate).clone().map_err(EvmError::GasEstimation)
    }

    async fn gas_price(&self) -> Result<u128, EvmError> {
        Ok(self.gas_price_wei())
    }

    async fn nonce_for(&self, address: Address) -> Result<u64, EvmError> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        let nonce = lock(&self.nonces).get(&address).copied();
        Ok(nonce.unwrap_or_else(|| self.nonce.load(Ordering::SeqCst)))
    }

    async fn balance_of(&self, address: Address) -> Result<U256, EvmError> {
        let balance = lock(&self.balances).get(&address).copied();
        Ok(balance.unwrap_or_else(|| *lock(&self.balance)))
    }

    async fn submit_raw(&self, _payload: Bytes) -> Result<TxHash, EvmError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TX_HASH)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, EvmError> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        if !*lock(&self.receipt_available) {
            return Err(EvmError::ConfirmationTimeout { tx_hash, timeout });
        }

        Ok(Receipt {
            transaction_hash: tx_hash,
            status: self.receipt_status.load(Ordering::SeqCst),
            block_hash: Some(B256::repeat_byte(0xbb)),
            block_number: Some(12345),
            gas_used: 90_000,
            effective_gas_price: self.gas_price_wei(),
            logs: lock(&self.receipt_logs).clone(),
        })
    }
}

/// Signer that records every request and returns a fixed payload.
pub(crate) struct RecordingSigner {
    address: Address,
    requests: Mutex<Vec<TransactionRequest>>,
}

impl RecordingSigner {
    pub(crate) fn new(address: Address) -> Self {
        Self {
            address,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<TransactionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl TxSigner for RecordingSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, request: TransactionRequest) -> Result<Bytes, EvmError> {
        lock(&self.requests).push(request);
        Ok(Bytes::from_static(&[0x02, 0xde, 0xad]))
    }
}

/// Receipt log announcing a vault created by the factory.
pub(crate) fn vault_created_log(vault: Address) -> Log {
    use alloy::sol_types::SolEvent;

    let event = ITransparentVaultFactory::OrionVaultCreated {
        vault,
        manager: MANAGER,
        strategist: STRATEGIST,
        name: "Alpha".into(),
        symbol: "ALP".into(),
        vaultType: 0,
    };
    log_from(FACTORY, event.encode_log_data(), 0)
}
