use std::fmt;

use alloy::primitives::Address;
use clap::ValueEnum;
use orion_evm::{ChainClient, TxSigner};
use tracing::info;

use crate::bindings::ITransparentVaultFactory;
use crate::contracts::OrionConfig;
use crate::error::OrionError;
use crate::events::FactoryEvent;
use crate::fee_model::{FeeType, MAX_MANAGEMENT_FEE, MAX_PERFORMANCE_FEE};
use crate::guard::{
    MAX_NAME_BYTES, MAX_SYMBOL_BYTES, assert_fee_within_cap, assert_manager_whitelisted,
    assert_nonzero_address, assert_system_idle, assert_within_byte_length,
};
use crate::registry::{ContractHandle, ContractKind, ContractRegistry};
use crate::transaction::TransactionResult;

/// Vault flavours known to the protocol. Wire values match the root
/// configuration contract's vault registry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VaultType {
    Transparent,
    Encrypted,
}

impl VaultType {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Transparent => 0,
            Self::Encrypted => 1,
        }
    }
}

impl fmt::Display for VaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => write!(f, "transparent"),
            Self::Encrypted => write!(f, "encrypted"),
        }
    }
}

/// Parameters of a new transparent vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVaultParams {
    pub strategist: Address,
    pub name: String,
    pub symbol: String,
    pub fee_type: FeeType,
    /// Basis points.
    pub performance_fee: u16,
    /// Basis points.
    pub management_fee: u16,
    /// Zero address for permissionless deposits.
    pub deposit_access_control: Address,
}

impl CreateVaultParams {
    fn call(&self) -> ITransparentVaultFactory::createVaultCall {
        ITransparentVaultFactory::createVaultCall {
            strategist: self.strategist,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            feeType: self.fee_type.as_u8(),
            performanceFee: self.performance_fee,
            managementFee: self.management_fee,
            depositAccessControl: self.deposit_access_control,
        }
    }
}

pub struct VaultFactory<C> {
    handle: ContractHandle<C>,
    registry: ContractRegistry<C>,
}

impl<C: ChainClient> VaultFactory<C> {
    /// Binds the factory for `vault_type` as listed by the root
    /// configuration contract.
    ///
    /// # Errors
    ///
    /// [`OrionError::UnsupportedVaultType`] for encrypted vaults.
    pub async fn resolve(
        registry: &ContractRegistry<C>,
        vault_type: VaultType,
    ) -> Result<Self, OrionError> {
        let address = match vault_type {
            VaultType::Transparent => OrionConfig::new(registry).transparent_vault_factory().await?,
            VaultType::Encrypted => return Err(OrionError::UnsupportedVaultType(vault_type)),
        };

        Ok(Self::at(registry, address))
    }

    pub fn at(registry: &ContractRegistry<C>, address: Address) -> Self {
        Self {
            handle: registry.handle(ContractKind::TransparentVaultFactory, address),
            registry: registry.clone(),
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address
    }

    /// Deploys a transparent vault managed by `signer`.
    ///
    /// Guards run in order: strategist address, manager whitelist, name
    /// and symbol length, protocol fee caps, system idle. Any failure
    /// returns before gas is estimated.
    #[tracing::instrument(skip_all, fields(name = %params.name, symbol = %params.symbol), level = tracing::Level::INFO)]
    pub async fn create_orion_vault(
        &self,
        params: &CreateVaultParams,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<FactoryEvent>, OrionError> {
        let config = OrionConfig::new(&self.registry);
        let manager = signer.address();

        assert_nonzero_address(params.strategist, "strategist")?;
        assert_manager_whitelisted(config.is_whitelisted_manager(manager).await?, manager)?;
        assert_within_byte_length(&params.name, MAX_NAME_BYTES, "vault name")?;
        assert_within_byte_length(&params.symbol, MAX_SYMBOL_BYTES, "vault symbol")?;
        assert_fee_within_cap(params.performance_fee, MAX_PERFORMANCE_FEE, "performance fee")?;
        assert_fee_within_cap(params.management_fee, MAX_MANAGEMENT_FEE, "management fee")?;
        assert_system_idle(config.is_system_idle().await?, "deploy vault")?;

        info!(%manager, strategist = %params.strategist, "Creating vault");
        let intent = self.handle.intent(&params.call(), manager);
        let result = self
            .registry
            .orchestrator()
            .execute::<FactoryEvent>(intent, signer)
            .await?;

        if let Some(vault) = get_vault_address_from_result(&result) {
            info!(%vault, tx_hash = %result.tx_hash, "Vault created");
        }

        Ok(result)
    }
}

/// Address announced by the first `OrionVaultCreated` event, if any.
pub fn get_vault_address_from_result(result: &TransactionResult<FactoryEvent>) -> Option<Address> {
    result
        .decoded_logs
        .as_deref()?
        .iter()
        .find_map(|log| match &log.event {
            FactoryEvent::OrionVaultCreated(created) => Some(created.vault),
        })
}
