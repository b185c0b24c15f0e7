use alloy::primitives::{Address, U256};
use orion_evm::ChainClient;

use crate::bindings::IOrionConfig;
use crate::contracts::VaultType;
use crate::error::OrionError;
use crate::registry::{ContractHandle, ContractRegistry};

/// Root configuration contract: protocol parameters, whitelists, and the
/// addresses of every other protocol contract.
pub struct OrionConfig<C> {
    handle: ContractHandle<C>,
}

impl<C> Clone for OrionConfig<C> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<C> std::fmt::Debug for OrionConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrionConfig")
            .field("address", &self.handle.address)
            .finish()
    }
}

impl<C: ChainClient> OrionConfig<C> {
    pub fn new(registry: &ContractRegistry<C>) -> Self {
        Self {
            handle: registry.root_config(),
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address
    }

    pub async fn underlying_asset(&self) -> Result<Address, OrionError> {
        self.handle.read(&IOrionConfig::underlyingAssetCall {}).await
    }

    pub async fn strategist_intent_decimals(&self) -> Result<u8, OrionError> {
        self.handle
            .read(&IOrionConfig::strategistIntentDecimalsCall {})
            .await
    }

    /// Same value as [`Self::strategist_intent_decimals`].
    pub async fn manager_intent_decimals(&self) -> Result<u8, OrionError> {
        self.strategist_intent_decimals().await
    }

    pub async fn token_decimals(&self, token: Address) -> Result<u8, OrionError> {
        self.handle
            .read(&IOrionConfig::getTokenDecimalsCall { token })
            .await
    }

    /// Decimals of the protocol's underlying asset.
    pub async fn underlying_decimals(&self) -> Result<u8, OrionError> {
        let underlying = self.underlying_asset().await?;
        self.token_decimals(underlying).await
    }

    pub async fn risk_free_rate(&self) -> Result<u16, OrionError> {
        self.handle.read(&IOrionConfig::riskFreeRateCall {}).await
    }

    pub async fn whitelisted_assets(&self) -> Result<Vec<Address>, OrionError> {
        self.handle
            .read(&IOrionConfig::getAllWhitelistedAssetsCall {})
            .await
    }

    pub async fn whitelisted_asset_names(&self) -> Result<Vec<String>, OrionError> {
        self.handle
            .read(&IOrionConfig::getAllWhitelistedAssetNamesCall {})
            .await
    }

    /// The assets a strategist may allocate to; same as
    /// [`Self::whitelisted_assets`].
    pub async fn investment_universe(&self) -> Result<Vec<Address>, OrionError> {
        self.whitelisted_assets().await
    }

    pub async fn is_whitelisted(&self, asset: Address) -> Result<bool, OrionError> {
        self.handle
            .read(&IOrionConfig::isWhitelistedCall { asset })
            .await
    }

    pub async fn is_whitelisted_manager(&self, manager: Address) -> Result<bool, OrionError> {
        self.handle
            .read(&IOrionConfig::isWhitelistedManagerCall { manager })
            .await
    }

    pub async fn transparent_vaults(&self) -> Result<Vec<Address>, OrionError> {
        self.handle
            .read(&IOrionConfig::getAllOrionVaultsCall {
                vaultType: VaultType::Transparent.as_u8(),
            })
            .await
    }

    pub async fn min_deposit_amount(&self) -> Result<U256, OrionError> {
        self.handle.read(&IOrionConfig::minDepositAmountCall {}).await
    }

    pub async fn min_redeem_amount(&self) -> Result<U256, OrionError> {
        self.handle.read(&IOrionConfig::minRedeemAmountCall {}).await
    }

    /// Volume fee coefficient.
    pub async fn v_fee_coefficient(&self) -> Result<u16, OrionError> {
        self.handle.read(&IOrionConfig::vFeeCoefficientCall {}).await
    }

    /// Revenue share fee coefficient.
    pub async fn rs_fee_coefficient(&self) -> Result<u16, OrionError> {
        self.handle.read(&IOrionConfig::rsFeeCoefficientCall {}).await
    }

    /// Seconds a vault must wait between fee model changes.
    pub async fn fee_change_cooldown_duration(&self) -> Result<U256, OrionError> {
        self.handle
            .read(&IOrionConfig::feeChangeCooldownDurationCall {})
            .await
    }

    pub async fn max_fulfill_batch_size(&self) -> Result<U256, OrionError> {
        self.handle
            .read(&IOrionConfig::maxFulfillBatchSizeCall {})
            .await
    }

    pub async fn is_system_idle(&self) -> Result<bool, OrionError> {
        self.handle.read(&IOrionConfig::isSystemIdleCall {}).await
    }

    pub async fn liquidity_orchestrator(&self) -> Result<Address, OrionError> {
        self.handle
            .read(&IOrionConfig::liquidityOrchestratorCall {})
            .await
    }

    pub async fn transparent_vault_factory(&self) -> Result<Address, OrionError> {
        self.handle
            .read(&IOrionConfig::transparentVaultFactoryCall {})
            .await
    }
}
