use alloy::primitives::{Address, U256};
use orion_evm::{ChainClient, TxSigner};
use rust_decimal::Decimal;
use tracing::info;

use crate::bindings::{IOrionAccessControl, IOrionTransparentVault};
use crate::contracts::OrionConfig;
use crate::error::OrionError;
use crate::events::VaultEvent;
use crate::fee_model::{FeeModel, FeeType};
use crate::guard::{
    Role, assert_authorized_signer, assert_fee_within_cap, assert_system_idle,
    assert_vault_registered,
};
use crate::registry::{ContractHandle, ContractKind, ContractRegistry};
use crate::transaction::TransactionResult;
use crate::units::to_decimal;

/// Target allocation submitted by a strategist: ordered `(token, weight)`
/// pairs, at most one per token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderIntent {
    positions: Vec<IOrionTransparentVault::IntentPosition>,
}

impl OrderIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight for `token`. A token already present keeps its
    /// position and takes the new weight.
    pub fn insert(&mut self, token: Address, weight: u32) {
        match self.positions.iter_mut().find(|position| position.token == token) {
            Some(position) => position.weight = weight,
            None => self
                .positions
                .push(IOrionTransparentVault::IntentPosition { token, weight }),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Address, u32)> + '_ {
        self.positions
            .iter()
            .map(|position| (position.token, position.weight))
    }
}

impl FromIterator<(Address, u32)> for OrderIntent {
    fn from_iter<I: IntoIterator<Item = (Address, u32)>>(iter: I) -> Self {
        let mut intent = Self::new();
        for (token, weight) in iter {
            intent.insert(token, weight);
        }
        intent
    }
}

/// Deposit gatekeeper contract configured on a vault.
pub struct DepositAccessControl<C> {
    handle: ContractHandle<C>,
}

impl<C: ChainClient> DepositAccessControl<C> {
    pub fn at(registry: &ContractRegistry<C>, address: Address) -> Self {
        Self {
            handle: registry.handle(ContractKind::OrionAccessControl, address),
        }
    }

    pub async fn can_request_deposit(&self, sender: Address) -> Result<bool, OrionError> {
        self.handle
            .read(&IOrionAccessControl::canRequestDepositCall { sender })
            .await
    }
}

/// A transparent vault registered in the root configuration contract.
pub struct TransparentVault<C> {
    handle: ContractHandle<C>,
    registry: ContractRegistry<C>,
}

impl<C> Clone for TransparentVault<C> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<C> std::fmt::Debug for TransparentVault<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransparentVault")
            .field("address", &self.handle.address)
            .finish()
    }
}

impl<C: ChainClient> TransparentVault<C> {
    /// Binds `address` after checking the root configuration contract
    /// lists it as a transparent vault.
    pub async fn connect(
        registry: &ContractRegistry<C>,
        address: Address,
    ) -> Result<Self, OrionError> {
        let registered = OrionConfig::new(registry).transparent_vaults().await?;
        assert_vault_registered(&registered, address)?;

        Ok(Self {
            handle: registry.handle(ContractKind::OrionTransparentVault, address),
            registry: registry.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.handle.address
    }

    fn config(&self) -> OrionConfig<C> {
        OrionConfig::new(&self.registry)
    }

    pub async fn max_performance_fee(&self) -> Result<u16, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::MAX_PERFORMANCE_FEECall {})
            .await
    }

    pub async fn max_management_fee(&self) -> Result<u16, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::MAX_MANAGEMENT_FEECall {})
            .await
    }

    pub async fn manager(&self) -> Result<Address, OrionError> {
        self.handle.read(&IOrionTransparentVault::managerCall {}).await
    }

    pub async fn strategist(&self) -> Result<Address, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::strategistCall {})
            .await
    }

    pub async fn is_decommissioning(&self) -> Result<bool, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::isDecommissioningCall {})
            .await
    }

    pub async fn active_fee_model(&self) -> Result<FeeModel, OrionError> {
        let raw = self
            .handle
            .read(&IOrionTransparentVault::activeFeeModelCall {})
            .await?;

        Ok(FeeModel::try_from(raw)?)
    }

    /// Total pending deposits across users, in underlying units. Without
    /// a batch size the protocol's maximum fulfill batch size is used.
    pub async fn pending_deposit(&self, fulfill_batch_size: Option<U256>) -> Result<U256, OrionError> {
        let batch_size = self.batch_size_or_default(fulfill_batch_size).await?;
        self.handle
            .read(&IOrionTransparentVault::pendingDepositCall {
                fulfillBatchSize: batch_size,
            })
            .await
    }

    /// Total pending redemptions across users, in shares.
    pub async fn pending_redeem(&self, fulfill_batch_size: Option<U256>) -> Result<U256, OrionError> {
        let batch_size = self.batch_size_or_default(fulfill_batch_size).await?;
        self.handle
            .read(&IOrionTransparentVault::pendingRedeemCall {
                fulfillBatchSize: batch_size,
            })
            .await
    }

    async fn batch_size_or_default(&self, batch_size: Option<U256>) -> Result<U256, OrionError> {
        match batch_size {
            Some(batch_size) => Ok(batch_size),
            None => self.config().max_fulfill_batch_size().await,
        }
    }

    pub async fn total_assets(&self) -> Result<U256, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::totalAssetsCall {})
            .await
    }

    /// Fees accrued to the manager, in units of the underlying asset.
    pub async fn pending_vault_fees(&self) -> Result<Decimal, OrionError> {
        let raw = self
            .handle
            .read(&IOrionTransparentVault::pendingVaultFeesCall {})
            .await?;
        let decimals = self.config().underlying_decimals().await?;

        Ok(to_decimal(raw, decimals)?)
    }

    pub async fn share_decimals(&self) -> Result<u8, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::decimalsCall {})
            .await
    }

    /// Assets redeemable for one whole share.
    pub async fn share_price(&self) -> Result<U256, OrionError> {
        let decimals = self.share_decimals().await?;
        let one_share = U256::from(10u64).pow(U256::from(decimals));

        self.convert_to_assets(one_share).await
    }

    pub async fn convert_to_assets(&self, shares: U256) -> Result<U256, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::convertToAssetsCall { shares })
            .await
    }

    /// Current holdings as `(token, value)` pairs in contract order.
    pub async fn portfolio(&self) -> Result<Vec<(Address, U256)>, OrionError> {
        let IOrionTransparentVault::getPortfolioReturn {
            tokens,
            sharesPerAsset,
        } = self
            .handle
            .read(&IOrionTransparentVault::getPortfolioCall {})
            .await?;

        if tokens.len() != sharesPerAsset.len() {
            return Err(OrionError::MalformedPortfolio {
                tokens: tokens.len(),
                values: sharesPerAsset.len(),
            });
        }

        Ok(tokens.into_iter().zip(sharesPerAsset).collect())
    }

    pub async fn max_deposit(&self, receiver: Address) -> Result<U256, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::maxDepositCall { receiver })
            .await
    }

    pub async fn deposit_access_control(&self) -> Result<Address, OrionError> {
        self.handle
            .read(&IOrionTransparentVault::depositAccessControlCall {})
            .await
    }

    /// Whether `user` may request a deposit. Always true when the vault
    /// has no access control contract.
    pub async fn can_request_deposit(&self, user: Address) -> Result<bool, OrionError> {
        let access_control = self.deposit_access_control().await?;
        if access_control.is_zero() {
            return Ok(true);
        }

        DepositAccessControl::at(&self.registry, access_control)
            .can_request_deposit(user)
            .await
    }

    pub async fn request_deposit(
        &self,
        assets: U256,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        info!(vault = %self.address(), %assets, "Requesting deposit");
        self.execute(&IOrionTransparentVault::requestDepositCall { assets }, signer)
            .await
    }

    pub async fn cancel_deposit_request(
        &self,
        amount: U256,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        info!(vault = %self.address(), %amount, "Cancelling deposit request");
        self.execute(
            &IOrionTransparentVault::cancelDepositRequestCall { amount },
            signer,
        )
        .await
    }

    pub async fn request_redeem(
        &self,
        shares: U256,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        info!(vault = %self.address(), %shares, "Requesting redeem");
        self.execute(&IOrionTransparentVault::requestRedeemCall { shares }, signer)
            .await
    }

    pub async fn cancel_redeem_request(
        &self,
        shares: U256,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        info!(vault = %self.address(), %shares, "Cancelling redeem request");
        self.execute(
            &IOrionTransparentVault::cancelRedeemRequestCall { shares },
            signer,
        )
        .await
    }

    pub async fn update_strategist(
        &self,
        new_strategist: Address,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        self.assert_idle("update strategist").await?;
        self.assert_role(signer, Role::Manager).await?;

        info!(vault = %self.address(), %new_strategist, "Updating strategist");
        self.execute(
            &IOrionTransparentVault::updateStrategistCall {
                newStrategist: new_strategist,
            },
            signer,
        )
        .await
    }

    /// Replaces the fee model. Fees are checked against this vault's own
    /// caps, which may be tighter than the protocol-wide ones.
    pub async fn update_fee_model(
        &self,
        fee_type: FeeType,
        performance_fee: u16,
        management_fee: u16,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        self.assert_idle("update fee model").await?;
        assert_fee_within_cap(
            performance_fee,
            self.max_performance_fee().await?,
            "performance fee",
        )?;
        assert_fee_within_cap(
            management_fee,
            self.max_management_fee().await?,
            "management fee",
        )?;
        self.assert_role(signer, Role::Manager).await?;

        info!(
            vault = %self.address(),
            %fee_type,
            performance_fee,
            management_fee,
            "Updating fee model"
        );
        self.execute(
            &IOrionTransparentVault::updateFeeModelCall {
                feeType: fee_type.as_u8(),
                performanceFee: performance_fee,
                managementFee: management_fee,
            },
            signer,
        )
        .await
    }

    /// Sets the deposit gatekeeper; the zero address removes it.
    pub async fn set_deposit_access_control(
        &self,
        access_control: Address,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        self.assert_idle("set deposit access control").await?;
        self.assert_role(signer, Role::Manager).await?;

        info!(vault = %self.address(), %access_control, "Setting deposit access control");
        self.execute(
            &IOrionTransparentVault::setDepositAccessControlCall {
                newDepositAccessControl: access_control,
            },
            signer,
        )
        .await
    }

    /// Claims `amount` of accrued manager fees.
    pub async fn transfer_manager_fees(
        &self,
        amount: U256,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        self.assert_idle("transfer manager fees").await?;
        self.assert_role(signer, Role::Manager).await?;

        info!(vault = %self.address(), %amount, "Claiming vault fees");
        self.execute(&IOrionTransparentVault::claimVaultFeesCall { amount }, signer)
            .await
    }

    pub async fn submit_order_intent(
        &self,
        order: &OrderIntent,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        self.assert_idle("submit order intent").await?;
        self.assert_role(signer, Role::Strategist).await?;

        info!(vault = %self.address(), positions = order.len(), "Submitting order intent");
        self.execute(
            &IOrionTransparentVault::submitIntentCall {
                order: order.positions.clone(),
            },
            signer,
        )
        .await
    }

    async fn assert_idle(&self, operation: &'static str) -> Result<(), OrionError> {
        assert_system_idle(self.config().is_system_idle().await?, operation)?;
        Ok(())
    }

    async fn assert_role(&self, signer: &dyn TxSigner, role: Role) -> Result<(), OrionError> {
        let holder = match role {
            Role::Manager => self.manager().await?,
            Role::Strategist => self.strategist().await?,
        };
        assert_authorized_signer(signer.address(), role, holder)?;
        Ok(())
    }

    async fn execute<T: alloy::sol_types::SolCall>(
        &self,
        call: &T,
        signer: &dyn TxSigner,
    ) -> Result<TransactionResult<VaultEvent>, OrionError> {
        let intent = self.handle.intent(call, signer.address());
        self.registry
            .orchestrator()
            .execute::<VaultEvent>(intent, signer)
            .await
    }
}
