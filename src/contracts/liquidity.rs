use std::time::Duration;

use alloy::primitives::{Address, U256};
use orion_evm::ChainClient;

use crate::bindings::ILiquidityOrchestrator;
use crate::contracts::OrionConfig;
use crate::error::OrionError;
use crate::registry::{ContractHandle, ContractKind, ContractRegistry};

/// Liquidity orchestrator: epoch scheduling and rebalancing parameters.
pub struct LiquidityOrchestrator<C> {
    handle: ContractHandle<C>,
}

impl<C: ChainClient> LiquidityOrchestrator<C> {
    /// Binds the orchestrator the root configuration contract points to.
    pub async fn resolve(registry: &ContractRegistry<C>) -> Result<Self, OrionError> {
        let address = OrionConfig::new(registry).liquidity_orchestrator().await?;
        Ok(Self::at(registry, address))
    }

    pub fn at(registry: &ContractRegistry<C>, address: Address) -> Self {
        Self {
            handle: registry.handle(ContractKind::LiquidityOrchestrator, address),
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address
    }

    pub async fn target_buffer_ratio(&self) -> Result<U256, OrionError> {
        self.handle
            .read(&ILiquidityOrchestrator::targetBufferRatioCall {})
            .await
    }

    pub async fn slippage_tolerance(&self) -> Result<U256, OrionError> {
        self.handle
            .read(&ILiquidityOrchestrator::slippageToleranceCall {})
            .await
    }

    pub async fn epoch_duration(&self) -> Result<Duration, OrionError> {
        let seconds = self
            .handle
            .read(&ILiquidityOrchestrator::epochDurationCall {})
            .await?;

        Ok(Duration::from_secs(u64::from(seconds)))
    }
}
