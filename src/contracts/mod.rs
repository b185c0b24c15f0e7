//! Typed wrappers over the Orion protocol contracts.
//!
//! Queries are single view calls with unit normalization where the chain
//! returns raw integer amounts. Mutations run their guards first and then
//! go through the registry's [`Orchestrator`](crate::transaction::Orchestrator).

mod config;
mod factory;
mod liquidity;
mod vault;

pub use config::OrionConfig;
pub use factory::{CreateVaultParams, VaultFactory, VaultType, get_vault_address_from_result};
pub use liquidity::LiquidityOrchestrator;
pub use vault::{DepositAccessControl, OrderIntent, TransparentVault};
