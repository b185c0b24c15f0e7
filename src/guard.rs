//! Precondition checks evaluated before any state-changing call.
//!
//! Every guard is a pure function over chain state that the caller has
//! already fetched. A failing guard returns before gas estimation, so it
//! costs nothing and never reaches the node's mempool.

use std::fmt;

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};

use crate::config::ConfigError;

/// Maximum UTF-8 length of a vault name.
pub const MAX_NAME_BYTES: usize = 26;

/// Maximum UTF-8 length of a vault symbol.
pub const MAX_SYMBOL_BYTES: usize = 4;

/// On-chain role a signer must hold for restricted vault operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Manager,
    Strategist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manager => write!(f, "manager"),
            Self::Strategist => write!(f, "strategist"),
        }
    }
}

/// Parameter bound violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} {value:?} is {actual} bytes, maximum is {max}")]
    TooLong {
        field: &'static str,
        value: String,
        max: usize,
        actual: usize,
    },
    #[error("{field} {requested} exceeds maximum {cap}")]
    FeeAboveCap {
        field: &'static str,
        requested: u16,
        cap: u16,
    },
    #[error("{field} must not be the zero address")]
    ZeroAddress { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("system is not idle, cannot {operation} at this time")]
    SystemBusy { operation: &'static str },
    #[error("signer {signer} is not the vault {role} {expected}")]
    UnauthorizedSigner {
        signer: Address,
        role: Role,
        expected: Address,
    },
    #[error("signer {signer} cannot send a transaction prepared for {caller}")]
    SignerMismatch { signer: Address, caller: Address },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("manager {manager} is not whitelisted to create vaults")]
    NotWhitelisted { manager: Address },
    #[error("insufficient ETH balance. Required: {required} ETH, Available: {available} ETH")]
    InsufficientFunds {
        required: String,
        available: String,
        required_wei: U256,
        available_wei: U256,
    },
}

pub fn assert_system_idle(is_idle: bool, operation: &'static str) -> Result<(), GuardError> {
    if is_idle {
        Ok(())
    } else {
        Err(GuardError::SystemBusy { operation })
    }
}

/// Fails unless `signer` is the address currently holding `role`.
pub fn assert_authorized_signer(
    signer: Address,
    role: Role,
    role_holder: Address,
) -> Result<(), GuardError> {
    if signer == role_holder {
        return Ok(());
    }

    Err(GuardError::UnauthorizedSigner {
        signer,
        role,
        expected: role_holder,
    })
}

/// Fails unless the signing key is the account the intent was built for.
pub fn assert_signer_is_caller(signer: Address, caller: Address) -> Result<(), GuardError> {
    if signer == caller {
        return Ok(());
    }

    Err(GuardError::SignerMismatch { signer, caller })
}

/// Caps the UTF-8 encoded length of `value`, not its character count.
pub fn assert_within_byte_length(
    value: &str,
    max_bytes: usize,
    field: &'static str,
) -> Result<(), GuardError> {
    let actual = value.len();
    if actual <= max_bytes {
        return Ok(());
    }

    Err(ValidationError::TooLong {
        field,
        value: value.to_owned(),
        max: max_bytes,
        actual,
    }
    .into())
}

pub fn assert_fee_within_cap(
    requested: u16,
    cap: u16,
    field: &'static str,
) -> Result<(), GuardError> {
    if requested <= cap {
        return Ok(());
    }

    Err(ValidationError::FeeAboveCap {
        field,
        requested,
        cap,
    }
    .into())
}

pub fn assert_manager_whitelisted(whitelisted: bool, manager: Address) -> Result<(), GuardError> {
    if whitelisted {
        Ok(())
    } else {
        Err(GuardError::NotWhitelisted { manager })
    }
}

/// Fails when `balance` cannot cover `estimated_cost` (both in wei).
pub fn assert_sufficient_balance(balance: U256, estimated_cost: U256) -> Result<(), GuardError> {
    if balance >= estimated_cost {
        return Ok(());
    }

    Err(GuardError::InsufficientFunds {
        required: format_ether(estimated_cost),
        available: format_ether(balance),
        required_wei: estimated_cost,
        available_wei: balance,
    })
}

pub fn assert_nonzero_address(address: Address, field: &'static str) -> Result<(), GuardError> {
    if address.is_zero() {
        return Err(ValidationError::ZeroAddress { field }.into());
    }

    Ok(())
}

/// Fails unless `vault` is one of the transparent vaults the root
/// configuration contract lists.
pub fn assert_vault_registered(registered: &[Address], vault: Address) -> Result<(), ConfigError> {
    if registered.contains(&vault) {
        return Ok(());
    }

    Err(ConfigError::UnregisteredVault { vault })
}
