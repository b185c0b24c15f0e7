//! Vault fee model: fee kinds, rates, and the protocol-level caps.

use std::fmt;

use alloy::primitives::U256;
use clap::ValueEnum;

use crate::bindings::IOrionTransparentVault;

/// Protocol cap on the performance fee accepted at vault creation, in
/// basis points.
pub const MAX_PERFORMANCE_FEE: u16 = 3000;

/// Protocol cap on the management fee accepted at vault creation, in
/// basis points.
pub const MAX_MANAGEMENT_FEE: u16 = 300;

/// How the performance fee is computed. Wire values are `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum FeeType {
    /// Fee on the latest return, no hurdle or high-water mark
    Absolute,
    /// Fee unlocked once the hurdle rate is reached
    SoftHurdle,
    /// Fee only above a fixed hurdle rate
    HardHurdle,
    /// Fee only on gains above the previous peak
    HighWaterMark,
    /// Hard hurdle combined with a high-water mark
    HurdleHwm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown fee type {0}, expected 0..=4")]
pub struct UnknownFeeType(pub u8);

impl FeeType {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Absolute => 0,
            Self::SoftHurdle => 1,
            Self::HardHurdle => 2,
            Self::HighWaterMark => 3,
            Self::HurdleHwm => 4,
        }
    }
}

impl From<FeeType> for u8 {
    fn from(fee_type: FeeType) -> Self {
        fee_type.as_u8()
    }
}

impl TryFrom<u8> for FeeType {
    type Error = UnknownFeeType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Absolute),
            1 => Ok(Self::SoftHurdle),
            2 => Ok(Self::HardHurdle),
            3 => Ok(Self::HighWaterMark),
            4 => Ok(Self::HurdleHwm),
            other => Err(UnknownFeeType(other)),
        }
    }
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absolute => "absolute",
            Self::SoftHurdle => "soft_hurdle",
            Self::HardHurdle => "hard_hurdle",
            Self::HighWaterMark => "high_water_mark",
            Self::HurdleHwm => "hurdle_hwm",
        };
        write!(f, "{name}")
    }
}

/// Fee model currently active on a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeModel {
    pub fee_type: FeeType,
    /// Basis points.
    pub performance_fee: u16,
    /// Basis points.
    pub management_fee: u16,
    pub high_water_mark: U256,
}

impl TryFrom<IOrionTransparentVault::FeeModel> for FeeModel {
    type Error = UnknownFeeType;

    fn try_from(raw: IOrionTransparentVault::FeeModel) -> Result<Self, Self::Error> {
        Ok(Self {
            fee_type: FeeType::try_from(raw.feeType)?,
            performance_fee: raw.performanceFee,
            management_fee: raw.managementFee,
            high_water_mark: raw.highWaterMark,
        })
    }
}
