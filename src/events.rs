//! Receipt log decoding into typed contract events.
//!
//! Each contract declares its event table with [`event_table!`]. Logs
//! are decoded against the table in declaration order and the first
//! event that decodes wins. Logs emitted by other addresses are skipped.

use std::fmt;

use alloy::primitives::{Address, B256, LogData, TxHash};
use alloy::rpc::types::Log;
use tracing::debug;

use crate::bindings::{IOrionTransparentVault, ITransparentVaultFactory};

/// A contract's declared set of events.
pub trait EventSchema: Sized + Clone + fmt::Debug + Send + Sync + 'static {
    /// Name of the contract emitting these events.
    const CONTRACT: &'static str;

    /// Event name and topic0 for every event, in decode order.
    const EVENTS: &'static [(&'static str, B256)];

    fn try_decode(log: &LogData) -> Option<Self>;

    fn name(&self) -> &'static str;
}

/// Declares an enum of typed events together with its [`EventSchema`].
macro_rules! event_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $contract:literal {
            $($variant:ident($event:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $($variant($event)),+
        }

        impl $crate::events::EventSchema for $name {
            const CONTRACT: &'static str = $contract;

            const EVENTS: &'static [(&'static str, ::alloy::primitives::B256)] = &[
                $((
                    stringify!($variant),
                    <$event as ::alloy::sol_types::SolEvent>::SIGNATURE_HASH,
                )),+
            ];

            fn try_decode(log: &::alloy::primitives::LogData) -> Option<Self> {
                $(
                    if let Ok(event) =
                        <$event as ::alloy::sol_types::SolEvent>::decode_log_data(log)
                    {
                        return Some(Self::$variant(event));
                    }
                )+
                None
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($variant)),+
                }
            }
        }
    };
}

event_table! {
    /// Events emitted by the transparent vault factory.
    pub enum FactoryEvent for "TransparentVaultFactory" {
        OrionVaultCreated(ITransparentVaultFactory::OrionVaultCreated),
    }
}

event_table! {
    /// Events emitted by a transparent vault.
    pub enum VaultEvent for "OrionTransparentVault" {
        DepositRequest(IOrionTransparentVault::DepositRequest),
        DepositRequestCancelled(IOrionTransparentVault::DepositRequestCancelled),
        RedeemRequest(IOrionTransparentVault::RedeemRequest),
        RedeemRequestCancelled(IOrionTransparentVault::RedeemRequestCancelled),
        StrategistUpdated(IOrionTransparentVault::StrategistUpdated),
        FeeModelUpdated(IOrionTransparentVault::FeeModelUpdated),
        DepositAccessControlUpdated(IOrionTransparentVault::DepositAccessControlUpdated),
        VaultFeesClaimed(IOrionTransparentVault::VaultFeesClaimed),
        OrderSubmitted(IOrionTransparentVault::OrderSubmitted),
        Transfer(IOrionTransparentVault::Transfer),
    }
}

/// A receipt log decoded into a typed event, with its position metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog<E> {
    pub name: &'static str,
    pub event: E,
    pub address: Address,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<TxHash>,
    pub transaction_index: Option<u64>,
}

/// Decodes the logs emitted by `contract`, preserving receipt order.
pub fn decode_logs<E: EventSchema>(contract: Address, logs: &[Log]) -> Vec<DecodedLog<E>> {
    logs.iter()
        .filter(|log| log.address() == contract)
        .filter_map(|log| {
            let Some(event) = E::try_decode(log.data()) else {
                debug!(
                    contract = E::CONTRACT,
                    topic0 = ?log.topic0(),
                    log_index = ?log.log_index,
                    "Log matches no declared event"
                );
                return None;
            };

            Some(DecodedLog {
                name: event.name(),
                event,
                address: log.address(),
                block_hash: log.block_hash,
                block_number: log.block_number,
                log_index: log.log_index,
                transaction_hash: log.transaction_hash,
                transaction_index: log.transaction_index,
            })
        })
        .collect()
}
