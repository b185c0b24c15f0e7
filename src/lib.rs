//! Client-side orchestration for Orion Finance vaults: contract
//! resolution, precondition guards, transaction execution and event
//! decoding on top of an EVM chain client.

pub mod bindings;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod error;
pub mod events;
pub mod fee_model;
pub mod guard;
pub mod registry;
pub mod transaction;
pub mod units;

pub use config::{Ctx, setup_tracing};
pub use error::OrionError;

#[cfg(test)]
pub(crate) mod test_utils;
