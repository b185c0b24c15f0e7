//! Contract error decoding utilities.
//!
//! Decodes Solidity revert data returned by the node into a
//! [`RevertReason`] using a fixed table of custom errors raised by the
//! Orion contracts, plus the standard `Error(string)` and
//! `Panic(uint256)` encodings.

use std::fmt;

use alloy::hex;
use alloy::primitives::{Bytes, FixedBytes, U256};
use alloy::sol_types::{Panic, Revert, SolError};
use alloy::transports::{RpcError, TransportErrorKind};
use tracing::debug;

alloy::sol! {
    error NotAuthorized();
    error Unauthorized();
    error SystemNotIdle();
    error ZeroAddress();
    error InvalidArguments();
    error OwnableUnauthorizedAccount(address account);
}

/// Custom errors with a fixed, known selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownRevert {
    /// `NotAuthorized()`, `0xea8e4eb5`. Raised by the factory when the
    /// caller is not a whitelisted manager and by vaults on role checks.
    NotAuthorized,
    Unauthorized,
    SystemNotIdle,
    ZeroAddress,
    InvalidArguments,
    OwnableUnauthorizedAccount,
}

impl KnownRevert {
    const TABLE: [(Self, [u8; 4]); 6] = [
        (Self::NotAuthorized, NotAuthorized::SELECTOR),
        (Self::Unauthorized, Unauthorized::SELECTOR),
        (Self::SystemNotIdle, SystemNotIdle::SELECTOR),
        (Self::ZeroAddress, ZeroAddress::SELECTOR),
        (Self::InvalidArguments, InvalidArguments::SELECTOR),
        (
            Self::OwnableUnauthorizedAccount,
            OwnableUnauthorizedAccount::SELECTOR,
        ),
    ];

    pub fn from_selector(selector: [u8; 4]) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, known)| *known == selector)
            .map(|(revert, _)| *revert)
    }

    pub fn selector(self) -> [u8; 4] {
        Self::TABLE
            .iter()
            .find(|(revert, _)| *revert == self)
            .map_or([0; 4], |(_, selector)| *selector)
    }

    /// Scans free-form node error text for a known selector.
    ///
    /// Some endpoints only report `execution reverted: 0xea8e4eb5...` in
    /// the message and omit the `data` field.
    pub fn find_in_message(message: &str) -> Option<Self> {
        let lowered = message.to_ascii_lowercase();
        Self::TABLE
            .iter()
            .find(|(_, selector)| lowered.contains(&hex::encode_prefixed(selector)))
            .map(|(revert, _)| *revert)
    }

    fn describe(self) -> &'static str {
        match self {
            Self::NotAuthorized => "not authorized (caller is not a whitelisted manager or role holder)",
            Self::Unauthorized => "unauthorized caller",
            Self::SystemNotIdle => "protocol system is not idle",
            Self::ZeroAddress => "zero address supplied",
            Self::InvalidArguments => "invalid arguments",
            Self::OwnableUnauthorizedAccount => "caller is not the owner",
        }
    }
}

impl fmt::Display for KnownRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.describe(),
            hex::encode_prefixed(self.selector())
        )
    }
}

/// Best-effort interpretation of a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    Known(KnownRevert),
    /// `Error(string)` revert.
    Message(String),
    /// `Panic(uint256)` revert.
    Panic(U256),
    Unknown {
        selector: FixedBytes<4>,
        data: Bytes,
    },
    /// No revert data available; the raw node error.
    Other(String),
}

impl RevertReason {
    /// Decode raw revert data.
    pub fn from_revert_data(data: &[u8]) -> Self {
        let Some(selector) = data.get(..4) else {
            return Self::Other(format!("malformed revert data {}", hex::encode_prefixed(data)));
        };
        let mut selector_bytes = [0u8; 4];
        selector_bytes.copy_from_slice(selector);

        if let Some(known) = KnownRevert::from_selector(selector_bytes) {
            return Self::Known(known);
        }

        if selector_bytes == Revert::SELECTOR {
            if let Ok(revert) = Revert::abi_decode(data) {
                return Self::Message(revert.reason);
            }
        }

        if selector_bytes == Panic::SELECTOR {
            if let Ok(panic) = Panic::abi_decode(data) {
                return Self::Panic(panic.code);
            }
        }

        debug!(selector = %hex::encode_prefixed(selector_bytes), "Unrecognized revert selector");
        Self::Unknown {
            selector: FixedBytes(selector_bytes),
            data: Bytes::copy_from_slice(data),
        }
    }

    pub fn known(&self) -> Option<KnownRevert> {
        match self {
            Self::Known(known) => Some(*known),
            _ => None,
        }
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(known) => write!(f, "{known}"),
            Self::Message(message) => write!(f, "reverted with reason: {message}"),
            Self::Panic(code) => write!(f, "panicked with code {code:#x}"),
            Self::Unknown { selector, .. } => write!(f, "unknown error {selector}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

/// Extracts a revert reason from a JSON-RPC error, if the node sent one.
///
/// Returns `None` for errors that never reached contract execution
/// (connection failures, serialization errors, ...).
pub fn decode_rpc_error(err: &RpcError<TransportErrorKind>) -> Option<RevertReason> {
    let payload = err.as_error_resp()?;

    if let Some(data) = payload.as_revert_data() {
        return Some(RevertReason::from_revert_data(&data));
    }

    if let Some(known) = KnownRevert::find_in_message(&payload.message) {
        return Some(RevertReason::Known(known));
    }

    debug!(message = %payload.message, "Error response without revert data");
    None
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::TransportError;

    use super::*;

    fn create_error_with_revert_data(data: &Bytes) -> TransportError {
        let hex = hex::encode_prefixed(data);
        let raw = serde_json::value::to_raw_value(&hex).expect("valid json");
        let payload = ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: Some(raw),
        };
        TransportError::ErrorResp(payload)
    }

    #[test]
    fn not_authorized_selector_is_fixed() {
        assert_eq!(
            KnownRevert::NotAuthorized.selector(),
            [0xea, 0x8e, 0x4e, 0xb5]
        );
    }

    #[test]
    fn returns_none_when_no_error_response() {
        let error = TransportError::local_usage_str("connection refused");

        assert_eq!(decode_rpc_error(&error), None);
    }

    #[test]
    fn decodes_known_custom_error() {
        let data = Bytes::from(NotAuthorized {}.abi_encode());
        let error = create_error_with_revert_data(&data);

        let reason = decode_rpc_error(&error).unwrap();

        assert_eq!(reason, RevertReason::Known(KnownRevert::NotAuthorized));
        assert!(reason.to_string().contains("0xea8e4eb5"), "got: {reason}");
    }

    #[test]
    fn decodes_known_error_with_arguments() {
        let data = Bytes::from(
            OwnableUnauthorizedAccount {
                account: address!("0x1111111111111111111111111111111111111111"),
            }
            .abi_encode(),
        );

        assert_eq!(
            RevertReason::from_revert_data(&data),
            RevertReason::Known(KnownRevert::OwnableUnauthorizedAccount)
        );
    }

    #[test]
    fn decodes_error_string() {
        let data = Bytes::from(
            Revert {
                reason: "insufficient balance".into(),
            }
            .abi_encode(),
        );
        let error = create_error_with_revert_data(&data);

        let reason = decode_rpc_error(&error).unwrap();

        assert_eq!(reason, RevertReason::Message("insufficient balance".into()));
        assert!(reason.to_string().contains("insufficient balance"));
    }

    #[test]
    fn decodes_panic_code() {
        let data = Bytes::from(
            Panic {
                code: U256::from(0x11),
            }
            .abi_encode(),
        );

        assert_eq!(
            RevertReason::from_revert_data(&data),
            RevertReason::Panic(U256::from(0x11))
        );
    }

    #[test]
    fn unrecognized_selector_keeps_raw_selector() {
        let data = Bytes::from(vec![0x12, 0x34, 0x56, 0x78, 0x00, 0x00, 0x00, 0x00]);

        let reason = RevertReason::from_revert_data(&data);

        let msg = reason.to_string();
        assert!(msg.contains("unknown error"), "got: {msg}");
        assert!(msg.contains("12345678"), "got: {msg}");
    }

    #[test]
    fn malformed_revert_data_is_other() {
        let reason = RevertReason::from_revert_data(&[0x12, 0x34]);

        assert!(matches!(reason, RevertReason::Other(_)), "got {reason:?}");
    }

    #[test]
    fn finds_selector_in_message_without_data() {
        let payload = ErrorPayload {
            code: -32000,
            message: "execution reverted: revert 0xEA8E4EB5".into(),
            data: None,
        };
        let error = TransportError::ErrorResp(payload);

        assert_eq!(
            decode_rpc_error(&error),
            Some(RevertReason::Known(KnownRevert::NotAuthorized))
        );
    }
}
