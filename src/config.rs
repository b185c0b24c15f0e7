use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::providers::RootProvider;
use clap::Parser;
use orion_evm::{
    DEFAULT_RECEIPT_TIMEOUT, EvmClient, EvmError, RawPrivateKeySigner, http_client_with_retry,
};
use serde::Deserialize;
use tracing::Level;
use url::Url;

use crate::error::OrionError;
use crate::guard::Role;
use crate::registry::{AbiSource, AbiStore, ContractRegistry};

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Parser, Debug)]
pub struct Env {
    /// Path to plaintext TOML configuration file
    #[clap(long)]
    pub config: PathBuf,
    /// Path to TOML secrets file (RPC endpoint and private keys)
    #[clap(long)]
    pub secrets: PathBuf,
}

/// Non-secret settings deserialized from the plaintext config TOML.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Config {
    log_level: Option<LogLevel>,
    #[serde(default)]
    evm: EvmConfig,
    abi_dir: Option<PathBuf>,
    vault: Option<Address>,
    decode_events: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct EvmConfig {
    chain_id: Option<u64>,
    receipt_timeout_secs: Option<u64>,
    receipt_poll_interval_ms: Option<u64>,
}

/// Secret credentials deserialized from the secrets TOML.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Secrets {
    evm: EvmSecrets,
    #[serde(default)]
    keys: KeySecrets,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EvmSecrets {
    rpc_url: Url,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct KeySecrets {
    manager_private_key: Option<B256>,
    strategist_private_key: Option<B256>,
}

// ===== Runtime types (assembled from Config + Secrets) =====

/// Runtime context for the CLI, assembled from plaintext config and
/// secrets.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub log_level: LogLevel,
    pub evm: EvmCtx,
    pub abi_source: AbiSource,
    pub vault: Option<Address>,
    pub decode_events: bool,
    keys: KeyRing,
}

#[derive(Clone)]
pub struct EvmCtx {
    pub rpc_url: Url,
    /// Expected network id. When unset, the endpoint's own id is used.
    pub chain_id: Option<u64>,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

impl std::fmt::Debug for EvmCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmCtx")
            .field("rpc_url", &"[REDACTED]")
            .field("chain_id", &self.chain_id)
            .field("receipt_timeout", &self.receipt_timeout)
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .finish()
    }
}

/// Raw private keys per role.
#[derive(Clone, Default)]
struct KeyRing {
    manager: Option<B256>,
    strategist: Option<B256>,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<B256>| key.map(|_| "[REDACTED]");

        f.debug_struct("KeyRing")
            .field("manager", &redact(&self.manager))
            .field("strategist", &redact(&self.strategist))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("{role} private key is not configured")]
    MissingKey { role: Role },
    #[error("{role} private key is invalid")]
    InvalidKey {
        role: Role,
        #[source]
        source: EvmError,
    },
    #[error("no vault address configured, pass --vault or set `vault` in the config file")]
    MissingVault,
    #[error("{vault} is not a transparent vault registered in the root configuration contract")]
    UnregisteredVault { vault: Address },
}

impl Ctx {
    pub fn load_files(config: &Path, secrets: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(config)?;
        let secrets_str = std::fs::read_to_string(secrets)?;
        Self::from_toml(&config_str, &secrets_str)
    }

    pub fn from_toml(config_toml: &str, secrets_toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_toml)?;
        let secrets: Secrets = toml::from_str(secrets_toml)?;

        let evm = EvmCtx {
            rpc_url: secrets.evm.rpc_url,
            chain_id: config.evm.chain_id,
            receipt_timeout: config
                .evm
                .receipt_timeout_secs
                .map_or(DEFAULT_RECEIPT_TIMEOUT, Duration::from_secs),
            receipt_poll_interval: Duration::from_millis(
                config
                    .evm
                    .receipt_poll_interval_ms
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
        };

        let abi_source = config
            .abi_dir
            .map_or(AbiSource::Packaged, AbiSource::Directory);

        Ok(Self {
            log_level: config.log_level.unwrap_or(LogLevel::Info),
            evm,
            abi_source,
            vault: config.vault,
            decode_events: config.decode_events.unwrap_or(true),
            keys: KeyRing {
                manager: secrets.keys.manager_private_key,
                strategist: secrets.keys.strategist_private_key,
            },
        })
    }

    /// Local signer for `role`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] when no key is configured for the role,
    /// [`ConfigError::InvalidKey`] when it is not a valid secp256k1 scalar.
    pub fn signer(&self, role: Role) -> Result<RawPrivateKeySigner, ConfigError> {
        let key = match role {
            Role::Manager => self.keys.manager,
            Role::Strategist => self.keys.strategist,
        }
        .ok_or(ConfigError::MissingKey { role })?;

        RawPrivateKeySigner::new(&key).map_err(|source| ConfigError::InvalidKey { role, source })
    }

    /// Vault to operate on: `explicit` if given, else the configured one.
    pub fn vault_address(&self, explicit: Option<Address>) -> Result<Address, ConfigError> {
        explicit.or(self.vault).ok_or(ConfigError::MissingVault)
    }

    /// Connects to the RPC endpoint and resolves the protocol deployment.
    pub async fn connect(&self) -> Result<ContractRegistry<EvmClient<RootProvider>>, OrionError> {
        let provider = RootProvider::new(http_client_with_retry(self.evm.rpc_url.clone()));
        let client = EvmClient::connect(provider, self.evm.rpc_url.clone(), self.evm.chain_id)
            .await?
            .with_poll_interval(self.evm.receipt_poll_interval);
        let abis = AbiStore::load(&self.abi_source)?;

        let registry =
            ContractRegistry::new(Arc::new(client), self.evm.chain_id, abis, self.evm.receipt_timeout)
                .await?;
        let orchestrator = registry
            .orchestrator()
            .clone()
            .with_event_decoding(self.decode_events);

        Ok(registry.with_orchestrator(orchestrator))
    }
}

pub fn setup_tracing(log_level: &LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!("orion_vaults={level},orion_evm={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
