//! Contract registry: per-network deployments, ABI artifacts, and the
//! handles that bind a contract address to a chain client.
//!
//! Only the root configuration contract has a hard-coded address per
//! network. Every other address is discovered through calls on it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256, Bytes, FixedBytes, TxHash, address};
use alloy::sol_types::{SolCall, SolInterface};
use orion_evm::ChainClient;
use serde::Deserialize;
use tracing::{debug, info};

use crate::bindings::{
    ILiquidityOrchestrator, IOrionAccessControl, IOrionConfig, IOrionTransparentVault,
    ITransparentVaultFactory,
};
use crate::error::OrionError;
use crate::events::{EventSchema, FactoryEvent, VaultEvent};
use crate::transaction::{Orchestrator, TransactionIntent};

/// Where a network's protocol lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDeployment {
    pub chain_id: u64,
    pub name: &'static str,
    /// Root configuration contract.
    pub orion_config: Address,
    pub explorer: &'static str,
}

impl NetworkDeployment {
    pub fn explorer_tx_url(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{tx_hash}", self.explorer)
    }

    pub fn explorer_address_url(&self, address: Address) -> String {
        format!("{}/address/{address}", self.explorer)
    }
}

pub const DEPLOYMENTS: &[NetworkDeployment] = &[NetworkDeployment {
    chain_id: 11_155_111,
    name: "sepolia",
    orion_config: address!("0xc9e19770B9Ba4bC41795698Da777d04417513FE0"),
    explorer: "https://sepolia.etherscan.io",
}];

pub fn deployment_for(chain_id: u64) -> Result<&'static NetworkDeployment, RegistryError> {
    DEPLOYMENTS
        .iter()
        .find(|deployment| deployment.chain_id == chain_id)
        .ok_or(RegistryError::UnsupportedNetwork { chain_id })
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unsupported network id {chain_id}")]
    UnsupportedNetwork { chain_id: u64 },
    #[error("failed to read ABI artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid ABI artifact {artifact}: {source}")]
    ArtifactParse {
        artifact: &'static str,
        source: serde_json::Error,
    },
    #[error("{contract} artifact has no function with selector {selector}")]
    MissingFunction {
        contract: ContractKind,
        selector: FixedBytes<4>,
    },
    #[error("{contract} artifact has no event {event}")]
    MissingEvent {
        contract: ContractKind,
        event: &'static str,
    },
    #[error("{contract} artifact declares event {event} that the decoder does not know")]
    UndecodedEvent {
        contract: ContractKind,
        event: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    OrionConfig,
    LiquidityOrchestrator,
    TransparentVaultFactory,
    OrionTransparentVault,
    OrionAccessControl,
}

impl ContractKind {
    pub const ALL: [Self; 5] = [
        Self::OrionConfig,
        Self::LiquidityOrchestrator,
        Self::TransparentVaultFactory,
        Self::OrionTransparentVault,
        Self::OrionAccessControl,
    ];

    pub const fn artifact_name(self) -> &'static str {
        match self {
            Self::OrionConfig => "OrionConfig",
            Self::LiquidityOrchestrator => "LiquidityOrchestrator",
            Self::TransparentVaultFactory => "TransparentVaultFactory",
            Self::OrionTransparentVault => "OrionTransparentVault",
            Self::OrionAccessControl => "OrionAccessControl",
        }
    }

    const fn packaged_artifact(self) -> &'static str {
        match self {
            Self::OrionConfig => include_str!("../abis/OrionConfig.json"),
            Self::LiquidityOrchestrator => include_str!("../abis/LiquidityOrchestrator.json"),
            Self::TransparentVaultFactory => include_str!("../abis/TransparentVaultFactory.json"),
            Self::OrionTransparentVault => include_str!("../abis/OrionTransparentVault.json"),
            Self::OrionAccessControl => include_str!("../abis/OrionAccessControl.json"),
        }
    }

    /// Selectors of every function the typed binding calls.
    fn required_selectors(self) -> Vec<[u8; 4]> {
        match self {
            Self::OrionConfig => selectors::<IOrionConfig::IOrionConfigCalls>(),
            Self::LiquidityOrchestrator => {
                selectors::<ILiquidityOrchestrator::ILiquidityOrchestratorCalls>()
            }
            Self::TransparentVaultFactory => {
                selectors::<ITransparentVaultFactory::ITransparentVaultFactoryCalls>()
            }
            Self::OrionTransparentVault => {
                selectors::<IOrionTransparentVault::IOrionTransparentVaultCalls>()
            }
            Self::OrionAccessControl => {
                selectors::<IOrionAccessControl::IOrionAccessControlCalls>()
            }
        }
    }

    /// Events the decoder expects this contract to emit.
    fn required_events(self) -> &'static [(&'static str, B256)] {
        match self {
            Self::TransparentVaultFactory => FactoryEvent::EVENTS,
            Self::OrionTransparentVault => VaultEvent::EVENTS,
            Self::OrionConfig | Self::LiquidityOrchestrator | Self::OrionAccessControl => &[],
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_name())
    }
}

fn selectors<I: SolInterface>() -> Vec<[u8; 4]> {
    (0..I::COUNT).filter_map(I::selector_at).collect()
}

#[derive(Deserialize)]
struct Artifact {
    abi: JsonAbi,
}

/// Checks that `abi` declares everything the typed binding for `kind`
/// relies on.
fn verify_artifact(kind: ContractKind, abi: &JsonAbi) -> Result<(), RegistryError> {
    for selector in kind.required_selectors() {
        if !abi
            .functions()
            .any(|function| function.selector().0 == selector)
        {
            return Err(RegistryError::MissingFunction {
                contract: kind,
                selector: FixedBytes(selector),
            });
        }
    }

    let table = kind.required_events();
    for (event, topic) in table {
        if !abi.events().any(|declared| declared.selector() == *topic) {
            return Err(RegistryError::MissingEvent {
                contract: kind,
                event: *event,
            });
        }
    }

    // Contracts with an event table must decode every event they declare.
    if !table.is_empty()
        && let Some(unknown) = abi
            .events()
            .find(|declared| table.iter().all(|(_, topic)| declared.selector() != *topic))
    {
        return Err(RegistryError::UndecodedEvent {
            contract: kind,
            event: unknown.signature(),
        });
    }

    Ok(())
}

fn parse_artifact(kind: ContractKind, json: &str) -> Result<JsonAbi, RegistryError> {
    let artifact: Artifact =
        serde_json::from_str(json).map_err(|source| RegistryError::ArtifactParse {
            artifact: kind.artifact_name(),
            source,
        })?;
    verify_artifact(kind, &artifact.abi)?;
    Ok(artifact.abi)
}

/// Where ABI artifacts are loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AbiSource {
    /// Artifacts compiled into the binary.
    #[default]
    Packaged,
    /// `<dir>/<Contract>.json`, falling back to the packaged artifact for
    /// any file that is absent.
    Directory(PathBuf),
}

/// Verified ABI schemas, one per contract kind.
#[derive(Debug, Clone)]
pub struct AbiStore {
    orion_config: Arc<JsonAbi>,
    liquidity_orchestrator: Arc<JsonAbi>,
    transparent_vault_factory: Arc<JsonAbi>,
    orion_transparent_vault: Arc<JsonAbi>,
    orion_access_control: Arc<JsonAbi>,
}

impl AbiStore {
    pub fn load(source: &AbiSource) -> Result<Self, RegistryError> {
        let load = |kind| load_artifact(source, kind).map(Arc::new);

        Ok(Self {
            orion_config: load(ContractKind::OrionConfig)?,
            liquidity_orchestrator: load(ContractKind::LiquidityOrchestrator)?,
            transparent_vault_factory: load(ContractKind::TransparentVaultFactory)?,
            orion_transparent_vault: load(ContractKind::OrionTransparentVault)?,
            orion_access_control: load(ContractKind::OrionAccessControl)?,
        })
    }

    pub fn packaged() -> Result<Self, RegistryError> {
        Self::load(&AbiSource::Packaged)
    }

    pub fn get(&self, kind: ContractKind) -> Arc<JsonAbi> {
        let abi = match kind {
            ContractKind::OrionConfig => &self.orion_config,
            ContractKind::LiquidityOrchestrator => &self.liquidity_orchestrator,
            ContractKind::TransparentVaultFactory => &self.transparent_vault_factory,
            ContractKind::OrionTransparentVault => &self.orion_transparent_vault,
            ContractKind::OrionAccessControl => &self.orion_access_control,
        };
        Arc::clone(abi)
    }
}

fn load_artifact(source: &AbiSource, kind: ContractKind) -> Result<JsonAbi, RegistryError> {
    let AbiSource::Directory(dir) = source else {
        return parse_artifact(kind, kind.packaged_artifact());
    };

    let path = artifact_path(dir, kind);
    if !path.exists() {
        debug!(contract = %kind, path = %path.display(), "Artifact not overridden, using packaged");
        return parse_artifact(kind, kind.packaged_artifact());
    }

    let json = std::fs::read_to_string(&path)
        .map_err(|source| RegistryError::ArtifactIo { path: path.clone(), source })?;
    info!(contract = %kind, path = %path.display(), "Loaded ABI artifact override");
    parse_artifact(kind, &json)
}

fn artifact_path(dir: &Path, kind: ContractKind) -> PathBuf {
    dir.join(format!("{}.json", kind.artifact_name()))
}

/// A deployed contract bound to its schema and a chain client.
pub struct ContractHandle<C> {
    pub kind: ContractKind,
    pub address: Address,
    pub abi: Arc<JsonAbi>,
    client: Arc<C>,
}

impl<C> Clone for ContractHandle<C> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            address: self.address,
            abi: Arc::clone(&self.abi),
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> fmt::Debug for ContractHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("kind", &self.kind)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<C: ChainClient> ContractHandle<C> {
    /// Issues a view call and decodes its return value.
    pub async fn read<T: SolCall>(&self, call: &T) -> Result<T::Return, OrionError> {
        let output = self
            .client
            .call(self.address, Bytes::from(call.abi_encode()))
            .await?;

        Ok(T::abi_decode_returns(&output)?)
    }

    pub fn intent<T: SolCall>(&self, call: &T, caller: Address) -> TransactionIntent {
        TransactionIntent::new(self.address, call, caller)
    }
}

/// Resolves the protocol deployment for a network and hands out handles.
pub struct ContractRegistry<C> {
    client: Arc<C>,
    deployment: &'static NetworkDeployment,
    abis: AbiStore,
    orchestrator: Orchestrator<C>,
}

impl<C> Clone for ContractRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            deployment: self.deployment,
            abis: self.abis.clone(),
            orchestrator: self.orchestrator.clone(),
        }
    }
}

impl<C> fmt::Debug for ContractRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("deployment", &self.deployment)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl<C: ChainClient> ContractRegistry<C> {
    /// Resolves the deployment for `configured_chain_id`, or for the
    /// endpoint's own network id when none is configured.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedNetwork`] when no deployment is known
    /// for the resolved network id.
    pub async fn new(
        client: Arc<C>,
        configured_chain_id: Option<u64>,
        abis: AbiStore,
        receipt_timeout: Duration,
    ) -> Result<Self, OrionError> {
        let chain_id = match configured_chain_id {
            Some(chain_id) => chain_id,
            None => client.chain_id().await?,
        };
        let deployment = deployment_for(chain_id)?;
        info!(
            chain_id,
            network = deployment.name,
            orion_config = %deployment.orion_config,
            "Resolved protocol deployment"
        );

        Ok(Self {
            orchestrator: Orchestrator::new(Arc::clone(&client), receipt_timeout),
            client,
            deployment,
            abis,
        })
    }

    pub fn handle(&self, kind: ContractKind, address: Address) -> ContractHandle<C> {
        ContractHandle {
            kind,
            address,
            abi: self.abis.get(kind),
            client: Arc::clone(&self.client),
        }
    }

    pub fn root_config(&self) -> ContractHandle<C> {
        self.handle(ContractKind::OrionConfig, self.deployment.orion_config)
    }

    pub fn deployment(&self) -> &'static NetworkDeployment {
        self.deployment
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn orchestrator(&self) -> &Orchestrator<C> {
        &self.orchestrator
    }

    #[must_use]
    pub fn with_orchestrator(mut self, orchestrator: Orchestrator<C>) -> Self {
        self.orchestrator = orchestrator;
        self
    }
}
