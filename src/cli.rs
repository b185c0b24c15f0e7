use std::io::Write;

use alloy::primitives::{Address, TxHash};
use clap::{Parser, Subcommand};
use orion_evm::ChainClient;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::config::{Ctx, Env};
use crate::contracts::{
    CreateVaultParams, LiquidityOrchestrator, OrderIntent, OrionConfig, TransparentVault,
    VaultFactory, VaultType, get_vault_address_from_result,
};
use crate::error::OrionError;
use crate::events::{EventSchema, FactoryEvent, VaultEvent, decode_logs};
use crate::fee_model::FeeType;
use crate::guard::Role;
use crate::registry::ContractRegistry;
use crate::transaction::TransactionResult;
use crate::units::from_decimal;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid allocation {value:?}, expected <token>=<weight>")]
    InvalidAllocation { value: String },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show protocol parameters from the root configuration contract
    Config,
    /// Show a vault's roles, fees and balances
    Vault {
        /// Vault address (defaults to `vault` in the config file)
        #[arg(long)]
        vault: Option<Address>,
    },
    /// Show a vault's current holdings
    Portfolio {
        #[arg(long)]
        vault: Option<Address>,
    },
    /// Deploy a transparent vault managed by the configured manager key
    DeployVault {
        #[arg(long)]
        strategist: Address,
        /// Vault name, at most 26 bytes
        #[arg(long)]
        name: String,
        /// Vault symbol, at most 4 bytes
        #[arg(long)]
        symbol: String,
        #[arg(long, value_enum)]
        fee_type: FeeType,
        /// Performance fee in basis points
        #[arg(long)]
        performance_fee: u16,
        /// Management fee in basis points
        #[arg(long)]
        management_fee: u16,
        /// Deposit gatekeeper contract; omit for permissionless deposits
        #[arg(long)]
        deposit_access_control: Option<Address>,
    },
    /// Hand the strategist role to another address
    UpdateStrategist {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(long)]
        new_strategist: Address,
    },
    UpdateFeeModel {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(long, value_enum)]
        fee_type: FeeType,
        #[arg(long)]
        performance_fee: u16,
        #[arg(long)]
        management_fee: u16,
    },
    SetDepositAccessControl {
        #[arg(long)]
        vault: Option<Address>,
        /// Zero address removes the gatekeeper
        #[arg(long)]
        access_control: Address,
    },
    /// Claim accrued manager fees, in underlying asset units
    ClaimFees {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(short = 'a', long)]
        amount: Decimal,
    },
    /// Request a deposit of underlying assets
    RequestDeposit {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(short = 'a', long)]
        amount: Decimal,
    },
    CancelDeposit {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(short = 'a', long)]
        amount: Decimal,
    },
    /// Request redemption of vault shares
    RequestRedeem {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(short = 's', long)]
        shares: Decimal,
    },
    CancelRedeem {
        #[arg(long)]
        vault: Option<Address>,
        #[arg(short = 's', long)]
        shares: Decimal,
    },
    /// Submit a target allocation with the configured strategist key
    SubmitOrder {
        #[arg(long)]
        vault: Option<Address>,
        /// `<token>=<weight>`, repeatable
        #[arg(long = "allocation", value_parser = parse_allocation, required = true)]
        allocations: Vec<(Address, u32)>,
    },
    /// Poll again for a transaction that timed out
    Receipt {
        #[arg(long)]
        tx_hash: TxHash,
        /// Contract the transaction was sent to
        #[arg(long)]
        contract: Address,
    },
}

#[derive(Debug, Parser)]
#[command(name = "orion")]
#[command(about = "Query and operate Orion Finance vaults")]
#[command(version)]
pub struct CliEnv {
    #[clap(flatten)]
    env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

impl CliEnv {
    /// Parse CLI arguments and load the config and secrets files
    pub fn parse_and_convert() -> anyhow::Result<(Ctx, Commands)> {
        let cli_env = Self::parse();
        let ctx = Ctx::load_files(&cli_env.env.config, &cli_env.env.secrets)?;
        Ok((ctx, cli_env.command))
    }
}

fn parse_allocation(value: &str) -> Result<(Address, u32), CliError> {
    let invalid = || CliError::InvalidAllocation {
        value: value.to_owned(),
    };
    let (token, weight) = value.split_once('=').ok_or_else(invalid)?;

    let token = token.trim().parse::<Address>().map_err(|_| invalid())?;
    let weight = weight.trim().parse::<u32>().map_err(|_| invalid())?;

    Ok((token, weight))
}

pub async fn run_command(ctx: Ctx, command: Commands) -> anyhow::Result<()> {
    let registry = ctx.connect().await?;
    run_command_with_writers(&ctx, &registry, command, &mut std::io::stdout()).await
}

async fn run_command_with_writers<C: ChainClient, W: Write>(
    ctx: &Ctx,
    registry: &ContractRegistry<C>,
    command: Commands,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let result = execute_command(ctx, registry, command, stdout).await;

    if let Err(error) = &result
        && let Some(OrionError::ConfirmationTimeout {
            tx_hash, contract, ..
        }) = error.downcast_ref::<OrionError>()
    {
        writeln!(stdout, "Transaction {tx_hash} is still pending and may confirm later.")?;
        writeln!(
            stdout,
            "   Re-poll with: orion receipt --tx-hash {tx_hash} --contract {contract}"
        )?;
    }

    result
}

async fn execute_command<C: ChainClient, W: Write>(
    ctx: &Ctx,
    registry: &ContractRegistry<C>,
    command: Commands,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Config => show_config(registry, stdout).await,
        Commands::Vault { vault } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            show_vault(&vault, stdout).await
        }
        Commands::Portfolio { vault } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            show_portfolio(&vault, stdout).await
        }
        Commands::DeployVault {
            strategist,
            name,
            symbol,
            fee_type,
            performance_fee,
            management_fee,
            deposit_access_control,
        } => {
            let params = CreateVaultParams {
                strategist,
                name,
                symbol,
                fee_type,
                performance_fee,
                management_fee,
                deposit_access_control: deposit_access_control.unwrap_or(Address::ZERO),
            };
            deploy_vault(ctx, registry, &params, stdout).await
        }
        Commands::UpdateStrategist {
            vault,
            new_strategist,
        } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault.update_strategist(new_strategist, &signer).await?;
            report_transaction(registry, "Strategist updated", &result, stdout)
        }
        Commands::UpdateFeeModel {
            vault,
            fee_type,
            performance_fee,
            management_fee,
        } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .update_fee_model(fee_type, performance_fee, management_fee, &signer)
                .await?;
            report_transaction(registry, "Fee model updated", &result, stdout)
        }
        Commands::SetDepositAccessControl {
            vault,
            access_control,
        } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .set_deposit_access_control(access_control, &signer)
                .await?;
            report_transaction(registry, "Deposit access control set", &result, stdout)
        }
        Commands::ClaimFees { vault, amount } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let decimals = OrionConfig::new(registry).underlying_decimals().await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .transfer_manager_fees(from_decimal(amount, decimals)?, &signer)
                .await?;
            report_transaction(registry, "Vault fees claimed", &result, stdout)
        }
        Commands::RequestDeposit { vault, amount } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let decimals = OrionConfig::new(registry).underlying_decimals().await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .request_deposit(from_decimal(amount, decimals)?, &signer)
                .await?;
            report_transaction(registry, "Deposit requested", &result, stdout)
        }
        Commands::CancelDeposit { vault, amount } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let decimals = OrionConfig::new(registry).underlying_decimals().await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .cancel_deposit_request(from_decimal(amount, decimals)?, &signer)
                .await?;
            report_transaction(registry, "Deposit request cancelled", &result, stdout)
        }
        Commands::RequestRedeem { vault, shares } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let decimals = vault.share_decimals().await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .request_redeem(from_decimal(shares, decimals)?, &signer)
                .await?;
            report_transaction(registry, "Redeem requested", &result, stdout)
        }
        Commands::CancelRedeem { vault, shares } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let decimals = vault.share_decimals().await?;
            let signer = ctx.signer(Role::Manager)?;
            let result = vault
                .cancel_redeem_request(from_decimal(shares, decimals)?, &signer)
                .await?;
            report_transaction(registry, "Redeem request cancelled", &result, stdout)
        }
        Commands::SubmitOrder { vault, allocations } => {
            let vault = TransparentVault::connect(registry, ctx.vault_address(vault)?).await?;
            let order: OrderIntent = allocations.into_iter().collect();
            let signer = ctx.signer(Role::Strategist)?;
            let result = vault.submit_order_intent(&order, &signer).await?;
            report_transaction(registry, "Order intent submitted", &result, stdout)
        }
        Commands::Receipt { tx_hash, contract } => {
            info!(%tx_hash, %contract, "Re-polling receipt");
            let result = registry
                .orchestrator()
                .resume::<VaultEvent>(contract, tx_hash)
                .await?;
            report_transaction(registry, "Transaction confirmed", &result, stdout)?;

            let factory_events = decode_logs::<FactoryEvent>(contract, &result.receipt.logs);
            for log in &factory_events {
                writeln!(stdout, "   Event: {} {:?}", log.name, log.event)?;
            }
            Ok(())
        }
    }
}

async fn show_config<C: ChainClient, W: Write>(
    registry: &ContractRegistry<C>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let deployment = registry.deployment();
    let config = OrionConfig::new(registry);

    writeln!(stdout, "Network: {} ({})", deployment.name, deployment.chain_id)?;
    writeln!(stdout, "   OrionConfig: {}", config.address())?;
    writeln!(stdout, "   Underlying asset: {}", config.underlying_asset().await?)?;
    writeln!(stdout, "   Underlying decimals: {}", config.underlying_decimals().await?)?;
    writeln!(
        stdout,
        "   Strategist intent decimals: {}",
        config.strategist_intent_decimals().await?
    )?;
    writeln!(stdout, "   System idle: {}", config.is_system_idle().await?)?;
    writeln!(
        stdout,
        "   Vault factory: {}",
        config.transparent_vault_factory().await?
    )?;

    let orchestrator = LiquidityOrchestrator::resolve(registry).await?;
    writeln!(stdout, "   Liquidity orchestrator: {}", orchestrator.address())?;
    writeln!(
        stdout,
        "   Epoch duration: {}s",
        orchestrator.epoch_duration().await?.as_secs()
    )?;
    writeln!(
        stdout,
        "   Target buffer ratio: {}",
        orchestrator.target_buffer_ratio().await?
    )?;
    writeln!(
        stdout,
        "   Slippage tolerance: {}",
        orchestrator.slippage_tolerance().await?
    )?;

    writeln!(stdout, "   Risk-free rate: {}", config.risk_free_rate().await?)?;
    writeln!(stdout, "   Min deposit: {}", config.min_deposit_amount().await?)?;
    writeln!(stdout, "   Min redeem: {}", config.min_redeem_amount().await?)?;
    writeln!(
        stdout,
        "   Fee coefficients: volume {}, revenue share {}",
        config.v_fee_coefficient().await?,
        config.rs_fee_coefficient().await?
    )?;
    writeln!(
        stdout,
        "   Fee change cooldown: {}s",
        config.fee_change_cooldown_duration().await?
    )?;
    writeln!(
        stdout,
        "   Max fulfill batch size: {}",
        config.max_fulfill_batch_size().await?
    )?;

    let assets = config.whitelisted_assets().await?;
    let names = config.whitelisted_asset_names().await?;
    writeln!(stdout, "Whitelisted assets ({}):", assets.len())?;
    for (index, asset) in assets.iter().enumerate() {
        let name = names.get(index).map_or("?", String::as_str);
        writeln!(stdout, "   {asset} {name}")?;
    }

    let vaults = config.transparent_vaults().await?;
    writeln!(stdout, "Transparent vaults ({}):", vaults.len())?;
    for vault in vaults {
        writeln!(stdout, "   {vault}")?;
    }

    Ok(())
}

async fn show_vault<C: ChainClient, W: Write>(
    vault: &TransparentVault<C>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let fee_model = vault.active_fee_model().await?;

    writeln!(stdout, "Vault {}", vault.address())?;
    writeln!(stdout, "   Manager: {}", vault.manager().await?)?;
    writeln!(stdout, "   Strategist: {}", vault.strategist().await?)?;
    writeln!(stdout, "   Decommissioning: {}", vault.is_decommissioning().await?)?;
    writeln!(
        stdout,
        "   Fee model: {} (performance {} bps, management {} bps, high-water mark {})",
        fee_model.fee_type,
        fee_model.performance_fee,
        fee_model.management_fee,
        fee_model.high_water_mark
    )?;
    writeln!(
        stdout,
        "   Fee caps: performance {} bps, management {} bps",
        vault.max_performance_fee().await?,
        vault.max_management_fee().await?
    )?;
    writeln!(stdout, "   Total assets: {}", vault.total_assets().await?)?;
    writeln!(stdout, "   Share price: {}", vault.share_price().await?)?;
    writeln!(stdout, "   Pending deposits: {}", vault.pending_deposit(None).await?)?;
    writeln!(stdout, "   Pending redemptions: {}", vault.pending_redeem(None).await?)?;
    writeln!(stdout, "   Pending vault fees: {}", vault.pending_vault_fees().await?)?;

    let access_control = vault.deposit_access_control().await?;
    if access_control.is_zero() {
        writeln!(stdout, "   Deposit access control: none")?;
    } else {
        writeln!(stdout, "   Deposit access control: {access_control}")?;
    }

    Ok(())
}

async fn show_portfolio<C: ChainClient, W: Write>(
    vault: &TransparentVault<C>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let portfolio = vault.portfolio().await?;

    writeln!(stdout, "Portfolio of {} ({} positions)", vault.address(), portfolio.len())?;
    for (token, value) in portfolio {
        writeln!(stdout, "   {token}: {value}")?;
    }

    Ok(())
}

async fn deploy_vault<C: ChainClient, W: Write>(
    ctx: &Ctx,
    registry: &ContractRegistry<C>,
    params: &CreateVaultParams,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let signer = ctx.signer(Role::Manager)?;
    let factory = VaultFactory::resolve(registry, VaultType::Transparent).await?;

    writeln!(stdout, "Deploying vault {} ({})", params.name, params.symbol)?;
    let result = factory.create_orion_vault(params, &signer).await?;
    report_transaction(registry, "Vault deployed", &result, stdout)?;

    match get_vault_address_from_result(&result) {
        Some(vault) => {
            writeln!(stdout, "   Vault: {vault}")?;
            writeln!(
                stdout,
                "   {}",
                registry.deployment().explorer_address_url(vault)
            )?;
        }
        None => writeln!(stdout, "   Vault address not found in receipt logs")?,
    }

    Ok(())
}

fn report_transaction<C: ChainClient, E: EventSchema, W: Write>(
    registry: &ContractRegistry<C>,
    headline: &str,
    result: &TransactionResult<E>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    writeln!(stdout, "{headline}")?;
    writeln!(stdout, "   Transaction: {}", result.tx_hash)?;
    writeln!(
        stdout,
        "   {}",
        registry.deployment().explorer_tx_url(result.tx_hash)
    )?;
    if let Some(block_number) = result.receipt.block_number {
        writeln!(stdout, "   Block: {block_number}")?;
    }
    writeln!(stdout, "   Gas used: {}", result.receipt.gas_used)?;

    for log in result.decoded_logs.iter().flatten() {
        writeln!(stdout, "   Event: {} {:?}", log.name, log.event)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use alloy::primitives::{U256, address};
    use alloy::sol_types::{SolCall, SolEvent};
    use clap::CommandFactory;

    use super::*;
    use crate::bindings::{IOrionConfig, IOrionTransparentVault};
    use crate::registry::AbiStore;
    use crate::test_utils::{MockChain, ORION_CONFIG, VAULT, log_from, vault_created_log};

    /// Address of the manager key in `SECRETS`.
    const MANAGER_KEY_ADDRESS: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    /// Address of the strategist key in `SECRETS`.
    const STRATEGIST_KEY_ADDRESS: Address =
        address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const TOKEN_A: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

    const SECRETS: &str = r#"
        [evm]
        rpc_url = "http://localhost:8545"

        [keys]
        manager_private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        strategist_private_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
    "#;

    fn ctx() -> Ctx {
        Ctx::from_toml(
            "vault = \"0x3333333333333333333333333333333333333333\"",
            SECRETS,
        )
        .unwrap()
    }

    fn chain_with_key_holders() -> MockChain {
        let chain = MockChain::with_vault();
        chain.on::<IOrionTransparentVault::managerCall>(VAULT, &MANAGER_KEY_ADDRESS);
        chain.on::<IOrionTransparentVault::strategistCall>(VAULT, &STRATEGIST_KEY_ADDRESS);
        chain.on::<IOrionConfig::getTokenDecimalsCall>(ORION_CONFIG, &6);
        chain.on::<IOrionConfig::isWhitelistedManagerCall>(ORION_CONFIG, &true);
        chain
    }

    async fn run(
        chain: MockChain,
        command: Commands,
    ) -> (Arc<MockChain>, anyhow::Result<()>, String) {
        let chain = Arc::new(chain);
        let registry = ContractRegistry::new(
            Arc::clone(&chain),
            None,
            AbiStore::packaged().unwrap(),
            Duration::from_secs(120),
        )
        .await
        .unwrap();
        let mut stdout = Vec::new();

        let result = run_command_with_writers(&ctx(), &registry, command, &mut stdout).await;

        (chain, result, String::from_utf8(stdout).unwrap())
    }

    #[test]
    fn cli_definition_is_consistent() {
        CliEnv::command().debug_assert();
    }

    #[test]
    fn parses_allocation_pairs() {
        assert_eq!(
            parse_allocation("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa=600").unwrap(),
            (TOKEN_A, 600)
        );
    }

    #[test]
    fn rejects_malformed_allocations() {
        for value in [
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "nope=1",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa=-1",
        ] {
            assert!(
                matches!(parse_allocation(value), Err(CliError::InvalidAllocation { .. })),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn parses_deploy_vault_arguments() {
        let cli = CliEnv::try_parse_from([
            "orion",
            "--config",
            "config.toml",
            "--secrets",
            "secrets.toml",
            "deploy-vault",
            "--strategist",
            "0x2222222222222222222222222222222222222222",
            "--name",
            "Alpha",
            "--symbol",
            "ALP",
            "--fee-type",
            "hurdle_hwm",
            "--performance-fee",
            "2000",
            "--management-fee",
            "100",
        ])
        .unwrap();

        let Commands::DeployVault {
            fee_type,
            deposit_access_control,
            ..
        } = cli.command
        else {
            panic!("expected DeployVault, got {:?}", cli.command);
        };
        assert_eq!(fee_type, FeeType::HurdleHwm);
        assert_eq!(deposit_access_control, None);
    }

    #[tokio::test]
    async fn portfolio_lists_positions() {
        let chain = chain_with_key_holders();
        chain.on::<IOrionTransparentVault::getPortfolioCall>(
            VAULT,
            &IOrionTransparentVault::getPortfolioReturn {
                tokens: vec![TOKEN_A],
                sharesPerAsset: vec![U256::from(77u64)],
            },
        );

        let (_, result, output) = run(chain, Commands::Portfolio { vault: None }).await;

        result.unwrap();
        assert!(output.contains("1 positions"), "got {output}");
        assert!(output.contains(&format!("{TOKEN_A}: 77")), "got {output}");
    }

    #[tokio::test]
    async fn request_deposit_scales_amount_by_underlying_decimals() {
        let (chain, result, output) = run(
            chain_with_key_holders(),
            Commands::RequestDeposit {
                vault: None,
                amount: Decimal::new(15, 1),
            },
        )
        .await;

        result.unwrap();
        assert!(output.contains("Deposit requested"), "got {output}");
        assert!(output.contains("https://sepolia.etherscan.io/tx/"), "got {output}");
        let requests = chain.estimated_requests.lock().unwrap();
        let input = requests[0].input.input().unwrap();
        let call = IOrionTransparentVault::requestDepositCall::abi_decode(input).unwrap();
        assert_eq!(call.assets, U256::from(1_500_000u64));
        assert_eq!(chain.submitted(), 1);
    }

    #[tokio::test]
    async fn deploy_vault_prints_new_vault_address() {
        let new_vault = address!("0x9999999999999999999999999999999999999999");
        let chain = chain_with_key_holders();
        chain.set_receipt_logs(vec![vault_created_log(new_vault)]);

        let (_, result, output) = run(
            chain,
            Commands::DeployVault {
                strategist: STRATEGIST_KEY_ADDRESS,
                name: "Alpha".to_owned(),
                symbol: "ALP".to_owned(),
                fee_type: FeeType::Absolute,
                performance_fee: 1000,
                management_fee: 50,
                deposit_access_control: None,
            },
        )
        .await;

        result.unwrap();
        assert!(output.contains(&format!("Vault: {new_vault}")), "got {output}");
        assert!(output.contains("Event: OrionVaultCreated"), "got {output}");
    }

    #[tokio::test]
    async fn submit_order_uses_strategist_key() {
        let (chain, result, output) = run(
            chain_with_key_holders(),
            Commands::SubmitOrder {
                vault: None,
                allocations: vec![(TOKEN_A, 1_000_000_000)],
            },
        )
        .await;

        result.unwrap();
        assert!(output.contains("Order intent submitted"), "got {output}");
        let requests = chain.estimated_requests.lock().unwrap();
        assert_eq!(requests[0].from, Some(STRATEGIST_KEY_ADDRESS));
    }

    #[tokio::test]
    async fn manager_command_with_wrong_key_is_refused() {
        let chain = MockChain::with_vault();

        let (chain, result, _) = run(
            chain,
            Commands::UpdateStrategist {
                vault: None,
                new_strategist: TOKEN_A,
            },
        )
        .await;

        let error = result.unwrap_err();
        assert!(error.to_string().contains("is not the vault manager"), "got {error}");
        assert_eq!(chain.submitted(), 0);
    }

    #[tokio::test]
    async fn timeout_prints_receipt_hint() {
        let chain = chain_with_key_holders();
        chain.set_receipt_available(false);

        let (_, result, output) = run(
            chain,
            Commands::ClaimFees {
                vault: None,
                amount: Decimal::ONE,
            },
        )
        .await;

        let error = result.unwrap_err();
        assert!(
            matches!(
                error.downcast_ref::<OrionError>(),
                Some(OrionError::ConfirmationTimeout { .. })
            ),
            "got {error:?}"
        );
        assert!(
            output.contains(&format!(
                "orion receipt --tx-hash {} --contract {VAULT}",
                crate::test_utils::TX_HASH
            )),
            "got {output}"
        );
    }

    #[tokio::test]
    async fn receipt_command_decodes_vault_events() {
        let event = IOrionTransparentVault::StrategistUpdated {
            newStrategist: TOKEN_A,
        };
        let chain = MockChain::with_vault();
        chain.set_receipt_logs(vec![log_from(VAULT, event.encode_log_data(), 0)]);

        let (chain, result, output) = run(
            chain,
            Commands::Receipt {
                tx_hash: TxHash::repeat_byte(0x42),
                contract: VAULT,
            },
        )
        .await;

        result.unwrap();
        assert!(output.contains("Event: StrategistUpdated"), "got {output}");
        assert_eq!(chain.submitted(), 0);
    }

    #[tokio::test]
    async fn unregistered_vault_is_reported() {
        let (_, result, _) = run(
            MockChain::with_vault(),
            Commands::Vault {
                vault: Some(TOKEN_A),
            },
        )
        .await;

        let error = result.unwrap_err();
        assert!(
            error.to_string().contains("not a transparent vault registered"),
            "got {error}"
        );
    }
}
