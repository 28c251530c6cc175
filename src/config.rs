use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

use crate::{
    network::LOCAL_NETWORK,
    tasks::{
        create3::DeployCreate3,
        minter::DeployTokenMinter,
        staking::{DeployLevvaStaking, DeployOpenStaking},
        token::{DeployToken, LegacyDeployToken},
        vesting::{CreateVestingWallets, DeployVestingFactory},
    },
    verify::DEFAULT_VERIFY_DELAY,
};

/// Main entrypoint to `levva-deploy`.
pub fn run() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    config.command.run(&config.global)
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every task.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Network to deploy to.
    #[arg(long, global = true, env = "NETWORK", default_value = LOCAL_NETWORK)]
    pub network: String,
    /// Directory holding the compiled contract artifacts.
    #[arg(long, global = true, default_value = "artifacts")]
    pub artifacts: PathBuf,
    /// Deployment records are written to `<DIR>/<network>/`.
    #[arg(long, global = true, default_value = "deploy")]
    pub deployments_dir: PathBuf,
    /// Block explorer API key used for source verification.
    #[arg(long, global = true, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Seconds to wait before verifying a fresh deployment.
    #[arg(long, global = true, default_value_t = DEFAULT_VERIFY_DELAY.as_secs())]
    pub verify_delay: u64,
    /// Skip block explorer verification.
    #[arg(long, global = true)]
    pub no_verify: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy the Levva token.
    #[command(name = "deploy")]
    Deploy(LegacyDeployToken),
    /// Deploy the Levva token.
    #[command(name = "deploy-token")]
    DeployToken(DeployToken),
    /// Deploy Levva Staking smart contract.
    #[command(name = "deploy-levva-staking")]
    DeployLevvaStaking(DeployLevvaStaking),
    /// Deploy open staking contract.
    #[command(name = "deploy-open-staking")]
    DeployOpenStaking(DeployOpenStaking),
    /// Deploy the token minter.
    #[command(name = "deploy-token-minter")]
    DeployTokenMinter(DeployTokenMinter),
    /// Deploy the vesting wallet factory.
    #[command(name = "deploy-vesting-factory")]
    DeployVestingFactory(DeployVestingFactory),
    /// Deploy any contract through CreateX with CREATE3.
    #[command(name = "deploy-create3")]
    DeployCreate3(DeployCreate3),
    /// Create vesting wallets through the vesting wallet factory.
    #[command(name = "create-vesting-wallets")]
    CreateVestingWallets(CreateVestingWallets),
}

impl Commands {
    pub fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let runtime = Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(async {
            match self {
                Commands::Deploy(command) => command.run(global).await,
                Commands::DeployToken(command) => command.run(global).await,
                Commands::DeployLevvaStaking(command) => command.run(global).await,
                Commands::DeployOpenStaking(command) => command.run(global).await,
                Commands::DeployTokenMinter(command) => command.run(global).await,
                Commands::DeployVestingFactory(command) => command.run(global).await,
                Commands::DeployCreate3(command) => command.run(global).await,
                Commands::CreateVestingWallets(command) => command.run(global).await,
            }
        })
    }
}

/// Where the deployer's key comes from. The first one given wins; with none
/// the key is prompted for.
#[derive(Args, Debug, Clone, Default)]
pub struct SignerArgs {
    /// Private key of contracts creator.
    #[arg(long)]
    pub private_key: Option<String>,
    /// Keystore file path.
    #[arg(long)]
    pub keystore: Option<PathBuf>,
    /// Keystore file password.
    #[arg(long)]
    pub keystore_password: Option<String>,
}

/// `--signer <private-key>`, as taken by the older tasks.
#[derive(Args, Debug, Clone)]
pub struct LegacySignerArgs {
    /// Private key of contracts creator.
    #[arg(long)]
    pub signer: String,
}

impl From<&LegacySignerArgs> for SignerArgs {
    fn from(args: &LegacySignerArgs) -> Self {
        Self {
            private_key: Some(args.signer.clone()),
            ..Default::default()
        }
    }
}

/// Signer options plus dry-run impersonation.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub signer: SignerArgs,
    /// Impersonate address for dry-run on a forked network.
    #[arg(long)]
    pub impersonate_signer: Option<Address>,
}
