use alloy::primitives::Address;
use clap::Parser;

use super::today;
use crate::{
    config::{DeployArgs, GlobalArgs, LegacySignerArgs, SignerArgs},
    constants::{
        LEVVA_OWNER, LEVVA_TOKEN, ONE_YEAR, OPEN_STAKING_GAS_LIMIT, OPEN_STAKING_GAS_PRICE,
        OPEN_STAKING_VAULT, OPEN_TOKEN,
    },
    deployer::{Deployment, Strategy, TxOverrides},
};

pub const STAKING_CONTRACT: &str = "Staking";

/// Constructor of the `Staking` contract:
/// `(token, owner, vault, apy, lockPeriod)`.
fn staking_args(
    token: Address,
    owner: Address,
    vault: Address,
    apy: u64,
    lock: u64,
) -> Vec<String> {
    vec![
        token.to_checksum(None),
        owner.to_checksum(None),
        vault.to_checksum(None),
        apy.to_string(),
        lock.to_string(),
    ]
}

/// Deploy Levva Staking smart contract.
#[derive(Parser, Debug)]
pub struct DeployLevvaStaking {
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// Staked token.
    #[arg(long, default_value = LEVVA_TOKEN)]
    pub token: Address,
    /// Owner of the staking contract.
    #[arg(long, default_value = LEVVA_OWNER)]
    pub owner: Address,
    /// Vault rewards are paid from.
    #[arg(long, default_value = LEVVA_OWNER)]
    pub vault: Address,
    /// Annual yield, in percent.
    #[arg(long, default_value_t = 50)]
    pub apy: u64,
    /// Lock period, in seconds.
    #[arg(long, default_value_t = ONE_YEAR)]
    pub lock: u64,
}

impl DeployLevvaStaking {
    pub fn contract_id(&self) -> String {
        format!("LevvaStaking-{}-{}", self.apy, self.lock)
    }

    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let deployment = Deployment {
            contract_id: self.contract_id(),
            artifact: global.artifact(STAKING_CONTRACT)?,
            args: staking_args(self.token, self.owner, self.vault, self.apy, self.lock),
            strategy: Strategy::Create,
            overrides: TxOverrides::default(),
        };
        let session = global
            .session(&self.deploy.signer, self.deploy.impersonate_signer)
            .await?;
        session.deploy(&deployment, today()).await?;
        Ok(())
    }
}

/// Deploy open staking contract.
#[derive(Parser, Debug)]
pub struct DeployOpenStaking {
    #[command(flatten)]
    pub signer: LegacySignerArgs,
    /// Key the deployment is recorded under.
    #[arg(long, default_value = "OpenStaking")]
    pub contract_id: String,
    /// Staked token.
    #[arg(long, default_value = OPEN_TOKEN)]
    pub token: Address,
    /// Owner of the staking contract.
    #[arg(long, default_value = LEVVA_OWNER)]
    pub owner: Address,
    /// Vault rewards are paid from.
    #[arg(long, default_value = OPEN_STAKING_VAULT)]
    pub vault: Address,
    /// Annual yield, in percent.
    #[arg(long, default_value_t = 0)]
    pub apy: u64,
    /// Lock period, in seconds.
    #[arg(long, default_value_t = ONE_YEAR)]
    pub lock: u64,
    /// Gas limit of the deployment transaction.
    #[arg(long, default_value_t = OPEN_STAKING_GAS_LIMIT)]
    pub gas_limit: u64,
    /// Legacy gas price, in wei.
    #[arg(long, default_value_t = OPEN_STAKING_GAS_PRICE)]
    pub gas_price: u128,
}

impl DeployOpenStaking {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let deployment = Deployment {
            contract_id: self.contract_id.clone(),
            artifact: global.artifact(STAKING_CONTRACT)?,
            args: staking_args(self.token, self.owner, self.vault, self.apy, self.lock),
            strategy: Strategy::Create,
            overrides: TxOverrides {
                gas_limit: Some(self.gas_limit),
                gas_price: Some(self.gas_price),
            },
        };
        let session = global.session(&SignerArgs::from(&self.signer), None).await?;
        session.deploy(&deployment, today()).await?;
        Ok(())
    }
}
