use alloy::primitives::Address;
use clap::{Args, Parser};

use super::today;
use crate::{
    config::{DeployArgs, GlobalArgs, LegacySignerArgs, SignerArgs},
    constants::LEVVA_OWNER,
    deployer::{Deployment, Strategy, TxOverrides},
};

pub const TOKEN_CONTRACT: &str = "LevvaToken";

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Owner of the token.
    #[arg(long, default_value = LEVVA_OWNER)]
    pub owner: Address,
}

impl TokenArgs {
    fn deployment(&self, global: &GlobalArgs) -> eyre::Result<Deployment> {
        Ok(Deployment {
            contract_id: TOKEN_CONTRACT.to_string(),
            artifact: global.artifact(TOKEN_CONTRACT)?,
            args: vec![self.owner.to_checksum(None)],
            strategy: Strategy::Create,
            overrides: TxOverrides::default(),
        })
    }
}

/// Deploy the Levva token.
#[derive(Parser, Debug)]
pub struct DeployToken {
    #[command(flatten)]
    pub deploy: DeployArgs,
    #[command(flatten)]
    pub token: TokenArgs,
}

impl DeployToken {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let deployment = self.token.deployment(global)?;
        let session = global
            .session(&self.deploy.signer, self.deploy.impersonate_signer)
            .await?;
        session.deploy(&deployment, today()).await?;
        Ok(())
    }
}

/// Deploy the Levva token, signing with `--signer`.
#[derive(Parser, Debug)]
pub struct LegacyDeployToken {
    #[command(flatten)]
    pub signer: LegacySignerArgs,
    #[command(flatten)]
    pub token: TokenArgs,
}

impl LegacyDeployToken {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let deployment = self.token.deployment(global)?;
        let session = global.session(&SignerArgs::from(&self.signer), None).await?;
        session.deploy(&deployment, today()).await?;
        Ok(())
    }
}
