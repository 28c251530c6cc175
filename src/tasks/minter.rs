use clap::Parser;

use super::today;
use crate::{
    config::{DeployArgs, GlobalArgs},
    deployer::{Deployment, Strategy, TxOverrides},
};

/// Deploy the token minter.
#[derive(Parser, Debug)]
pub struct DeployTokenMinter {
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// Contract name or artifact path of the minter.
    #[arg(long, default_value = "LevvaTokenMinter")]
    pub contract: String,
    /// Key the deployment is recorded under. Defaults to the contract name.
    #[arg(long)]
    pub contract_id: Option<String>,
    /// Constructor arguments.
    #[arg(long, num_args(0..), value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl DeployTokenMinter {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let artifact = global.artifact(&self.contract)?;
        let deployment = Deployment {
            contract_id: self
                .contract_id
                .clone()
                .unwrap_or_else(|| artifact.contract_name.clone()),
            artifact,
            args: self.args.clone(),
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
