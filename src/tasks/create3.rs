use alloy::primitives::B256;
use clap::Parser;

use super::today;
use crate::{
    config::{DeployArgs, GlobalArgs},
    create3::permissioned_salt,
    deployer::{DeployClient, Deployment, Strategy, TxOverrides},
};

/// Deploy a contract through CreateX with CREATE3, so its address depends
/// only on the deployer and the salt.
#[derive(Parser, Debug)]
pub struct DeployCreate3 {
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// Contract name or artifact path.
    #[arg(long)]
    pub contract: String,
    /// Key the deployment is recorded under. Defaults to the contract name.
    #[arg(long)]
    pub contract_id: Option<String>,
    /// CreateX salt. Defaults to a salt guarded by the deployer address and
    /// derived from the contract id.
    #[arg(long)]
    pub salt: Option<B256>,
    /// Constructor arguments.
    #[arg(long, num_args(0..), value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl DeployCreate3 {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let artifact = global.artifact(&self.contract)?;
        let contract_id = self
            .contract_id
            .clone()
            .unwrap_or_else(|| artifact.contract_name.clone());

        let session = global
            .session(&self.deploy.signer, self.deploy.impersonate_signer)
            .await?;
        let salt = self
            .salt
            .unwrap_or_else(|| permissioned_salt(session.client.sender(), &contract_id));
        tracing::info!(%salt, "deploying through CreateX");

        let deployment = Deployment {
            contract_id,
            artifact,
            args: self.args.clone(),
            strategy: Strategy::Create3 { salt },
            overrides: TxOverrides::default(),
        };
        session.deploy(&deployment, today()).await?;
        Ok(())
    }
}
