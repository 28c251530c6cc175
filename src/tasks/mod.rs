//! One module per deployment task. Each task builds its constructor
//! arguments, connects a [`Session`] and runs it.

use std::{path::Path, time::Duration};

use alloy::primitives::Address;
use chrono::{Local, NaiveDate};
use eyre::bail;

use crate::{
    artifact::Artifact,
    config::{GlobalArgs, SignerArgs},
    deployer::{RpcClient, Session},
    etherscan::EtherscanVerifier,
    network::{NetworkConfig, FORKING_URL_VAR, LOCAL_NETWORK},
    record::DeploymentStore,
    verify::Verification,
    wallet::TerminalPrompt,
};

pub mod create3;
pub mod minter;
pub mod staking;
pub mod token;
pub mod vesting;

impl GlobalArgs {
    /// Resolves the network and signer and connects to the node.
    pub(crate) async fn session(
        &self,
        signer: &SignerArgs,
        impersonate: Option<Address>,
    ) -> eyre::Result<Session<RpcClient, EtherscanVerifier>> {
        let network = NetworkConfig::resolve(&self.network)?;

        check_impersonation(&network, impersonate)?;

        let client = match impersonate {
            Some(account) => {
                tracing::warn!(%account, "impersonating signer, transactions are not signed");
                RpcClient::impersonating(network.rpc_url.clone(), account).await?
            }
            None => {
                let signer = signer.wallet(&TerminalPrompt)?;
                tracing::info!(signer = %signer.address(), "signer ready");
                RpcClient::with_signer(network.rpc_url.clone(), signer)
            }
        };

        let store = DeploymentStore::new(&self.deployments_dir, &network.name);
        let verification = self.verification(&network)?;

        Ok(Session {
            client,
            network,
            store,
            verification,
        })
    }

    fn verification(
        &self,
        network: &NetworkConfig,
    ) -> eyre::Result<Verification<EtherscanVerifier>> {
        if self.no_verify {
            return Ok(Verification::disabled());
        }
        if network.name == LOCAL_NETWORK && !network.is_fork() {
            tracing::debug!("local network, nothing to verify against");
            return Ok(Verification::disabled());
        }
        let Some(api_key) = &self.api_key else {
            if !network.is_fork() {
                tracing::warn!(
                    "no block explorer API key (API_KEY), contracts will not be verified"
                );
            }
            return Ok(Verification::disabled());
        };

        let verifier = EtherscanVerifier::new(api_key.as_str())?;
        Ok(Verification::new(verifier, network.is_fork())
            .with_delay(Duration::from_secs(self.verify_delay)))
    }

    /// Artifact for `contract`, given either by name or as a path to the
    /// artifact file.
    pub(crate) fn artifact(&self, contract: &str) -> eyre::Result<Artifact> {
        let path = Path::new(contract);
        if path.extension().is_some_and(|ext| ext == "json") {
            return Artifact::load(path);
        }
        Artifact::find(&self.artifacts, contract)
    }
}

/// Impersonation sends unsigned transactions, which only a local fork accepts.
fn check_impersonation(network: &NetworkConfig, account: Option<Address>) -> eyre::Result<()> {
    if account.is_some() && !network.is_fork() {
        bail!(
            "--impersonate-signer only works on a fork simulation, \
             set {FORKING_URL_VAR} and use --network {LOCAL_NETWORK}"
        );
    }
    Ok(())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
