use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    network::TransactionBuilder,
    primitives::{utils::parse_ether, Address, U256},
    rpc::types::eth::TransactionRequest,
    sol,
    sol_types::SolCall,
};
use clap::Parser;
use eyre::{bail, eyre, Context, ContextCompat};
use serde::Deserialize;

use super::today;
use crate::{
    config::{DeployArgs, GlobalArgs, LegacySignerArgs, SignerArgs},
    constants::VESTING_WALLET_FACTORY,
    deployer::{Deployment, Strategy, TxOverrides},
};

sol! {
    #[derive(Debug)]
    interface IVestingWalletFactory {
        function createVestingWallets(
            address[] beneficiaries,
            uint256[] vestingAmounts,
            uint256[] amounts,
            address token,
            address tokenHolder,
            uint64 startTimestamp,
            uint64 durationSeconds
        ) external;
    }
}

/// Deploy the vesting wallet factory.
#[derive(Parser, Debug)]
pub struct DeployVestingFactory {
    #[command(flatten)]
    pub deploy: DeployArgs,
    /// Contract name or artifact path of the factory.
    #[arg(long, default_value = "VestingWalletFactory")]
    pub contract: String,
    /// Constructor arguments.
    #[arg(long, num_args(0..), value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl DeployVestingFactory {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let artifact = global.artifact(&self.contract)?;
        let deployment = Deployment {
            contract_id: artifact.contract_name.clone(),
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

/// One beneficiary of a vesting schedule. Amounts are in whole tokens with
/// 18 decimals, e.g. `"1000"` or `"0.5"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingEntry {
    pub beneficiary: Address,
    /// Amount released linearly over the vesting period.
    pub vesting_amount: String,
    /// Amount transferred to the beneficiary right away.
    pub amount: String,
}

/// Input of `create-vesting-wallets`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingSchedule {
    pub token: Address,
    /// Account the vested tokens are pulled from.
    pub token_holder: Address,
    /// Unix timestamp vesting starts at.
    pub start_timestamp: u64,
    pub duration_seconds: u64,
    pub wallets: Vec<VestingEntry>,
}

impl VestingSchedule {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .wrap_err_with(|| eyre!("failed to read vesting schedule {}", path.display()))?;
        serde_json::from_str(&json)
            .wrap_err_with(|| eyre!("malformed vesting schedule {}", path.display()))
    }

    pub fn call(&self) -> eyre::Result<IVestingWalletFactory::createVestingWalletsCall> {
        if self.wallets.is_empty() {
            bail!("vesting schedule has no wallets");
        }
        if self.duration_seconds == 0 {
            bail!("vesting duration must be positive");
        }
        self.total()?;

        let mut beneficiaries = Vec::with_capacity(self.wallets.len());
        let mut vesting_amounts = Vec::with_capacity(self.wallets.len());
        let mut amounts = Vec::with_capacity(self.wallets.len());
        for entry in &self.wallets {
            beneficiaries.push(entry.beneficiary);
            vesting_amounts.push(token_amount(&entry.vesting_amount, entry.beneficiary)?);
            amounts.push(token_amount(&entry.amount, entry.beneficiary)?);
        }

        Ok(IVestingWalletFactory::createVestingWalletsCall {
            beneficiaries,
            vestingAmounts: vesting_amounts,
            amounts,
            token: self.token,
            tokenHolder: self.token_holder,
            startTimestamp: self.start_timestamp,
            durationSeconds: self.duration_seconds,
        })
    }

    pub fn total(&self) -> eyre::Result<U256> {
        self.wallets.iter().try_fold(U256::ZERO, |total, entry| {
            let vesting = token_amount(&entry.vesting_amount, entry.beneficiary)?;
            let amount = token_amount(&entry.amount, entry.beneficiary)?;
            total
                .checked_add(vesting)
                .and_then(|total| total.checked_add(amount))
                .wrap_err("vesting total overflows uint256")
        })
    }
}

fn token_amount(amount: &str, beneficiary: Address) -> eyre::Result<U256> {
    parse_ether(amount).wrap_err_with(|| format!("invalid amount {amount:?} for {beneficiary}"))
}

/// Create vesting wallets through the vesting wallet factory.
#[derive(Parser, Debug)]
pub struct CreateVestingWallets {
    #[command(flatten)]
    pub signer: LegacySignerArgs,
    /// Address of the vesting wallet factory.
    #[arg(long, default_value = VESTING_WALLET_FACTORY)]
    pub factory: Address,
    /// JSON file listing token, holder, schedule and beneficiaries.
    #[arg(long)]
    pub schedule: PathBuf,
}

impl CreateVestingWallets {
    pub async fn run(&self, global: &GlobalArgs) -> eyre::Result<()> {
        let schedule = VestingSchedule::load(&self.schedule)?;
        let call = schedule.call()?;
        tracing::info!(
            wallets = schedule.wallets.len(),
            total = %alloy::primitives::utils::format_ether(schedule.total()?),
            factory = %self.factory,
            "creating vesting wallets"
        );

        let tx = TransactionRequest::default()
            .with_to(self.factory)
            .with_input(call.abi_encode());
        let session = global.session(&SignerArgs::from(&self.signer), None).await?;
        session.call(tx).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const SCHEDULE: &str = r#"{
  "token": "0x6243558a24CC6116aBE751f27E6d7Ede50ABFC76",
  "tokenHolder": "0xea42f017a9D962019E36ce4D7d376D0421855b66",
  "startTimestamp": 1732104000,
  "durationSeconds": 15552000,
  "wallets": [
    {
      "beneficiary": "0x0521eF51E5Bb9930Bf0a8d9C0cFed3899A6deC93",
      "vestingAmount": "1000",
      "amount": "10"
    },
    {
      "beneficiary": "0x3896DE8d1a498881aC34F316E662D6e20236e577",
      "vestingAmount": "900",
      "amount": "0"
    }
  ]
}"#;

    #[test]
    fn builds_factory_call() {
        let schedule: VestingSchedule = serde_json::from_str(SCHEDULE).unwrap();
        let call = schedule.call().unwrap();

        assert_eq!(
            call.beneficiaries,
            vec![
                address!("0521eF51E5Bb9930Bf0a8d9C0cFed3899A6deC93"),
                address!("3896DE8d1a498881aC34F316E662D6e20236e577"),
            ]
        );
        assert_eq!(call.vestingAmounts[0], parse_ether("1000").unwrap());
        assert_eq!(call.amounts, vec![parse_ether("10").unwrap(), U256::ZERO]);
        assert_eq!(call.startTimestamp, 1732104000);
        assert_eq!(call.durationSeconds, 15552000);
        assert_eq!(schedule.total().unwrap(), parse_ether("1910").unwrap());
    }

    #[test]
    fn rejects_empty_schedule() {
        let mut schedule: VestingSchedule = serde_json::from_str(SCHEDULE).unwrap();
        schedule.wallets.clear();
        assert!(schedule.call().is_err());
    }

    #[test]
    fn rejects_bad_amount() {
        let mut schedule: VestingSchedule = serde_json::from_str(SCHEDULE).unwrap();
        schedule.wallets[1].amount = "ten".into();
        let err = schedule.call().unwrap_err();
        assert!(err.to_string().starts_with("invalid amount \"ten\""));
    }

    #[test]
    fn rejects_total_past_uint256() {
        let mut schedule: VestingSchedule = serde_json::from_str(SCHEDULE).unwrap();
        // 10^59 tokens is 10^77 wei, and two of those exceed 2^256.
        let huge = format!("1{}", "0".repeat(59));
        schedule.wallets.truncate(1);
        schedule.wallets[0].vesting_amount = huge.clone();
        schedule.wallets[0].amount = huge;

        let Err(err) = schedule.total() else {
            panic!("total should overflow");
        };
        assert_eq!(err.to_string(), "vesting total overflows uint256");
        assert!(schedule.call().is_err());
    }

    #[test]
    fn loads_schedule_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(&path, SCHEDULE).unwrap();
        let schedule = VestingSchedule::load(&path).unwrap();
        assert_eq!(schedule.wallets.len(), 2);
    }
}
