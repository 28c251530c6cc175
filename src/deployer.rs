use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::eth::{Log, TransactionRequest},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{bail, Context, ContextCompat};
use owo_colors::OwoColorize;
use reqwest::Url;

use crate::{
    artifact::Artifact,
    create3,
    formatting::{format_balance, format_file_size, format_gas, format_spent},
    network::NetworkConfig,
    record::{DeploymentRecord, DeploymentStore},
    verify::{ContractVerifier, Verification, VerificationTarget},
};

/// A mined transaction, after one confirmation.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
}

/// Everything deployment tasks need from a node.
#[async_trait]
pub trait DeployClient: Send + Sync {
    /// Account transactions are sent from.
    fn sender(&self) -> Address;

    async fn chain_id(&self) -> eyre::Result<u64>;

    async fn block_number(&self) -> eyre::Result<u64>;

    async fn balance(&self, account: Address) -> eyre::Result<U256>;

    /// Broadcasts `tx` from [`DeployClient::sender`] and waits for one
    /// confirmation. Reverted transactions are errors.
    async fn send(&self, tx: TransactionRequest) -> eyre::Result<TxOutcome>;
}

/// [`DeployClient`] talking JSON-RPC over HTTP.
pub struct RpcClient {
    provider: DynProvider,
    sender: Address,
}

impl RpcClient {
    /// Signs transactions locally with `signer`.
    pub fn with_signer(rpc_url: Url, signer: PrivateKeySigner) -> Self {
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();
        Self { provider, sender }
    }

    /// Asks a local development node to unlock `account`, then sends
    /// unsigned transactions from it.
    pub async fn impersonating(rpc_url: Url, account: Address) -> eyre::Result<Self> {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        provider
            .raw_request::<_, serde_json::Value>("hardhat_impersonateAccount".into(), (account,))
            .await
            .wrap_err_with(|| format!("node refused to impersonate {account}"))?;
        Ok(Self {
            provider,
            sender: account,
        })
    }
}

#[async_trait]
impl DeployClient for RpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn block_number(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn balance(&self, account: Address) -> eyre::Result<U256> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn send(&self, tx: TransactionRequest) -> eyre::Result<TxOutcome> {
        let tx = tx.with_from(self.sender);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await?
            .get_receipt()
            .await?;

        if !receipt.status() {
            bail!("transaction {} reverted", receipt.transaction_hash);
        }

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash,
            block_number: receipt
                .block_number
                .wrap_err("receipt is missing its block number")?,
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            logs: receipt.inner.logs().to_vec(),
        })
    }
}

/// Per-transaction gas settings that bypass estimation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOverrides {
    pub gas_limit: Option<u64>,
    /// Legacy gas price in wei.
    pub gas_price: Option<u128>,
}

impl TxOverrides {
    fn apply(&self, mut tx: TransactionRequest) -> TransactionRequest {
        if let Some(gas_limit) = self.gas_limit {
            tx.set_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            tx.set_gas_price(gas_price);
        }
        tx
    }
}

/// How the contract gets created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Plain contract-creation transaction.
    Create,
    /// Through the CreateX factory, address fixed by the salt.
    Create3 { salt: B256 },
}

/// One contract to deploy.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Key of the deployment record and part of its file name.
    pub contract_id: String,
    pub artifact: Artifact,
    pub args: Vec<String>,
    pub strategy: Strategy,
    pub overrides: TxOverrides,
}

/// Node state read before sending.
struct Start {
    chain_id: u64,
    balance: U256,
}

/// A connected task run: node, target network, record store and
/// verification settings.
pub struct Session<C, V> {
    pub client: C,
    pub network: NetworkConfig,
    pub store: DeploymentStore,
    pub verification: Verification<V>,
}

impl<C: DeployClient, V: ContractVerifier> Session<C, V> {
    /// Deploys, records and verifies one contract.
    pub async fn deploy(
        &self,
        deployment: &Deployment,
        today: NaiveDate,
    ) -> eyre::Result<DeploymentRecord> {
        let start = self.begin().await?;

        let artifact = &deployment.artifact;
        let values = artifact.constructor_args(&deployment.args)?;
        let encoded_args = artifact.encode_args(&values)?;
        let init_code = artifact.init_code(&encoded_args);
        println!("init code size: {}", format_file_size(init_code.len(), 24, 48));

        let (address, outcome) = match deployment.strategy {
            Strategy::Create => self.create(init_code, deployment.overrides).await?,
            Strategy::Create3 { salt } => {
                self.create3(salt, init_code, deployment.overrides).await?
            }
        };
        println!(
            "deployed {}: {}",
            deployment.contract_id,
            address.bright_purple()
        );
        println!("deployment tx hash: {}", outcome.tx_hash.bright_magenta());

        let record = DeploymentRecord::new(address, outcome.tx_hash, outcome.block_number);
        let path = self
            .store
            .save(&deployment.contract_id, &record, today)?;
        println!("\nDeployment data saved: {}", path.display());

        let target = VerificationTarget {
            address,
            artifact,
            constructor_args: &deployment.args,
            encoded_args,
            chain_id: start.chain_id,
        };
        self.verification.verify(&target).await;

        self.finish(start.balance, outcome.gas_used).await?;
        Ok(record)
    }

    /// Sends a plain call and prints the cost accounting.
    pub async fn call(&self, tx: TransactionRequest) -> eyre::Result<TxOutcome> {
        let start = self.begin().await?;
        let outcome = self.client.send(tx).await?;
        println!("tx hash: {}", outcome.tx_hash.bright_magenta());
        self.finish(start.balance, outcome.gas_used).await?;
        Ok(outcome)
    }

    async fn create(
        &self,
        init_code: Bytes,
        overrides: TxOverrides,
    ) -> eyre::Result<(Address, TxOutcome)> {
        let tx = TransactionRequest::default()
            .into_create()
            .with_input(init_code);
        let outcome = self.client.send(overrides.apply(tx)).await?;
        let address = outcome
            .contract_address
            .wrap_err("failed to read contract address from tx receipt")?;
        Ok((address, outcome))
    }

    async fn create3(
        &self,
        salt: B256,
        init_code: Bytes,
        overrides: TxOverrides,
    ) -> eyre::Result<(Address, TxOutcome)> {
        let tx = create3::deploy_tx(salt, init_code);
        let outcome = self.client.send(overrides.apply(tx)).await?;
        let address = create3::created_address(&outcome.logs)?;
        Ok((address, outcome))
    }

    /// Prints where we are. Everything read from the node here is read
    /// before the first transaction goes out.
    async fn begin(&self) -> eyre::Result<Start> {
        let block_number = self.client.block_number().await?;
        println!("Deploy on network \"{}\"", self.network.name.bright_cyan());
        println!("Current block number is {block_number}\n\n");

        let chain_id = self.client.chain_id().await?;
        if let Some(expected) = self.network.chain_id {
            if chain_id != expected && !self.network.is_fork() {
                tracing::warn!(
                    expected,
                    actual = chain_id,
                    "node reports a different chain id than network \"{}\"",
                    self.network.name
                );
            }
        }

        let balance = self.client.balance(self.client.sender()).await?;
        println!("Balance before: {}", format_balance(balance));
        Ok(Start { chain_id, balance })
    }

    async fn finish(&self, balance_before: U256, gas_used: u64) -> eyre::Result<()> {
        let balance_after = self.client.balance(self.client.sender()).await?;
        println!("Balance after: {}", format_balance(balance_after));
        println!("Gas used: {}", format_gas(gas_used));
        println!("Spent: {}", format_spent(balance_before, balance_after));
        println!("{}", "Done!".bright_green());
        Ok(())
    }
}
