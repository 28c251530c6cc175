use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use eyre::{bail, eyre, Context, ContextCompat};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::verify::{ContractVerifier, VerificationTarget};

/// Etherscan's multichain endpoint; the chain is picked with `chainid`.
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
const STATUS_POLLS: usize = 12;

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: String,
}

/// What came back from a `verifysourcecode` submission.
#[derive(Debug, PartialEq, Eq)]
enum Submission {
    Guid(String),
    AlreadyVerified,
}

/// Verification state reported by `checkverifystatus`.
#[derive(Debug, PartialEq, Eq)]
enum VerifyStatus {
    Pending,
    Verified,
}

fn submission(response: EtherscanResponse) -> eyre::Result<Submission> {
    if response.status == "1" {
        return Ok(Submission::Guid(response.result));
    }
    if response.result.to_lowercase().contains("already verified") {
        return Ok(Submission::AlreadyVerified);
    }
    bail!("{}: {}", response.message, response.result)
}

fn verify_status(response: EtherscanResponse) -> eyre::Result<VerifyStatus> {
    let result = response.result.to_lowercase();
    if result.contains("pending") {
        return Ok(VerifyStatus::Pending);
    }
    if response.status == "1" || result.contains("already verified") {
        return Ok(VerifyStatus::Verified);
    }
    bail!("{}", response.result)
}

/// Compiler input recorded by Hardhat next to its artifacts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfo {
    solc_long_version: String,
    input: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: PathBuf,
}

impl BuildInfo {
    /// Follows `<Name>.dbg.json` next to the artifact to its build-info file.
    fn for_artifact(artifact_path: &Path) -> eyre::Result<Self> {
        let dbg_path = artifact_path.with_extension("dbg.json");
        let dbg = fs::read_to_string(&dbg_path)
            .wrap_err_with(|| eyre!("no Hardhat debug file {}", dbg_path.display()))?;
        let dbg: DebugFile = serde_json::from_str(&dbg)?;

        let dir = dbg_path.parent().unwrap_or(Path::new("."));
        let path = dir.join(dbg.build_info);
        let info = fs::read_to_string(&path)
            .wrap_err_with(|| eyre!("failed to read build info {}", path.display()))?;
        serde_json::from_str(&info)
            .wrap_err_with(|| eyre!("malformed build info {}", path.display()))
    }
}

/// Submits standard-json verification requests to Etherscan.
pub struct EtherscanVerifier {
    client: Client,
    api_url: Url,
    api_key: String,
}

impl EtherscanVerifier {
    pub fn new(api_key: impl Into<String>) -> eyre::Result<Self> {
        Self::with_url(ETHERSCAN_API_URL, api_key)
    }

    pub fn with_url(api_url: &str, api_key: impl Into<String>) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("failed to create HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.parse().wrap_err("invalid explorer API url")?,
            api_key: api_key.into(),
        })
    }

    async fn submit(&self, target: &VerificationTarget<'_>) -> eyre::Result<Submission> {
        let contract_name = target
            .artifact
            .fully_qualified_name()
            .wrap_err("artifact has no source name, only Hardhat artifacts can be verified")?;
        let build_info = BuildInfo::for_artifact(&target.artifact.path)?;

        let source_code = serde_json::to_string(&build_info.input)?;
        let address = target.address.to_checksum(None);
        let compiler_version = format!("v{}", build_info.solc_long_version);
        let constructor_args = hex::encode(&target.encoded_args);
        let form = [
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("apikey", self.api_key.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("sourceCode", source_code.as_str()),
            ("contractaddress", address.as_str()),
            ("contractname", contract_name.as_str()),
            ("compilerversion", compiler_version.as_str()),
            // Etherscan's spelling.
            ("constructorArguements", constructor_args.as_str()),
        ];

        let response: EtherscanResponse = self
            .client
            .post(self.api_url.clone())
            .query(&[("chainid", target.chain_id)])
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .wrap_err("unexpected explorer response")?;

        submission(response)
    }

    async fn status(&self, guid: &str, chain_id: u64) -> eyre::Result<VerifyStatus> {
        let chain_id = chain_id.to_string();
        let response: EtherscanResponse = self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("chainid", chain_id.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .wrap_err("unexpected explorer response")?;

        verify_status(response)
    }
}

#[async_trait]
impl ContractVerifier for EtherscanVerifier {
    async fn verify(&self, target: &VerificationTarget<'_>) -> eyre::Result<()> {
        let guid = match self.submit(target).await? {
            Submission::AlreadyVerified => {
                tracing::info!("Contract {} is already verified", target.address);
                return Ok(());
            }
            Submission::Guid(guid) => guid,
        };
        tracing::debug!(%guid, "verification submitted");

        for _ in 0..STATUS_POLLS {
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
            if self.status(&guid, target.chain_id).await? == VerifyStatus::Verified {
                tracing::info!("Successfully verified contract {}", target.address);
                return Ok(());
            }
        }

        bail!("verification of {} still pending, guid {guid}", target.address)
    }
}
