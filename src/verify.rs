use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::artifact::Artifact;

/// How long to wait before verifying, so the explorer has indexed the
/// deployment.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_secs(25);

/// A freshly deployed contract to verify.
#[derive(Debug)]
pub struct VerificationTarget<'a> {
    pub address: Address,
    pub artifact: &'a Artifact,
    /// Constructor arguments as given on the command line.
    pub constructor_args: &'a [String],
    /// ABI-encoded constructor arguments.
    pub encoded_args: Bytes,
    pub chain_id: u64,
}

/// Registers deployed bytecode with a block explorer.
#[async_trait]
pub trait ContractVerifier: Send + Sync {
    async fn verify(&self, target: &VerificationTarget<'_>) -> eyre::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Skipped,
    Verified,
    Failed,
}

/// Post-deployment verification step. Never fails the deployment.
pub struct Verification<V> {
    verifier: Option<V>,
    dry_run: bool,
    delay: Duration,
}

impl<V: ContractVerifier> Verification<V> {
    pub fn new(verifier: V, dry_run: bool) -> Self {
        Self {
            verifier: Some(verifier),
            dry_run,
            delay: DEFAULT_VERIFY_DELAY,
        }
    }

    pub fn disabled() -> Self {
        Self {
            verifier: None,
            dry_run: false,
            delay: DEFAULT_VERIFY_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether a verifier is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn verify(&self, target: &VerificationTarget<'_>) -> VerifyOutcome {
        let Some(verifier) = &self.verifier else {
            return VerifyOutcome::Skipped;
        };
        if self.dry_run {
            tracing::debug!(address = %target.address, "fork simulation, skipping verification");
            return VerifyOutcome::Skipped;
        }

        tokio::time::sleep(self.delay).await;

        tracing::info!(
            "Verify contract {} with constructor arguments: {}",
            target.address,
            target.constructor_args.join(",")
        );

        match verifier.verify(target).await {
            Ok(()) => VerifyOutcome::Verified,
            Err(e) => {
                tracing::warn!("Verify contract {} failed: {e:#}", target.address);
                VerifyOutcome::Failed
            }
        }
    }
}
