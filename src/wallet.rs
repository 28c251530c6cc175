use std::{fs, path::Path};

use alloy::signers::local::{LocalSigner, PrivateKeySigner};
use eyre::{Context, Result};

use crate::config::SignerArgs;

/// Where the deployer's key comes from, in order of precedence.
#[derive(Debug, PartialEq, Eq)]
pub enum SignerSource<'a> {
    PrivateKey(&'a str),
    Keystore {
        path: &'a Path,
        password: Option<&'a str>,
    },
    Prompt,
}

/// Reads a secret from the user without echoing it.
pub trait SecretPrompt {
    fn read_secret(&self, label: &str) -> Result<String>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_secret(&self, label: &str) -> Result<String> {
        rpassword::prompt_password(format!("{label}: ")).wrap_err("could not read from terminal")
    }
}

impl SignerArgs {
    pub fn source(&self) -> SignerSource<'_> {
        if let Some(key) = &self.private_key {
            return SignerSource::PrivateKey(key);
        }

        if let Some(path) = &self.keystore {
            return SignerSource::Keystore {
                path,
                password: self.keystore_password.as_deref(),
            };
        }

        SignerSource::Prompt
    }

    pub fn wallet(&self, prompt: &impl SecretPrompt) -> Result<PrivateKeySigner> {
        match self.source() {
            SignerSource::PrivateKey(key) => {
                tracing::warn!("Using private key in plain text is not recommended");
                parse_private_key(key)
            }
            SignerSource::Keystore { path, password } => {
                let password = match password {
                    Some(password) => {
                        tracing::warn!("Use interactive mode to enter keystore password");
                        password.to_string()
                    }
                    None => prompt.read_secret("Enter keystore password")?,
                };
                decrypt_keystore(path, password)
            }
            SignerSource::Prompt => {
                let key = prompt.read_secret("Enter signer private key")?;
                parse_private_key(&key)
            }
        }
    }
}

fn parse_private_key(key: &str) -> Result<PrivateKeySigner> {
    key.trim()
        .parse::<PrivateKeySigner>()
        .wrap_err("invalid private key")
}

fn decrypt_keystore(path: &Path, password: String) -> Result<PrivateKeySigner> {
    // Surface a missing file as such instead of as a decryption failure.
    fs::metadata(path)
        .wrap_err_with(|| format!("could not open keystore {}", path.display()))?;
    LocalSigner::decrypt_keystore(path, password).wrap_err("could not decrypt keystore")
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::PathBuf};

    use alloy::primitives::{address, Address};
    use eyre::eyre;

    use super::*;

    // Second default anvil/hardhat account, password "testpassword".
    const KEYSTORE: &str = r#"{
      "crypto": {
        "cipher": "aes-128-ctr",
        "cipherparams": {
          "iv": "83dbcc02d8ccb40e466191a123791e0e"
        },
        "ciphertext": "c57fbdd25f0130525893157ecb91e76b46f0625f618bb81f0927d026f7d9d4e3",
        "kdf": "pbkdf2",
        "kdfparams": {
          "c": 8192,
          "dklen": 32,
          "prf": "hmac-sha256",
          "salt": "2f0a7d5b3c4e9a8b1d6c5f4e3a2b1c0d9e8f7a6b5c4d3e2f1a0b9c8d7e6f5a4b"
        },
        "mac": "887ade856b0e7cf366b490415f9d90d7455290c565b0f7e8249d8bada7bc3d7e"
      },
      "id": "8f5bd6f4-2b7a-4c1e-9a36-0c5e1d7b9f21",
      "version": 3
    }"#;
    const KEYSTORE_ADDRESS: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    // First default anvil/hardhat account.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Answers prompts from a fixed script and remembers what was asked.
    struct ScriptedPrompt {
        answer: Option<String>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                asked: RefCell::default(),
            }
        }

        fn silent() -> Self {
            Self {
                answer: None,
                asked: RefCell::default(),
            }
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn read_secret(&self, label: &str) -> Result<String> {
            self.asked.borrow_mut().push(label.to_string());
            self.answer.clone().ok_or_else(|| eyre!("unexpected prompt"))
        }
    }

    fn args(
        private_key: Option<&str>,
        keystore: Option<PathBuf>,
        password: Option<&str>,
    ) -> SignerArgs {
        SignerArgs {
            private_key: private_key.map(Into::into),
            keystore,
            keystore_password: password.map(Into::into),
        }
    }

    fn write_keystore() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        fs::write(&path, KEYSTORE).unwrap();
        (dir, path)
    }

    #[test]
    fn private_key_wins_over_keystore() {
        let args = args(Some(DEV_KEY), Some("keystore.json".into()), Some("secret"));
        assert_eq!(args.source(), SignerSource::PrivateKey(DEV_KEY));

        let prompt = ScriptedPrompt::silent();
        let signer = args.wallet(&prompt).unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert!(prompt.asked.borrow().is_empty());
    }

    #[test]
    fn keystore_used_without_private_key() {
        let args = args(None, Some("keystore.json".into()), None);
        assert_eq!(
            args.source(),
            SignerSource::Keystore {
                path: Path::new("keystore.json"),
                password: None
            }
        );
    }

    #[test]
    fn prompt_used_without_credentials() {
        let args = args(None, None, Some("ignored"));
        assert_eq!(args.source(), SignerSource::Prompt);

        let prompt = ScriptedPrompt::answering(DEV_KEY);
        let signer = args.wallet(&prompt).unwrap();
        assert_eq!(
            signer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(*prompt.asked.borrow(), vec!["Enter signer private key"]);
    }

    #[test]
    fn keystore_decrypts_with_supplied_password() {
        let (_dir, path) = write_keystore();
        let args = args(None, Some(path), Some("testpassword"));

        let prompt = ScriptedPrompt::silent();
        let signer = args.wallet(&prompt).unwrap();
        assert_eq!(signer.address(), KEYSTORE_ADDRESS);
        assert!(prompt.asked.borrow().is_empty());
    }

    #[test]
    fn keystore_password_is_prompted_for() {
        let (_dir, path) = write_keystore();
        let args = args(None, Some(path), None);

        let prompt = ScriptedPrompt::answering("testpassword");
        let signer = args.wallet(&prompt).unwrap();
        assert_eq!(signer.address(), KEYSTORE_ADDRESS);
        assert_eq!(*prompt.asked.borrow(), vec!["Enter keystore password"]);
    }

    #[test]
    fn wrong_keystore_password_is_fatal() {
        let (_dir, path) = write_keystore();
        let args = args(None, Some(path), Some("not-the-password"));

        let err = args.wallet(&ScriptedPrompt::silent()).unwrap_err();
        assert_eq!(err.to_string(), "could not decrypt keystore");
    }

    #[test]
    fn missing_keystore_is_fatal() {
        let args = args(None, Some("does/not/exist.json".into()), Some("pw"));
        let err = args.wallet(&ScriptedPrompt::silent()).unwrap_err();
        assert!(err.to_string().starts_with("could not open keystore"));
    }

    #[test]
    fn garbage_private_key_is_rejected() {
        let args = args(Some("0xnot-a-key"), None, None);
        let err = args.wallet(&ScriptedPrompt::silent()).unwrap_err();
        assert_eq!(err.to_string(), "invalid private key");
    }
}
