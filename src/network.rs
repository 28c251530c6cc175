use std::env;

use eyre::{bail, Context};
use once_cell::sync::Lazy;
use reqwest::Url;

/// Environment variable that turns the local `hardhat` network into a fork
/// of a live chain.
pub const FORKING_URL_VAR: &str = "FORKING_URL";

/// Name of the local development network.
pub const LOCAL_NETWORK: &str = "hardhat";

struct KnownNetwork {
    name: &'static str,
    rpc_url: &'static str,
    chain_id: u64,
}

static KNOWN_NETWORKS: Lazy<Vec<KnownNetwork>> = Lazy::new(|| {
    vec![
        KnownNetwork {
            name: "ethereum",
            rpc_url: "https://rpc.ankr.com/eth",
            chain_id: 1,
        },
        KnownNetwork {
            name: "holesky",
            rpc_url: "https://1rpc.io/holesky",
            chain_id: 17000,
        },
        KnownNetwork {
            name: "sepolia",
            rpc_url: "https://rpc.ankr.com/eth_sepolia",
            chain_id: 11155111,
        },
        KnownNetwork {
            name: LOCAL_NETWORK,
            rpc_url: "http://127.0.0.1:8545",
            chain_id: 31337,
        },
    ]
});

/// A named network the tool can deploy to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: Url,
    /// Expected chain id, when known ahead of time.
    pub chain_id: Option<u64>,
    /// Upstream the local node forks from. Set only for fork simulations.
    pub forking: Option<Url>,
}

impl NetworkConfig {
    /// Looks up `name` in the built-in table and applies environment
    /// overrides.
    pub fn resolve(name: &str) -> eyre::Result<Self> {
        Self::resolve_with(name, |key| env::var(key).ok())
    }

    /// Same as [`NetworkConfig::resolve`], reading variables through `lookup`.
    pub fn resolve_with<F>(name: &str, lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let known = KNOWN_NETWORKS.iter().find(|n| n.name == name);
        let override_var = rpc_url_var(name);

        let rpc_url = match (lookup(&override_var), known) {
            (Some(url), _) => url,
            (None, Some(known)) => known.rpc_url.to_string(),
            (None, None) => bail!(
                "unknown network \"{name}\", set {override_var} to deploy to it"
            ),
        };
        let rpc_url = rpc_url
            .parse()
            .wrap_err_with(|| format!("invalid RPC url for network \"{name}\""))?;

        let forking = match name {
            LOCAL_NETWORK => lookup(FORKING_URL_VAR)
                .filter(|url| !url.is_empty())
                .map(|url| url.parse())
                .transpose()
                .wrap_err("invalid forking url")?,
            _ => None,
        };

        Ok(Self {
            name: name.to_string(),
            rpc_url,
            chain_id: known.map(|n| n.chain_id),
            forking,
        })
    }

    /// Whether transactions only hit a local copy of a live network.
    pub fn is_fork(&self) -> bool {
        self.forking.is_some()
    }
}

/// `holesky` -> `HOLESKY_RPC_URL`.
fn rpc_url_var(name: &str) -> String {
    let name = name.to_uppercase().replace('-', "_");
    format!("{name}_RPC_URL")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn resolves_builtin_network() {
        let network = NetworkConfig::resolve_with("holesky", vars(&[])).unwrap();
        assert_eq!(network.rpc_url.as_str(), "https://1rpc.io/holesky");
        assert_eq!(network.chain_id, Some(17000));
        assert!(!network.is_fork());
    }

    #[test]
    fn rpc_url_can_be_overridden() {
        let lookup = vars(&[("ETHEREUM_RPC_URL", "https://eth.example.org/")]);
        let network = NetworkConfig::resolve_with("ethereum", lookup).unwrap();
        assert_eq!(network.rpc_url.as_str(), "https://eth.example.org/");
    }

    #[test]
    fn unknown_network_requires_url() {
        let err = NetworkConfig::resolve_with("base", vars(&[])).unwrap_err();
        assert!(err.to_string().contains("BASE_RPC_URL"));

        let lookup = vars(&[("BASE_RPC_URL", "https://base.example.org/")]);
        let network = NetworkConfig::resolve_with("base", lookup).unwrap();
        assert_eq!(network.chain_id, None);
    }

    #[test]
    fn local_network_is_fork_when_forking_url_set() {
        let network = NetworkConfig::resolve_with(LOCAL_NETWORK, vars(&[])).unwrap();
        assert!(!network.is_fork());

        let lookup = vars(&[(FORKING_URL_VAR, "https://rpc.ankr.com/eth")]);
        let network = NetworkConfig::resolve_with(LOCAL_NETWORK, lookup).unwrap();
        assert!(network.is_fork());
    }

    #[test]
    fn forking_url_ignored_on_live_networks() {
        let lookup = vars(&[(FORKING_URL_VAR, "https://rpc.ankr.com/eth")]);
        let network = NetworkConfig::resolve_with("sepolia", lookup).unwrap();
        assert!(!network.is_fork());
    }
}
