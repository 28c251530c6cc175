use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use alloy::{
    hex,
    primitives::{Address, B256},
};
use chrono::NaiveDate;
use eyre::Context;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// What gets written down after a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Checksummed contract address.
    pub address: String,
    pub tx_hash: String,
    pub block_number: u64,
}

impl DeploymentRecord {
    pub fn new(address: Address, tx_hash: B256, block_number: u64) -> Self {
        Self {
            address: address.to_checksum(None),
            tx_hash: hex::encode_prefixed(tx_hash),
            block_number,
        }
    }
}

/// Writes deployment records for one network.
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    dir: PathBuf,
}

impl DeploymentStore {
    /// Records go to `<root>/<network>/`.
    pub fn new(root: impl AsRef<Path>, network: &str) -> Self {
        Self {
            dir: root.as_ref().join(network),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, contract_id: &str, date: NaiveDate) -> PathBuf {
        let date = date.format("%Y-%m-%d");
        self.dir.join(format!("deployment-{contract_id}-{date}.json"))
    }

    /// Saves `record` under `contract_id`. Fails if a record for the same
    /// contract id and day already exists; the existing file is left alone.
    ///
    /// The record is written to a scratch file next to its final path and
    /// only moved into place once complete.
    pub fn save(
        &self,
        contract_id: &str,
        record: &DeploymentRecord,
        date: NaiveDate,
    ) -> eyre::Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.path_for(contract_id, date);
        let data = BTreeMap::from([(contract_id, record)]);
        let mut data = serde_json::to_string_pretty(&data)?;
        data.push('\n');

        let mut file = NamedTempFile::new_in(&self.dir)
            .wrap_err_with(|| format!("failed to create a file in {}", self.dir.display()))?;
        file.write_all(data.as_bytes())
            .wrap_err_with(|| format!("failed to write deployment file {}", path.display()))?;
        file.persist_noclobber(&path)
            .map_err(|e| e.error)
            .wrap_err_with(|| format!("failed to create deployment file {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use alloy::primitives::{address, b256};

    use super::*;

    fn record() -> DeploymentRecord {
        DeploymentRecord::new(
            address!("6243558a24cc6116abe751f27e6d7ede50abfc76"),
            b256!("aa00000000000000000000000000000000000000000000000000000000000001"),
            21_000_000,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    #[test]
    fn file_name_is_dated_and_network_scoped() {
        let store = DeploymentStore::new("deploy", "holesky");
        assert_eq!(
            store.path_for("LevvaToken", date()),
            Path::new("deploy/holesky/deployment-LevvaToken-2024-11-05.json")
        );
    }

    #[test]
    fn address_is_checksummed() {
        assert_eq!(
            record().address,
            "0x6243558a24CC6116aBE751f27E6d7Ede50ABFC76"
        );
    }

    #[test]
    fn writes_record_keyed_by_contract_id() {
        let root = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(root.path(), "holesky");

        let path = store.save("LevvaToken", &record(), date()).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert_eq!(
            written,
            r#"{
  "LevvaToken": {
    "address": "0x6243558a24CC6116aBE751f27E6d7Ede50ABFC76",
    "txHash": "0xaa00000000000000000000000000000000000000000000000000000000000001",
    "blockNumber": 21000000
  }
}
"#
        );
    }

    #[test]
    fn refuses_to_overwrite_same_day_record() {
        let root = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(root.path(), "holesky");
        let path = store.save("OpenStaking", &record(), date()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut other = record();
        other.block_number = 1;
        let err = store.save("OpenStaking", &other, date()).unwrap_err();
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn refused_save_leaves_no_stray_files() {
        let root = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(root.path(), "holesky");
        let path = store.save("OpenStaking", &record(), date()).unwrap();
        store.save("OpenStaking", &record(), date()).unwrap_err();

        let files: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn different_day_gets_its_own_file() {
        let root = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(root.path(), "holesky");
        store.save("OpenStaking", &record(), date()).unwrap();

        let next_day = date().succ_opt().unwrap();
        let path = store.save("OpenStaking", &record(), next_day).unwrap();
        assert!(path.ends_with("deployment-OpenStaking-2024-11-06.json"));
    }
}
