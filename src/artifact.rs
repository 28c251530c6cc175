use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use eyre::{bail, eyre, Context, ContextCompat};
use serde::Deserialize;

/// Compiled contract: ABI plus creation bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    /// Solidity source unit, e.g. `contracts/LevvaToken.sol`.
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    pub path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
}

/// Hardhat stores a hex string, Foundry an object with an `object` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl RawBytecode {
    fn decode(&self) -> eyre::Result<Bytes> {
        let code = match self {
            RawBytecode::Hex(code) | RawBytecode::Object { object: code } => code,
        };
        if code.contains("__") {
            bail!("bytecode has unlinked library references");
        }
        let code = hex::decode(code.trim_start_matches("0x"))
            .wrap_err("bytecode is not a proper hex string")?;
        Ok(code.into())
    }
}

impl Artifact {
    /// Reads an artifact file.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .wrap_err_with(|| eyre!("failed to read artifact {}", path.display()))?;
        Self::parse(&json, path)
    }

    fn parse(json: &str, path: &Path) -> eyre::Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json)
            .wrap_err_with(|| eyre!("malformed artifact {}", path.display()))?;
        let bytecode = raw.bytecode.decode()?;
        if bytecode.is_empty() {
            bail!("{} has no creation bytecode (abstract contract or interface?)", path.display());
        }

        let contract_name = match raw.contract_name {
            Some(name) => name,
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(ToString::to_string)
                .wrap_err("artifact file name is not valid UTF-8")?,
        };

        Ok(Self {
            contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path: path.to_path_buf(),
        })
    }

    /// Finds `<contract>.json` anywhere below `root`.
    pub fn find(root: impl AsRef<Path>, contract: &str) -> eyre::Result<Self> {
        let root = root.as_ref();
        let file_name = format!("{contract}.json");
        let mut found = Vec::new();
        collect(root, &file_name, &mut found)
            .wrap_err_with(|| eyre!("failed to read artifacts directory {}", root.display()))?;

        match found.len() {
            0 => bail!(
                "no artifact for {contract} under {}, compile the contracts first",
                root.display()
            ),
            1 => Self::load(&found[0]),
            _ => bail!(
                "several artifacts named {contract} under {}, pass the artifact path instead",
                root.display()
            ),
        }
    }

    /// `path:Name` form used by block explorers.
    pub fn fully_qualified_name(&self) -> Option<String> {
        self.source_name
            .as_ref()
            .map(|source| format!("{source}:{}", self.contract_name))
    }

    /// Parses textual constructor arguments against the constructor inputs.
    pub fn constructor_args(&self, args: &[String]) -> eyre::Result<Vec<DynSolValue>> {
        let inputs = self
            .abi
            .constructor()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default();
        if inputs.len() != args.len() {
            bail!(
                "{} constructor takes {} argument(s), got {}",
                self.contract_name,
                inputs.len(),
                args.len()
            );
        }

        inputs
            .iter()
            .zip(args)
            .map(|(input, arg)| {
                let ty = input
                    .resolve()
                    .wrap_err_with(|| format!("could not resolve constructor arg: input={input}"))?;
                ty.coerce_str(arg).wrap_err_with(|| {
                    format!("invalid value {arg:?} for {} {}", input.ty, input.name)
                })
            })
            .collect()
    }

    /// ABI-encodes constructor arguments. Empty for argument-less constructors.
    pub fn encode_args(&self, values: &[DynSolValue]) -> eyre::Result<Bytes> {
        match self.abi.constructor() {
            Some(constructor) => Ok(constructor.abi_encode_input(values)?.into()),
            None if values.is_empty() => Ok(Bytes::new()),
            None => bail!("{} has no constructor", self.contract_name),
        }
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn init_code(&self, encoded_args: &Bytes) -> Bytes {
        [self.bytecode.as_ref(), encoded_args.as_ref()].concat().into()
    }
}

fn collect(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            // Hardhat keeps compiler inputs here, never artifacts.
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }
    Ok(())
}
