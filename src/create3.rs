//! Deployments through the CreateX factory (<https://createx.rocks>).

use alloy::{
    network::TransactionBuilder,
    primitives::{keccak256, Address, Bytes, B256},
    rpc::types::eth::{Log, TransactionRequest},
    sol,
    sol_types::SolCall,
};
use eyre::ContextCompat;

use crate::constants::CREATE_X_ADDRESS;

sol! {
    interface ICreateX {
        function deployCreate3(bytes32 salt, bytes initCode)
            external
            payable
            returns (address newContract);

        event ContractCreation(address indexed newContract);
    }
}

/// Transaction asking CreateX to deploy `init_code` under `salt`.
pub fn deploy_tx(salt: B256, init_code: Bytes) -> TransactionRequest {
    let input = ICreateX::deployCreate3Call {
        salt,
        initCode: init_code,
    }
    .abi_encode();
    TransactionRequest::default()
        .with_to(CREATE_X_ADDRESS)
        .with_input(input)
}

/// Reads the new contract's address from the factory's receipt logs.
pub fn created_address(logs: &[Log]) -> eyre::Result<Address> {
    logs.iter()
        .filter(|log| log.address() == CREATE_X_ADDRESS)
        .find_map(|log| log.log_decode::<ICreateX::ContractCreation>().ok())
        .map(|log| log.inner.data.newContract)
        .wrap_err("CreateX receipt has no ContractCreation event")
}

/// Salt only `sender` can use, without cross-chain redeploy protection:
/// the sender's address, a zero byte, then 11 bytes derived from `label`.
pub fn permissioned_salt(sender: Address, label: &str) -> B256 {
    let mut salt = [0u8; 32];
    salt[..20].copy_from_slice(sender.as_slice());
    salt[21..].copy_from_slice(&keccak256(label.as_bytes())[..11]);
    B256::from(salt)
}
