use alloy::primitives::{address, Address};

/// CreateX factory, same address on every supported chain.
pub const CREATE_X_ADDRESS: Address = address!("ba5Ed099633D3B313e4D5F7bdc1305d3c28ba5Ed");

/// Owner of the Levva contracts.
pub const LEVVA_OWNER: &str = "0xea42f017a9D962019E36ce4D7d376D0421855b66";

/// LEVVA token the staking contract pays out in.
pub const LEVVA_TOKEN: &str = "0x6243558a24CC6116aBE751f27E6d7Ede50ABFC76";

/// OPEN token staked by the open staking contract.
pub const OPEN_TOKEN: &str = "0x4123a133ae3c521FD134D7b13A2dEC35b56c2463";

/// Vault of the previous open staking deployment.
pub const OPEN_STAKING_VAULT: &str = "0x4fBc79d384235e59574A2ebB6c721E4B939Ce188";

/// Deployed vesting wallet factory.
pub const VESTING_WALLET_FACTORY: &str = "0x40346BE3084c553Da2be699c55DF47C927f71272";

/// One year, in seconds.
pub const ONE_YEAR: u64 = 31_536_000;

/// Gas limit and price the open staking deployment went out with.
pub const OPEN_STAKING_GAS_LIMIT: u64 = 2_000_000;
pub const OPEN_STAKING_GAS_PRICE: u128 = 11_000_000_000;
