pub mod artifact;
pub mod config;
pub mod constants;
pub mod create3;
pub mod deployer;
pub mod etherscan;
pub mod formatting;
pub mod network;
pub mod record;
pub mod tasks;
pub mod verify;
pub mod wallet;

pub use config::run;
