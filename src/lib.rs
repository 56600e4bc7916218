pub mod abi;
pub mod account;
pub mod address;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod menu;
pub mod owner;
pub mod recovery;
pub mod relay;
pub mod session;
