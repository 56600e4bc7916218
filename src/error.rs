use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Owner provisioning failed: {0}")]
    Provisioning(String),
    #[error("Account construction failed: {0}")]
    Construction(String),
    #[error("Invalid guardian address: {0}")]
    InvalidGuardian(String),
    #[error("Invalid guardian set: {0}")]
    GuardianSet(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Relay request failed: {0}")]
    Relay(String),
}
