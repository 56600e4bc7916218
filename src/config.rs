use crate::address::Address;
use crate::error::VaultError;
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "SHADOWVAULT_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VaultConfig {
    pub relay: RelayConfig,
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub recovery: RecoverySettings,
    /// Relay API key. Never written to the config file; injected from the
    /// environment after load.
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_relay_base")]
    pub base_url: String,
}

fn default_chain_id() -> u64 {
    11155111 // Sepolia
}

fn default_relay_base() -> String {
    "https://relay.shadowvault.dev".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContractsConfig {
    pub entry_point: Address,
    pub recovery_module: Address,
    #[serde(default = "default_account_salt")]
    pub account_salt: u64,
    #[serde(default = "default_entry_point_version")]
    pub entry_point_version: String,
    #[serde(default = "default_account_version")]
    pub account_version: String,
}

fn default_account_salt() -> u64 {
    7777
}

fn default_entry_point_version() -> String {
    "0.7".to_string()
}

fn default_account_version() -> String {
    "3.1".to_string()
}

/// Guardian addresses are supplied here rather than hard-coded; they are
/// kept as raw strings and validated when a recovery setup is attempted.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RecoverySettings {
    #[serde(default)]
    pub guardians: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig {
                chain_id: default_chain_id(),
                base_url: default_relay_base(),
            },
            contracts: ContractsConfig {
                // EntryPoint v0.7
                entry_point: "0x0000000071727de22e5e9d8baf0edac6f37da032"
                    .parse()
                    .unwrap(),
                recovery_module: "0x2a9e8fa175f45b235efddd97d2727741ef4eee63"
                    .parse()
                    .unwrap(),
                account_salt: default_account_salt(),
                entry_point_version: default_entry_point_version(),
                account_version: default_account_version(),
            },
            recovery: RecoverySettings::default(),
            api_key: String::new(),
        }
    }
}

impl VaultConfig {
    /// Load config from `path`, creating a default file if none exists, then
    /// require the relay API key from the environment. A missing key is a
    /// hard error: nothing interactive may render without it.
    pub fn load(path: &str) -> Result<Self, VaultError> {
        let mut config = Self::load_file_or_default(path)?;
        config.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                VaultError::Config(format!("{} is not set; refusing to start", API_KEY_ENV))
            })?;
        Ok(config)
    }

    fn load_file_or_default(path: &str) -> Result<Self, VaultError> {
        if std::path::Path::new(path).exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| VaultError::Config(format!("reading {}: {}", path, e)))?;
            let config: VaultConfig = toml::from_str(&s)
                .map_err(|e| VaultError::Config(format!("parsing {}: {}", path, e)))?;
            tracing::info!("Config loaded from {}", path);
            Ok(config)
        } else {
            tracing::info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            Ok(config)
        }
    }

    /// Relay endpoint templated with chain id and API key.
    pub fn relay_url(&self) -> String {
        format!(
            "{}/v2/{}/rpc?apikey={}",
            self.relay.base_url.trim_end_matches('/'),
            self.relay.chain_id,
            self.api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_url_templates_chain_and_key() {
        let mut config = VaultConfig::default();
        config.api_key = "k123".to_string();
        config.relay.base_url = "https://relay.example.org/".to_string();
        assert_eq!(
            config.relay_url(),
            "https://relay.example.org/v2/11155111/rpc?apikey=k123"
        );
    }

    #[test]
    fn load_requires_the_api_key() {
        let path = std::env::temp_dir().join("shadowvault-config-test.toml");
        let path = path.to_str().unwrap();

        // one sequential test so the env var is not raced by another
        std::env::remove_var(API_KEY_ENV);
        let err = VaultConfig::load(path).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));

        std::env::set_var(API_KEY_ENV, "test-key");
        let config = VaultConfig::load(path).unwrap();
        assert_eq!(config.api_key, "test-key");
        std::env::remove_var(API_KEY_ENV);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = VaultConfig::default();
        let s = toml::to_string_pretty(&config).unwrap();
        let back: VaultConfig = toml::from_str(&s).unwrap();
        assert_eq!(back.relay.chain_id, 11155111);
        assert_eq!(back.contracts.account_salt, 7777);
        assert_eq!(back.contracts.entry_point, config.contracts.entry_point);
        // api_key is skip-serialized
        assert!(back.api_key.is_empty());
    }
}
