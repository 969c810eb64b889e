use std::path::{Path, PathBuf};

use anyhow::Result;
use pairswap_core::{Address, GenesisConfig, GenesisToken, KeyPair};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the state snapshot inside the data directory
pub const STATE_FILE: &str = "state.bin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid address in {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Chain ID; also seeds the router and wrapped-native addresses
    pub chain_id: u64,

    /// Node data directory
    pub data_dir: PathBuf,

    /// Genesis configuration
    pub genesis: GenesisConfigFile,
}

/// Genesis configuration for file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfigFile {
    pub initial_balances: Vec<BalanceEntry>,
    pub tokens: Vec<TokenEntry>,
    pub wrapped_name: String,
    pub wrapped_symbol: String,
    pub wrapped_decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub address: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub holder: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            chain_id: 1,
            data_dir: PathBuf::from("./pairswap-data"),
            genesis: GenesisConfigFile::default(),
        }
    }
}

impl Default for GenesisConfigFile {
    fn default() -> Self {
        let defaults = GenesisConfig::new(0);
        GenesisConfigFile {
            initial_balances: vec![],
            tokens: vec![],
            wrapped_name: defaults.wrapped_name,
            wrapped_symbol: defaults.wrapped_symbol,
            wrapped_decimals: defaults.wrapped_decimals,
        }
    }
}

impl NodeConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let content = std::fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// Convert genesis config to core type
    pub fn to_genesis_config(&self) -> Result<GenesisConfig> {
        let initial_balances = self
            .genesis
            .initial_balances
            .iter()
            .map(|entry| Ok((parse_address("initial_balances", &entry.address)?, entry.balance)))
            .collect::<Result<Vec<_>>>()?;

        let tokens = self
            .genesis
            .tokens
            .iter()
            .map(|entry| {
                Ok(GenesisToken {
                    name: entry.name.clone(),
                    symbol: entry.symbol.clone(),
                    decimals: entry.decimals,
                    total_supply: entry.total_supply,
                    holder: parse_address("tokens", &entry.holder)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GenesisConfig {
            chain_id: self.chain_id,
            initial_balances,
            tokens,
            wrapped_name: self.genesis.wrapped_name.clone(),
            wrapped_symbol: self.genesis.wrapped_symbol.clone(),
            wrapped_decimals: self.genesis.wrapped_decimals,
        })
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    Address::from_hex(value).map_err(|_| {
        ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

/// Generate a sample configuration with one funded user holding two tokens.
/// Returns the user's key pair alongside the config.
pub fn generate_sample_config() -> (NodeConfig, KeyPair) {
    let user = KeyPair::generate();
    let holder = user.address.to_hex();

    let config = NodeConfig {
        genesis: GenesisConfigFile {
            initial_balances: vec![BalanceEntry {
                address: holder.clone(),
                balance: 1_000_000_000,
            }],
            tokens: vec![
                TokenEntry {
                    name: "Sample Alpha".to_string(),
                    symbol: "SALP".to_string(),
                    decimals: 6,
                    total_supply: 1_000_000_000_000,
                    holder: holder.clone(),
                },
                TokenEntry {
                    name: "Sample Beta".to_string(),
                    symbol: "SBET".to_string(),
                    decimals: 6,
                    total_supply: 1_000_000_000_000,
                    holder,
                },
            ],
            ..GenesisConfigFile::default()
        },
        ..NodeConfig::default()
    };

    (config, user)
}
