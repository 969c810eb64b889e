use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::types::token::TokenMeta;

/// A token minted at genesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    /// Receives the whole supply and is recorded as creator
    pub holder: Address,
}

impl GenesisToken {
    pub fn meta(&self) -> TokenMeta {
        TokenMeta::new(
            self.name.clone(),
            self.symbol.clone(),
            self.decimals,
            self.total_supply,
            self.holder,
        )
    }
}

/// Genesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub chain_id: u64,
    /// Native base-asset balances
    pub initial_balances: Vec<(Address, u64)>,
    pub tokens: Vec<GenesisToken>,
    pub wrapped_name: String,
    pub wrapped_symbol: String,
    pub wrapped_decimals: u8,
}

impl GenesisConfig {
    pub fn new(chain_id: u64) -> Self {
        GenesisConfig {
            chain_id,
            initial_balances: Vec::new(),
            tokens: Vec::new(),
            wrapped_name: "Wrapped Native".to_string(),
            wrapped_symbol: "WNAT".to_string(),
            wrapped_decimals: 18,
        }
    }

    /// Address of the router contract on this chain
    pub fn router_address(&self) -> Address {
        Address::derive(b"router", &self.chain_id.to_le_bytes())
    }

    /// Address of the wrapped base-asset token contract on this chain
    pub fn wrapped_native_address(&self) -> Address {
        Address::derive(b"wrapped-native", &self.chain_id.to_le_bytes())
    }

    pub fn wrapped_native_meta(&self) -> TokenMeta {
        TokenMeta::wrapped_native(
            self.wrapped_native_address(),
            &self.wrapped_name,
            &self.wrapped_symbol,
            self.wrapped_decimals,
        )
    }
}
