use std::collections::HashMap;
use std::str::FromStr;

use ethers::types::Address;
use serde::Deserialize;

use crate::{
    config::Config,
    constants::{ERC20_TRANSFER_SELECTOR, MAX_UNIT_DECIMALS},
    error::{AppError, Result},
    models::TransferStrategy,
};

/// One entry of the `TOKEN_REGISTRY` JSON map, keyed by symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub decimals: u32,
}

#[derive(Debug, Clone)]
struct TokenEntry {
    contract: Address,
    decimals: u32,
}

/// Symbol table for the chain's assets, built and validated once at startup.
/// `classify` is a pure lookup afterwards.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    native_aliases: Vec<String>,
    native_decimals: u32,
    tokens: HashMap<String, TokenEntry>,
}

impl AssetRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw: HashMap<String, TokenConfig> = serde_json::from_str(&config.token_registry_json)
            .map_err(|e| AppError::Internal(format!("TOKEN_REGISTRY is not valid JSON: {}", e)))?;

        let mut tokens = HashMap::new();
        for (symbol, entry) in raw {
            let contract = Address::from_str(entry.address.trim()).map_err(|e| {
                AppError::Internal(format!(
                    "TOKEN_REGISTRY address for {} is invalid: {}",
                    symbol, e
                ))
            })?;
            if entry.decimals > MAX_UNIT_DECIMALS {
                return Err(AppError::Internal(format!(
                    "TOKEN_REGISTRY decimals for {} exceed {}",
                    symbol, MAX_UNIT_DECIMALS
                )));
            }
            tokens.insert(
                symbol.trim().to_ascii_uppercase(),
                TokenEntry {
                    contract,
                    decimals: entry.decimals,
                },
            );
        }

        let mut native_aliases: Vec<String> = config
            .native_aliases
            .split(',')
            .map(|alias| alias.trim().to_ascii_uppercase())
            .filter(|alias| !alias.is_empty())
            .collect();
        let native_symbol = config.native_symbol.trim().to_ascii_uppercase();
        if !native_symbol.is_empty() && !native_aliases.contains(&native_symbol) {
            native_aliases.push(native_symbol);
        }

        if config.native_decimals > MAX_UNIT_DECIMALS {
            return Err(AppError::Internal(format!(
                "NATIVE_DECIMALS exceeds {}",
                MAX_UNIT_DECIMALS
            )));
        }

        tracing::info!(
            "Asset registry loaded: {} native aliases, {} tokens",
            native_aliases.len(),
            tokens.len()
        );

        Ok(Self {
            native_aliases,
            native_decimals: config.native_decimals,
            tokens,
        })
    }

    /// Pure, case-insensitive classification of a currency label. Unknown
    /// labels classify as `Unsupported` and must never reach a provider.
    pub fn classify(&self, currency: &str) -> TransferStrategy {
        let symbol = currency.trim().to_ascii_uppercase();
        if self.native_aliases.iter().any(|alias| alias == &symbol) {
            return TransferStrategy::Native {
                decimals: self.native_decimals,
            };
        }
        if let Some(entry) = self.tokens.get(&symbol) {
            return TransferStrategy::Token {
                contract: entry.contract,
                decimals: entry.decimals,
                selector: ERC20_TRANSFER_SELECTOR,
            };
        }
        TransferStrategy::Unsupported {
            label: currency.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUSD_ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn test_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            database_url: "postgres://localhost/cryptoface".to_string(),
            database_max_connections: 1,
            parser_api_url: "http://localhost:8000/agent".to_string(),
            parser_timeout_secs: 30,
            ethereum_rpc_url: "http://localhost:8545".to_string(),
            chain_id: 11155111,
            wallet_private_key: None,
            native_symbol: "ETH".to_string(),
            native_aliases: "ETH,ETHER".to_string(),
            native_decimals: 18,
            token_registry_json: format!(
                r#"{{"MUSD":{{"address":"{}","decimals":18}},"USDC":{{"address":"0x2222222222222222222222222222222222222222","decimals":6}}}}"#,
                MUSD_ADDRESS
            ),
            cors_allowed_origins: "*".to_string(),
        }
    }

    fn test_registry() -> AssetRegistry {
        AssetRegistry::from_config(&test_config()).unwrap()
    }

    #[test]
    fn native_aliases_classify_case_insensitively() {
        let registry = test_registry();
        for label in ["ETH", "eth", "Eth", "ETHER", "ether", " eth "] {
            assert_eq!(
                registry.classify(label),
                TransferStrategy::Native { decimals: 18 },
                "label {:?} should classify native",
                label
            );
        }
    }

    #[test]
    fn registry_tokens_classify_with_exact_entry() {
        let registry = test_registry();
        let strategy = registry.classify("musd");
        assert_eq!(
            strategy,
            TransferStrategy::Token {
                contract: Address::from_str(MUSD_ADDRESS).unwrap(),
                decimals: 18,
                selector: ERC20_TRANSFER_SELECTOR,
            }
        );

        match registry.classify("USDC") {
            TransferStrategy::Token { decimals, .. } => assert_eq!(decimals, 6),
            other => panic!("expected token strategy, got {:?}", other),
        }
    }

    #[test]
    fn unknown_labels_are_unsupported() {
        let registry = test_registry();
        for label in ["BTC", "DOGE", "", "???"] {
            match registry.classify(label) {
                TransferStrategy::Unsupported { label: found } => {
                    assert_eq!(found, label.trim());
                }
                other => panic!("label {:?} should be unsupported, got {:?}", label, other),
            }
        }
    }

    #[test]
    fn registry_rejects_invalid_token_address() {
        let mut config = test_config();
        config.token_registry_json = r#"{"BAD":{"address":"nope","decimals":18}}"#.to_string();
        assert!(AssetRegistry::from_config(&config).is_err());
    }

    #[test]
    fn registry_rejects_oversized_token_decimals() {
        let mut config = test_config();
        config.token_registry_json = format!(
            r#"{{"BIG":{{"address":"{}","decimals":78}}}}"#,
            MUSD_ADDRESS
        );
        assert!(AssetRegistry::from_config(&config).is_err());
    }

    #[test]
    fn registry_rejects_malformed_json() {
        let mut config = test_config();
        config.token_registry_json = "not json".to_string();
        assert!(AssetRegistry::from_config(&config).is_err());
    }
}
