use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_NATIVE_DECIMALS, DEFAULT_NATIVE_SYMBOL, DEFAULT_PARSER_TIMEOUT_SECS, MAX_UNIT_DECIMALS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Remote natural-language parser
    pub parser_api_url: String,
    pub parser_timeout_secs: u64,

    // Blockchain
    pub ethereum_rpc_url: String,
    pub chain_id: u64,
    pub wallet_private_key: Option<String>,

    // Asset registry
    pub native_symbol: String,
    pub native_aliases: String,
    pub native_decimals: u32,
    pub token_registry_json: String,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,

            parser_api_url: env::var("PARSER_API_URL")?,
            parser_timeout_secs: env::var("PARSER_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_PARSER_TIMEOUT_SECS.to_string())
                .parse()?,

            ethereum_rpc_url: env::var("ETHEREUM_RPC_URL")?,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            wallet_private_key: env::var("WALLET_PRIVATE_KEY").ok(),

            native_symbol: env::var("NATIVE_SYMBOL")
                .unwrap_or_else(|_| DEFAULT_NATIVE_SYMBOL.to_string()),
            native_aliases: env::var("NATIVE_ALIASES").unwrap_or_else(|_| "ETH,ETHER".to_string()),
            native_decimals: env::var("NATIVE_DECIMALS")
                .unwrap_or_else(|_| DEFAULT_NATIVE_DECIMALS.to_string())
                .parse()?,
            token_registry_json: env::var("TOKEN_REGISTRY").unwrap_or_else(|_| "{}".to_string()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if url::Url::parse(self.parser_api_url.trim()).is_err() {
            anyhow::bail!("PARSER_API_URL is not a valid URL");
        }
        if self.ethereum_rpc_url.trim().is_empty() {
            anyhow::bail!("ETHEREUM_RPC_URL is empty");
        }
        if self.parser_timeout_secs == 0 {
            anyhow::bail!("PARSER_TIMEOUT_SECS must be > 0");
        }
        if self.native_symbol.trim().is_empty() {
            anyhow::bail!("NATIVE_SYMBOL is empty");
        }
        if self.native_decimals > MAX_UNIT_DECIMALS {
            anyhow::bail!("NATIVE_DECIMALS must be <= {}", MAX_UNIT_DECIMALS);
        }

        if self.wallet_private_key.is_none() {
            tracing::warn!("WALLET_PRIVATE_KEY not set; sign & submit requests will be rejected");
        }
        if !self.is_testnet() && self.wallet_private_key.is_some() {
            tracing::warn!("Signing key configured against mainnet chain id {}", self.chain_id);
        }
        if self.token_registry_json.trim() == "{}" {
            tracing::warn!("TOKEN_REGISTRY is empty; only native-asset transfers will classify");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        if self.environment == "development" || self.environment == "testnet" {
            return true;
        }
        self.chain_id != 1
    }
}
