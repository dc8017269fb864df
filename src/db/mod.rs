use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::Config,
    error::Result,
    models::{InsertMessage, Message},
};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== MESSAGE QUERIES ====================
impl Database {
    pub async fn get_messages(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"SELECT id, wallet_address, content, "timestamp"
               FROM messages
               ORDER BY "timestamp" ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_message(&self, message: &InsertMessage) -> Result<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"INSERT INTO messages (wallet_address, content)
               VALUES ($1, $2)
               RETURNING id, wallet_address, content, "timestamp""#,
        )
        .bind(&message.wallet_address)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(database_url: &str) -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            database_url: database_url.to_string(),
            database_max_connections: 1,
            parser_api_url: "http://localhost:8000/agent".to_string(),
            parser_timeout_secs: 30,
            ethereum_rpc_url: "http://localhost:8545".to_string(),
            chain_id: 11155111,
            wallet_private_key: None,
            native_symbol: "ETH".to_string(),
            native_aliases: "ETH,ETHER".to_string(),
            native_decimals: 18,
            token_registry_json: "{}".to_string(),
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[tokio::test]
    async fn database_new_returns_error_on_invalid_url() {
        let config = test_config("not-a-url");
        let result = Database::new(&config).await;
        assert!(result.is_err());
    }
}
