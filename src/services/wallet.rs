use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionRequest},
};

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{SubmissionResult, UnsignedTransactionRequest},
};

/// Capability surface of a connected wallet. Injected into the submission
/// driver so wallet/session acquisition stays out of the pipeline.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account authorization. Idempotent when already authorized.
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Resolve the active signing account.
    async fn active_account(&self) -> Result<String>;

    /// Sign and broadcast, returning the transaction hash. The wallet may
    /// block on user interaction here; rejection is a normal outcome.
    async fn sign_and_send(&self, request: &UnsignedTransactionRequest) -> Result<String>;
}

/// Drives one submission through the wallet capability: provider check,
/// authorization, signer resolution, sign & send, handle extraction.
#[derive(Clone)]
pub struct SubmissionDriver {
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl SubmissionDriver {
    pub fn new(wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        Self { wallet }
    }

    pub fn has_provider(&self) -> bool {
        self.wallet.is_some()
    }

    /// Submit for signing and broadcast. Does not poll for confirmation;
    /// the returned handle is the whole result.
    pub async fn submit(&self, request: &UnsignedTransactionRequest) -> Result<SubmissionResult> {
        let wallet = self.wallet.as_ref().ok_or(AppError::NoProvider)?;

        let accounts = wallet.request_accounts().await?;
        if accounts.is_empty() {
            return Err(AppError::AuthorizationDenied(
                "wallet returned no accounts".to_string(),
            ));
        }

        let account = wallet.active_account().await?;
        tracing::debug!("Submitting transaction from {}", account);

        let transaction_handle = wallet.sign_and_send(request).await?;
        tracing::info!("Transaction submitted: {}", transaction_handle);

        Ok(SubmissionResult { transaction_handle })
    }
}

/// Wallet capability backed by an ethers local signer over HTTP RPC.
pub struct EthersWallet {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
}

impl EthersWallet {
    /// Build from config. An absent private key means no wallet capability;
    /// the driver then refuses submissions with `NoProvider`.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(key) = config.wallet_private_key.as_deref() else {
            return Ok(None);
        };

        let provider = Provider::<Http>::try_from(config.ethereum_rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid EVM RPC URL: {}", e)))?;
        let signer = LocalWallet::from_str(key.trim())
            .map_err(|e| AppError::Internal(format!("Invalid wallet private key: {}", e)))?
            .with_chain_id(config.chain_id);

        Ok(Some(Self {
            client: SignerMiddleware::new(provider, signer),
        }))
    }

    fn signer_address(&self) -> String {
        format!("{:?}", self.client.signer().address())
    }
}

#[async_trait]
impl WalletProvider for EthersWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        // A local signer carries its own authorization; nothing to grant.
        Ok(vec![self.signer_address()])
    }

    async fn active_account(&self) -> Result<String> {
        Ok(self.signer_address())
    }

    async fn sign_and_send(&self, request: &UnsignedTransactionRequest) -> Result<String> {
        // Recipient parsing happens here, not in the builder, so malformed
        // addresses surface as submission failures.
        let to = Address::from_str(request.to.trim()).map_err(|_| {
            AppError::Submission(format!("Invalid recipient address: {}", request.to))
        })?;

        let mut tx = TransactionRequest::new().to(to).value(request.value);
        if let Some(data) = &request.data {
            tx = tx.data(data.clone());
        }

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| AppError::Submission(e.to_string()))?;

        Ok(format!("{:?}", pending.tx_hash()))
    }
}
