// All service modules
pub mod classifier;
pub mod parser;
pub mod pipeline;
pub mod tx_builder;
pub mod wallet;

// Re-export for convenience
pub use classifier::AssetRegistry;
pub use parser::ParserClient;
pub use pipeline::TransferPipeline;
pub use wallet::{EthersWallet, SubmissionDriver, WalletProvider};
