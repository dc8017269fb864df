use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Structured transfer extracted by the remote parser. `amount` stays a
/// decimal string in human units until the builder scales it; `recipient`
/// is carried verbatim and only the wallet layer rejects malformed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransfer {
    pub amount: String,
    pub currency: String,
    pub recipient: String,
}

/// Tri-state result of asking the parser to interpret a prompt.
///
/// `Failed` is a transport/service fault and retryable with the same
/// prompt; `Unresolved` means the parser wants a new prompt instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Resolved(ParsedTransfer),
    Unresolved { messages: Vec<String> },
    Failed { reason: String },
}

/// How a classified asset moves value on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStrategy {
    Native {
        decimals: u32,
    },
    Token {
        contract: Address,
        decimals: u32,
        selector: [u8; 4],
    },
    Unsupported {
        label: String,
    },
}

/// Chain-ready request. Native transfers populate `value`; token transfers
/// carry the contract call in `data` with zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransactionRequest {
    pub to: String,
    pub value: U256,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub transaction_handle: String,
}
