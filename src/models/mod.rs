// Shared API and domain types
pub mod message;
pub mod transfer;

pub use message::{ApiResponse, InsertMessage, Message};
pub use transfer::{
    ParseOutcome, ParsedTransfer, SubmissionResult, TransferStrategy, UnsignedTransactionRequest,
};
