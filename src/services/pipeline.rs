use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::{ParseOutcome, ParsedTransfer, TransferStrategy},
    services::{classifier::AssetRegistry, parser::ParserClient, tx_builder, wallet::SubmissionDriver},
};

/// One session's position in the transfer flow.
///
/// `Submitted` does not fall back to `Idle`; a fresh parse is the only way
/// to start another transfer, so a stale built request cannot be resubmitted
/// by accident. `SignFailed` keeps the resolved parse so signing can be
/// retried without re-parsing.
#[derive(Debug, Clone, Default)]
enum TransferState {
    #[default]
    Idle,
    Parsing,
    ParseResolved {
        parsed: ParsedTransfer,
    },
    ParseUnresolved {
        messages: Vec<String>,
    },
    ParseFailed {
        reason: String,
    },
    Signing {
        parsed: ParsedTransfer,
    },
    Submitted {
        tx_hash: String,
    },
    SignFailed {
        parsed: ParsedTransfer,
        reason: String,
    },
}

#[derive(Debug, Default)]
struct Session {
    // Bumped by every parse action; a completion only commits its result
    // while its generation is still current, so a superseded response is
    // discarded instead of overwriting newer state.
    generation: u64,
    state: TransferState,
}

/// Serializable view of a session for the API.
#[derive(Debug, Clone, Serialize)]
pub struct TransferSnapshot {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedTransfer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl TransferSnapshot {
    fn bare(status: &'static str) -> Self {
        Self {
            status,
            parsed: None,
            messages: Vec::new(),
            error: None,
            tx_hash: None,
        }
    }
}

fn snapshot_of(state: &TransferState) -> TransferSnapshot {
    match state {
        TransferState::Idle => TransferSnapshot::bare("idle"),
        TransferState::Parsing => TransferSnapshot::bare("parsing"),
        TransferState::ParseResolved { parsed } => TransferSnapshot {
            parsed: Some(parsed.clone()),
            ..TransferSnapshot::bare("parse_resolved")
        },
        TransferState::ParseUnresolved { messages } => TransferSnapshot {
            messages: messages.clone(),
            ..TransferSnapshot::bare("parse_unresolved")
        },
        TransferState::ParseFailed { reason } => TransferSnapshot {
            error: Some(reason.clone()),
            ..TransferSnapshot::bare("parse_failed")
        },
        TransferState::Signing { parsed } => TransferSnapshot {
            parsed: Some(parsed.clone()),
            ..TransferSnapshot::bare("signing")
        },
        TransferState::Submitted { tx_hash } => TransferSnapshot {
            tx_hash: Some(tx_hash.clone()),
            ..TransferSnapshot::bare("submitted")
        },
        TransferState::SignFailed { parsed, reason } => TransferSnapshot {
            parsed: Some(parsed.clone()),
            error: Some(reason.clone()),
            ..TransferSnapshot::bare("sign_failed")
        },
    }
}

/// Orchestrates the prompt-to-transaction flow behind the two user actions,
/// "parse" and "sign & submit", one state machine per session.
pub struct TransferPipeline {
    parser: ParserClient,
    registry: AssetRegistry,
    driver: SubmissionDriver,
    sessions: Mutex<HashMap<String, Session>>,
}

impl TransferPipeline {
    pub fn new(parser: ParserClient, registry: AssetRegistry, driver: SubmissionDriver) -> Self {
        Self {
            parser,
            registry,
            driver,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.driver.has_provider()
    }

    /// Parse action. A newer parse supersedes the visible result of an
    /// unresolved earlier one (last-write-wins); the stale response is
    /// discarded when it finally arrives.
    pub async fn parse(&self, session_id: &str, prompt: &str) -> Result<TransferSnapshot> {
        if prompt.trim().is_empty() {
            return Err(AppError::EmptyPrompt);
        }

        let my_generation = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.entry(session_id.to_string()).or_default();
            session.generation += 1;
            session.state = TransferState::Parsing;
            session.generation
        };

        // Lock released across the network call
        let outcome = self.parser.parse(prompt).await;

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(session_id.to_string()).or_default();
        if session.generation != my_generation {
            tracing::debug!("Discarding superseded parse result for session {}", session_id);
            return Ok(snapshot_of(&session.state));
        }

        match outcome {
            ParseOutcome::Resolved(parsed) => {
                tracing::info!(
                    "Parse resolved: {} {} to {}",
                    parsed.amount,
                    parsed.currency,
                    parsed.recipient
                );
                session.state = TransferState::ParseResolved { parsed };
                Ok(snapshot_of(&session.state))
            }
            ParseOutcome::Unresolved { messages } => {
                session.state = TransferState::ParseUnresolved { messages };
                Ok(snapshot_of(&session.state))
            }
            ParseOutcome::Failed { reason } => {
                session.state = TransferState::ParseFailed {
                    reason: reason.clone(),
                };
                Err(AppError::ParserUnreachable(reason))
            }
        }
    }

    /// Sign & submit action. Only a resolved parse may be signed; every
    /// other state rejects locally with no network activity, and a pending
    /// signature rejects a second attempt outright.
    pub async fn sign(&self, session_id: &str) -> Result<TransferSnapshot> {
        let (parsed, my_generation) = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.entry(session_id.to_string()).or_default();
            let parsed = match &session.state {
                TransferState::ParseResolved { parsed } => parsed.clone(),
                TransferState::SignFailed { parsed, .. } => parsed.clone(),
                TransferState::Signing { .. } => return Err(AppError::SignInProgress),
                TransferState::Parsing => {
                    return Err(AppError::BadRequest(
                        "A parse is still in progress; wait for it to finish".to_string(),
                    ))
                }
                TransferState::ParseUnresolved { messages } => {
                    let hint = messages.first().cloned().unwrap_or_else(|| {
                        "the parser could not produce a transaction".to_string()
                    });
                    return Err(AppError::UnresolvedPrompt(format!(
                        "clarify the prompt and parse again ({})",
                        hint
                    )));
                }
                TransferState::ParseFailed { reason } => {
                    return Err(AppError::BadRequest(format!(
                        "The last parse failed ({}); parse again before signing",
                        reason
                    )))
                }
                TransferState::Submitted { .. } => {
                    return Err(AppError::BadRequest(
                        "Transaction already submitted; parse a new prompt to start another transfer"
                            .to_string(),
                    ))
                }
                TransferState::Idle => {
                    return Err(AppError::BadRequest(
                        "No parsed transaction data available".to_string(),
                    ))
                }
            };
            session.state = TransferState::Signing {
                parsed: parsed.clone(),
            };
            (parsed, session.generation)
        };

        // Classification and build run before any provider contact, so an
        // unsupported asset or a bad amount never reaches the wallet.
        let strategy = self.registry.classify(&parsed.currency);
        if let TransferStrategy::Unsupported { label } = &strategy {
            let err = AppError::UnsupportedAsset(label.clone());
            self.commit_sign_failure(session_id, my_generation, &parsed, &err.to_string())
                .await;
            return Err(err);
        }

        let request = match tx_builder::build(&strategy, &parsed.recipient, &parsed.amount) {
            Ok(request) => request,
            Err(err) => {
                self.commit_sign_failure(session_id, my_generation, &parsed, &err.to_string())
                    .await;
                return Err(err);
            }
        };

        match self.driver.submit(&request).await {
            Ok(submission) => {
                let mut sessions = self.sessions.lock().await;
                let session = sessions.entry(session_id.to_string()).or_default();
                if session.generation != my_generation {
                    tracing::debug!(
                        "Discarding superseded submission result for session {}",
                        session_id
                    );
                    return Ok(snapshot_of(&session.state));
                }
                session.state = TransferState::Submitted {
                    tx_hash: submission.transaction_handle,
                };
                Ok(snapshot_of(&session.state))
            }
            Err(err) => {
                self.commit_sign_failure(session_id, my_generation, &parsed, &err.to_string())
                    .await;
                Err(err)
            }
        }
    }

    pub async fn state(&self, session_id: &str) -> TransferSnapshot {
        let sessions = self.sessions.lock().await;
        match sessions.get(session_id) {
            Some(session) => snapshot_of(&session.state),
            None => snapshot_of(&TransferState::Idle),
        }
    }

    async fn commit_sign_failure(
        &self,
        session_id: &str,
        my_generation: u64,
        parsed: &ParsedTransfer,
        reason: &str,
    ) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(session_id.to_string()).or_default();
        if session.generation != my_generation {
            tracing::debug!(
                "Discarding superseded sign failure for session {}",
                session_id
            );
            return;
        }
        session.state = TransferState::SignFailed {
            parsed: parsed.clone(),
            reason: reason.to_string(),
        };
    }
}
