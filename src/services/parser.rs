use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{ParseOutcome, ParsedTransfer},
    utils::truncate_reason,
};

/// Client for the remote natural-language transaction parser.
#[derive(Debug, Clone)]
pub struct ParserClient {
    http: reqwest::Client,
    endpoint: String,
}

/// Wire shape of the parser response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserPayload {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub parsed: Option<RawParsed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParsed {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

impl ParserClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build parser HTTP client: {}", e)))?;
        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.parser_api_url.clone(),
            Duration::from_secs(config.parser_timeout_secs),
        )
    }

    /// One request, no retries; retry policy belongs to the caller.
    ///
    /// Transport and service faults come back as `ParseOutcome::Failed` so
    /// the orchestrator can distinguish them from an unresolved prompt.
    pub async fn parse(&self, prompt: &str) -> ParseOutcome {
        if prompt.trim().is_empty() {
            return ParseOutcome::Failed {
                reason: "Prompt must not be empty".to_string(),
            };
        }

        let response = match self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Parser request failed: {}", e);
                return ParseOutcome::Failed {
                    reason: truncate_reason(&e.to_string()),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = if body.trim().is_empty() {
                status.to_string()
            } else {
                truncate_reason(&body)
            };
            tracing::warn!("Parser returned {}: {}", status, reason);
            return ParseOutcome::Failed { reason };
        }

        match response.json::<ParserPayload>().await {
            Ok(payload) => outcome_from_payload(payload),
            Err(e) => ParseOutcome::Failed {
                reason: truncate_reason(&format!("Malformed parser response: {}", e)),
            },
        }
    }
}

/// Pure mapping from the wire payload to a parse outcome. A transaction is
/// resolved only when `parsed` carries all three non-empty fields; anything
/// else is a clarification request.
pub fn outcome_from_payload(payload: ParserPayload) -> ParseOutcome {
    if let Some(parsed) = payload.parsed {
        let amount = parsed.amount.unwrap_or_default();
        let currency = parsed.currency.unwrap_or_default();
        let recipient = parsed.recipient.unwrap_or_default();
        if !amount.trim().is_empty() && !currency.trim().is_empty() && !recipient.trim().is_empty()
        {
            return ParseOutcome::Resolved(ParsedTransfer {
                amount,
                currency,
                recipient,
            });
        }
    }
    if !payload.done {
        tracing::debug!(
            "Parser asked for clarification ({} messages)",
            payload.messages.len()
        );
    }
    ParseOutcome::Unresolved {
        messages: payload.messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_json(raw: &str) -> ParserPayload {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn outcome_resolves_complete_parse() {
        let payload = payload_json(
            r#"{"done":true,"messages":[],"parsed":{"amount":"0.1","currency":"ETH","recipient":"0xABCD1234"}}"#,
        );
        let outcome = outcome_from_payload(payload);
        assert_eq!(
            outcome,
            ParseOutcome::Resolved(ParsedTransfer {
                amount: "0.1".to_string(),
                currency: "ETH".to_string(),
                recipient: "0xABCD1234".to_string(),
            })
        );
    }

    #[test]
    fn outcome_unresolved_when_parsed_is_null() {
        let payload =
            payload_json(r#"{"done":false,"messages":["Which recipient?"],"parsed":null}"#);
        let outcome = outcome_from_payload(payload);
        assert_eq!(
            outcome,
            ParseOutcome::Unresolved {
                messages: vec!["Which recipient?".to_string()],
            }
        );
    }

    #[test]
    fn outcome_unresolved_when_parsed_is_incomplete() {
        // A parsed object missing the recipient cannot produce a transaction
        let payload = payload_json(
            r#"{"done":true,"messages":[],"parsed":{"amount":"1","currency":"ETH"}}"#,
        );
        let outcome = outcome_from_payload(payload);
        assert_eq!(outcome, ParseOutcome::Unresolved { messages: vec![] });
    }

    #[test]
    fn outcome_unresolved_with_empty_messages() {
        let payload = payload_json(r#"{"done":false,"messages":[],"parsed":null}"#);
        let outcome = outcome_from_payload(payload);
        assert_eq!(outcome, ParseOutcome::Unresolved { messages: vec![] });
    }

    #[tokio::test]
    async fn empty_prompt_fails_without_network() {
        // Port 1 is never listening; an attempted request would error with a
        // connect failure, not the empty-prompt message.
        let client = ParserClient::new(
            "http://127.0.0.1:1/agent".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        let outcome = client.parse("   ").await;
        assert_eq!(
            outcome,
            ParseOutcome::Failed {
                reason: "Prompt must not be empty".to_string(),
            }
        );
    }
}
