// src/aurora.rs
//
// HTTP client for the hosted Aurora API and the Friendbot faucet.
// Owns the error taxonomy for everything that can go wrong on the wire.

use crate::models::{AccountRecord, AccountSnapshot, ProblemDocument, SubmitResponse};
use crate::traits::Ledger;
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AURORA_URL: &str = "https://diamtestnet.diamcircle.io/";
pub const DEFAULT_FRIENDBOT_URL: &str = "https://friendbot.diamcircle.io";

const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AuroraError {
    /// The request never produced a usable HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Friendbot refused to fund the account.
    #[error("faucet rejected funding for {address}: {status}")]
    Faucet {
        address: String,
        status: reqwest::StatusCode,
    },

    /// The account does not exist on the network (yet).
    #[error("account {0} not found")]
    AccountNotFound(String),

    /// The network rejected a submitted transaction. Carries the structured
    /// result codes when the API provided them.
    #[error("transaction rejected: {0}")]
    TransactionRejected(ProblemDocument),

    /// Anything the API returned that we could not make sense of.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

/// Client for one Aurora deployment plus its faucet.
pub struct AuroraClient {
    http_client: reqwest::Client,
    base_url: String,
    friendbot_url: String,
}

impl AuroraClient {
    pub fn new(aurora_url: &str, friendbot_url: &str) -> Self {
        AuroraClient {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: aurora_url.trim_end_matches('/').to_string(),
            friendbot_url: friendbot_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client wired to the public test-network endpoints.
    pub fn testnet() -> Self {
        Self::new(DEFAULT_AURORA_URL, DEFAULT_FRIENDBOT_URL)
    }
}

#[async_trait]
impl Ledger for AuroraClient {
    async fn fund_account(&self, public_key: &str) -> Result<(), AuroraError> {
        let url = format!("{}?addr={}", self.friendbot_url, public_key);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AuroraError::Faucet {
                address: public_key.to_string(),
                status: response.status(),
            });
        }
        debug!("Friendbot funded {}", public_key);
        Ok(())
    }

    async fn load_account(&self, account_id: &str) -> Result<AccountSnapshot, AuroraError> {
        let url = format!("{}/accounts/{}", self.base_url, account_id);
        let response = self.http_client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AuroraError::AccountNotFound(account_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(AuroraError::Malformed(format!(
                "account load returned {}",
                response.status()
            )));
        }
        let record: AccountRecord = response
            .json()
            .await
            .map_err(|e| AuroraError::Malformed(format!("bad account record: {}", e)))?;
        debug!(
            "Loaded account {} at sequence {}",
            record.account_id, record.sequence
        );
        record.into_snapshot().map_err(AuroraError::Malformed)
    }

    async fn submit_transaction(&self, envelope: &str) -> Result<SubmitResponse, AuroraError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .form(&[("tx", envelope)])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuroraError::Malformed(format!("bad submit response: {}", e)));
        }
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ProblemDocument>(&body) {
            Ok(problem) => Err(AuroraError::TransactionRejected(problem)),
            Err(_) => {
                warn!("Submission returned {} with an unparseable body", status);
                Err(AuroraError::Malformed(format!(
                    "submission returned {}: {}",
                    status, body
                )))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AuroraClient {
        AuroraClient::new(&server.uri(), &server.uri())
    }

    #[tokio::test]
    async fn test_fund_account_hits_the_faucet() {
        let server = MockServer::start().await;
        let public_key = Keypair::random().public_key();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("addr", public_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hash": "00"})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).fund_account(&public_key).await.unwrap();
    }

    #[tokio::test]
    async fn test_fund_account_faucet_rejection() {
        let server = MockServer::start().await;
        let public_key = Keypair::random().public_key();

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fund_account(&public_key)
            .await
            .unwrap_err();
        match err {
            AuroraError::Faucet { address, status } => {
                assert_eq!(address, public_key);
                assert_eq!(status.as_u16(), 400);
            }
            other => panic!("expected faucet error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_account_parses_snapshot() {
        let server = MockServer::start().await;
        let public_key = Keypair::random().public_key();

        Mock::given(method("GET"))
            .and(path(format!("/accounts/{}", public_key)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "account_id": public_key,
                "sequence": "88",
                "balances": [{"balance": "10000.0000000", "asset_type": "native"}]
            })))
            .mount(&server)
            .await;

        let snapshot = client_for(&server).load_account(&public_key).await.unwrap();
        assert_eq!(snapshot.account_id, public_key);
        assert_eq!(snapshot.sequence, 88);
        assert_eq!(snapshot.balances.len(), 1);
    }

    #[tokio::test]
    async fn test_load_account_not_found() {
        let server = MockServer::start().await;
        let public_key = Keypair::random().public_key();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "title": "Resource Missing",
                "status": 404
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .load_account(&public_key)
            .await
            .unwrap_err();
        assert!(matches!(err, AuroraError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_submit_transaction_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions"))
            .and(body_string_contains("tx="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": "deadbeef",
                "ledger": 123,
                "successful": true
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .submit_transaction("AAAA")
            .await
            .unwrap();
        assert_eq!(response.hash, "deadbeef");
        assert_eq!(response.ledger, Some(123));
    }

    #[tokio::test]
    async fn test_submit_transaction_rejection_keeps_result_codes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "title": "Transaction Failed",
                "status": 400,
                "extras": {
                    "result_codes": {
                        "transaction": "tx_failed",
                        "operations": ["op_underfunded"]
                    }
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_transaction("AAAA")
            .await
            .unwrap_err();
        match err {
            AuroraError::TransactionRejected(problem) => {
                let codes = problem.extras.unwrap().result_codes.unwrap();
                assert_eq!(codes.transaction.as_deref(), Some("tx_failed"));
                assert_eq!(codes.operations, vec!["op_underfunded"]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_transaction_unparseable_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transactions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .submit_transaction("AAAA")
            .await
            .unwrap_err();
        match err {
            AuroraError::Malformed(message) => assert!(message.contains("gateway exploded")),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }
}
