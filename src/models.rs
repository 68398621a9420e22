// src/models.rs
//
// The shared nouns: wire types for the Aurora API and the per-step outcome
// records the flow produces.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Account records
// =============================================================================

/// Raw account record as returned by GET /accounts/{id}.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    /// Sequence numbers are int64 but arrive as JSON strings.
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

/// One balance line of an account: the native balance or a trustline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub balance: String,
    pub asset_type: String,
    pub asset_code: Option<String>,
    pub asset_issuer: Option<String>,
    pub limit: Option<String>,
}

/// Account state used to build exactly one transaction. Sequence numbers are
/// single-use and enforced by the network, so a fresh snapshot is loaded
/// before every build.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub sequence: i64,
    pub balances: Vec<Balance>,
}

impl AccountRecord {
    pub fn into_snapshot(self) -> Result<AccountSnapshot, String> {
        let sequence = self.sequence.parse::<i64>().map_err(|_| {
            format!(
                "account {} has malformed sequence {:?}",
                self.account_id, self.sequence
            )
        })?;
        Ok(AccountSnapshot {
            account_id: self.account_id,
            sequence,
            balances: self.balances,
        })
    }
}

// =============================================================================
// Submission responses
// =============================================================================

/// Successful transaction submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    pub ledger: Option<u64>,
    pub successful: Option<bool>,
}

/// problem+json document the API returns on rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDocument {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub extras: Option<TxFailureExtras>,
}

/// Structured failure payload attached to rejected submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxFailureExtras {
    pub result_codes: Option<ResultCodes>,
    pub result_xdr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCodes {
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx: {}", self.transaction.as_deref().unwrap_or("?"))?;
        if !self.operations.is_empty() {
            write!(f, ", ops: {}", self.operations.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ProblemDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title.as_deref().unwrap_or("transaction failed"))?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(codes) = self.extras.as_ref().and_then(|e| e.result_codes.as_ref()) {
            write!(f, " [{}]", codes)?;
        }
        Ok(())
    }
}

// =============================================================================
// Flow step outcomes
// =============================================================================

/// What happened to one scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step finished; submission steps carry the transaction hash.
    Completed { tx_hash: Option<String> },
    /// The step failed and the run moved on.
    Failed { error: String },
    /// The step was not applicable for this run.
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: String,
    pub outcome: StepOutcome,
}

// =============================================================================
// Tests
// =============================================================================
