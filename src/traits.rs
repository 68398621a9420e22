// src/traits.rs

use crate::aurora::AuroraError;
use crate::models::{AccountSnapshot, SubmitResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// The surface of the hosted ledger the flow depends on.
/// Implementations should be Send + Sync so one client can be shared across
/// the whole run.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Requests test-network funds for the given public key.
    async fn fund_account(&self, public_key: &str) -> Result<(), AuroraError>;

    /// Loads a fresh account snapshot (sequence number and balances).
    async fn load_account(&self, account_id: &str) -> Result<AccountSnapshot, AuroraError>;

    /// Submits a signed base64 transaction envelope.
    async fn submit_transaction(&self, envelope: &str) -> Result<SubmitResponse, AuroraError>;
}

/// Wrapper to share one ledger client across the run.
pub type SharedLedger = Arc<dyn Ledger>;
