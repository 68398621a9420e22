// src/flow.rs
//
// The scripted DEX sequence: fund, trust, issue, offer, and path-pay against
// the test network. Each step loads a fresh account snapshot, submits one
// transaction, and logs its own outcome; a failed step never halts the run.

use crate::config::FlowParams;
use crate::keys::Keypair;
use crate::models::{StepOutcome, StepReport, SubmitResponse};
use crate::traits::SharedLedger;
use crate::tx::{Asset, Operation, TransactionBuilder};
use log::{error, info};

/// One full run of the scripted sequence, with three throwaway accounts:
/// the asset issuer, the distributor it pays, and a buyer taking the other
/// side of the book.
pub struct DexFlow {
    ledger: SharedLedger,
    network_passphrase: String,
    params: FlowParams,
    issuer: Keypair,
    distributor: Keypair,
    buyer: Keypair,
    token: Asset,
    reports: Vec<StepReport>,
}

impl DexFlow {
    pub fn new(
        ledger: SharedLedger,
        network_passphrase: &str,
        params: FlowParams,
    ) -> Result<Self, String> {
        let issuer = Keypair::random();
        let distributor = Keypair::random();
        let buyer = Keypair::random();
        let token = Asset::new(&params.asset_code, &issuer.public_key())?;
        Ok(DexFlow {
            ledger,
            network_passphrase: network_passphrase.to_string(),
            params,
            issuer,
            distributor,
            buyer,
            token,
            reports: Vec::new(),
        })
    }

    pub fn issuer_public_key(&self) -> String {
        self.issuer.public_key()
    }

    pub fn distributor_public_key(&self) -> String {
        self.distributor.public_key()
    }

    pub fn buyer_public_key(&self) -> String {
        self.buyer.public_key()
    }

    /// Runs the whole sequence and returns the per-step outcome report.
    /// Never errors: every step captures its own failure, so the final log
    /// line is reached no matter what broke upstream.
    pub async fn run(mut self) -> Vec<StepReport> {
        let issuer_pk = self.issuer.public_key();
        let distributor_pk = self.distributor.public_key();
        let distributor_secret = self.distributor.secret();

        self.fund_account("fund issuer", &issuer_pk).await;
        self.fund_account("fund distributor", &distributor_pk).await;
        self.establish_trustline("establish distributor trustline", &distributor_secret)
            .await;
        self.issue_asset().await;
        self.create_sell_offer().await;
        self.create_buy_offer().await;
        self.path_payment_strict_send().await;
        self.path_payment_strict_receive().await;
        self.liquidity_pool_steps().await;

        info!("DEX flow executed.");
        self.reports
    }

    // =========================================================================
    // Steps
    // =========================================================================

    async fn fund_account(&mut self, step: &str, public_key: &str) {
        match self.ledger.fund_account(public_key).await {
            Ok(()) => {
                info!("Account {} funded.", public_key);
                self.record(step, StepOutcome::Completed { tx_hash: None });
            }
            Err(e) => {
                error!("Error funding account {}: {}", public_key, e);
                self.record(step, StepOutcome::Failed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Grants the account behind `secret` a trustline for the custom asset,
    /// up to the configured limit.
    async fn establish_trustline(&mut self, step: &str, secret: &str) {
        match self.try_establish_trustline(secret).await {
            Ok((public_key, response)) => {
                info!(
                    "Trustline established for {}. Transaction hash: {}",
                    public_key, response.hash
                );
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error establishing trustline: {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_establish_trustline(
        &self,
        secret: &str,
    ) -> Result<(String, SubmitResponse), String> {
        let account = Keypair::from_secret(secret)?;
        let op = Operation::change_trust(self.token.clone(), &self.params.trustline_limit)?;
        let response = self.submit_as(&account, op).await?;
        Ok((account.public_key(), response))
    }

    /// Moves the initial supply of the custom asset from issuer to
    /// distributor.
    async fn issue_asset(&mut self) {
        let step = "issue asset";
        match self.try_issue_asset().await {
            Ok(response) => {
                info!(
                    "Asset issued to distributor. Transaction hash: {}",
                    response.hash
                );
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error issuing asset: {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_issue_asset(&self) -> Result<SubmitResponse, String> {
        let op = Operation::payment(
            &self.distributor.public_key(),
            self.token.clone(),
            &self.params.issue_amount,
        )?;
        self.submit_as(&self.issuer, op).await
    }

    async fn create_sell_offer(&mut self) {
        let step = "create sell offer";
        match self.try_create_sell_offer().await {
            Ok(response) => {
                info!("Sell offer created. Transaction hash: {}", response.hash);
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error creating sell offer: {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_create_sell_offer(&self) -> Result<SubmitResponse, String> {
        let op = Operation::manage_sell_offer(
            self.token.clone(),
            Asset::native(),
            &self.params.sell_amount,
            &self.params.sell_price,
            0,
        )?;
        self.submit_as(&self.distributor, op).await
    }

    /// The buyer is funded and trusted lazily, right before its first use.
    async fn create_buy_offer(&mut self) {
        let buyer_pk = self.buyer.public_key();
        let buyer_secret = self.buyer.secret();
        self.fund_account("fund buyer", &buyer_pk).await;
        self.establish_trustline("establish buyer trustline", &buyer_secret)
            .await;

        let step = "create buy offer";
        match self.try_create_buy_offer().await {
            Ok(response) => {
                info!("Buy offer created. Transaction hash: {}", response.hash);
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error creating buy offer: {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_create_buy_offer(&self) -> Result<SubmitResponse, String> {
        let op = Operation::manage_buy_offer(
            Asset::native(),
            self.token.clone(),
            &self.params.buy_amount,
            &self.params.buy_price,
            0,
        )?;
        self.submit_as(&self.buyer, op).await
    }

    async fn path_payment_strict_send(&mut self) {
        let step = "path payment strict send";
        match self.try_path_payment_strict_send().await {
            Ok(response) => {
                info!(
                    "Path payment (strict send) executed. Transaction hash: {}",
                    response.hash
                );
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error during path payment (strict send): {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_path_payment_strict_send(&self) -> Result<SubmitResponse, String> {
        let op = Operation::path_payment_strict_send(
            Asset::native(),
            &self.params.send_amount,
            &self.distributor.public_key(),
            self.token.clone(),
            &self.params.dest_min,
            vec![Asset::native(), self.token.clone()],
        )?;
        self.submit_as(&self.buyer, op).await
    }

    async fn path_payment_strict_receive(&mut self) {
        let step = "path payment strict receive";
        match self.try_path_payment_strict_receive().await {
            Ok(response) => {
                info!(
                    "Path payment (strict receive) executed. Transaction hash: {}",
                    response.hash
                );
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error during path payment (strict receive): {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_path_payment_strict_receive(&self) -> Result<SubmitResponse, String> {
        let op = Operation::path_payment_strict_receive(
            Asset::native(),
            &self.params.send_max,
            &self.distributor.public_key(),
            self.token.clone(),
            &self.params.dest_amount,
            vec![Asset::native(), self.token.clone()],
        )?;
        self.submit_as(&self.buyer, op).await
    }

    /// Pool deposit and withdraw need a real pool on the network; without a
    /// configured pool id they are recorded as skipped.
    async fn liquidity_pool_steps(&mut self) {
        let pool_id = match &self.params.liquidity_pool_id {
            Some(id) => id.clone(),
            None => {
                info!("No liquidity pool id configured; skipping pool steps.");
                for step in ["liquidity pool deposit", "liquidity pool withdraw"] {
                    self.record(step, StepOutcome::Skipped {
                        reason: "no pool id configured".to_string(),
                    });
                }
                return;
            }
        };

        let step = "liquidity pool deposit";
        match self.try_liquidity_pool_deposit(&pool_id).await {
            Ok(response) => {
                info!("Liquidity deposited. Transaction hash: {}", response.hash);
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error during liquidity pool deposit: {}", e);
                self.record_failure(step, e);
            }
        }

        let step = "liquidity pool withdraw";
        match self.try_liquidity_pool_withdraw(&pool_id).await {
            Ok(response) => {
                info!("Liquidity withdrawn. Transaction hash: {}", response.hash);
                self.record_success(step, response);
            }
            Err(e) => {
                error!("Error during liquidity pool withdrawal: {}", e);
                self.record_failure(step, e);
            }
        }
    }

    async fn try_liquidity_pool_deposit(&self, pool_id: &str) -> Result<SubmitResponse, String> {
        let op = Operation::liquidity_pool_deposit(
            pool_id,
            &self.params.pool_max_a,
            &self.params.pool_max_b,
            &self.params.pool_min_price,
            &self.params.pool_max_price,
        )?;
        self.submit_as(&self.distributor, op).await
    }

    async fn try_liquidity_pool_withdraw(&self, pool_id: &str) -> Result<SubmitResponse, String> {
        let op = Operation::liquidity_pool_withdraw(
            pool_id,
            &self.params.pool_withdraw_shares,
            &self.params.pool_min_a,
            &self.params.pool_min_b,
        )?;
        self.submit_as(&self.distributor, op).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Loads a fresh snapshot for the signer, builds a single-operation
    /// transaction against it, signs, and submits. Each call starts from its
    /// own load so the sequence number is never reused.
    async fn submit_as(&self, signer: &Keypair, op: Operation) -> Result<SubmitResponse, String> {
        let snapshot = self
            .ledger
            .load_account(&signer.public_key())
            .await
            .map_err(|e| e.to_string())?;
        let tx = TransactionBuilder::new(&snapshot, &self.network_passphrase)
            .add_operation(op)
            .set_timeout(self.params.tx_timeout_secs)
            .build()?;
        let signed = tx.sign(signer)?;
        let envelope = signed.to_envelope_base64()?;
        self.ledger
            .submit_transaction(&envelope)
            .await
            .map_err(|e| e.to_string())
    }

    fn record(&mut self, step: &str, outcome: StepOutcome) {
        self.reports.push(StepReport {
            step: step.to_string(),
            outcome,
        });
    }

    fn record_success(&mut self, step: &str, response: SubmitResponse) {
        self.record(step, StepOutcome::Completed {
            tx_hash: Some(response.hash),
        });
    }

    fn record_failure(&mut self, step: &str, error: String) {
        self.record(step, StepOutcome::Failed { error });
    }
}
