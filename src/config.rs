// src/config.rs
//
// Configuration for the flow runner. Every parameter defaults to the
// scripted constants, so a run with no config file reproduces the reference
// sequence exactly.

use crate::aurora::{DEFAULT_AURORA_URL, DEFAULT_FRIENDBOT_URL};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Signature domain separator for the public test network.
pub const DEFAULT_PASSPHRASE: &str = "Diamante Testnet 2024";

// =============================================================================
// Configuration Types
// =============================================================================

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub flow: FlowParams,
}

/// Where to reach the network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Aurora API base URL
    pub aurora_url: String,
    /// Friendbot faucet URL
    pub friendbot_url: String,
    /// Network passphrase mixed into every transaction signature
    pub passphrase: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            aurora_url: DEFAULT_AURORA_URL.to_string(),
            friendbot_url: DEFAULT_FRIENDBOT_URL.to_string(),
            passphrase: DEFAULT_PASSPHRASE.to_string(),
        }
    }
}

/// Parameters of the scripted sequence. Amounts and prices stay as decimal
/// strings until the operations parse them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Code of the custom asset issued during the run
    pub asset_code: String,
    /// Trustline limit granted by the distributor and the buyer
    pub trustline_limit: String,
    /// Units of the custom asset transferred from issuer to distributor
    pub issue_amount: String,
    /// Sell offer: amount of the custom asset offered
    pub sell_amount: String,
    /// Sell offer price, in native units per custom unit
    pub sell_price: String,
    /// Buy offer: amount of the custom asset requested
    pub buy_amount: String,
    /// Buy offer price
    pub buy_price: String,
    /// Strict-send path payment: native amount sent
    pub send_amount: String,
    /// Strict-send path payment: minimum custom amount delivered
    pub dest_min: String,
    /// Strict-receive path payment: maximum native amount spent
    pub send_max: String,
    /// Strict-receive path payment: exact custom amount delivered
    pub dest_amount: String,
    /// Per-transaction submission timeout in seconds, mirrored into the
    /// transaction time bounds
    pub tx_timeout_secs: u64,
    /// Liquidity pool id (64-char hex). The pool deposit/withdraw steps run
    /// only when this is set.
    pub liquidity_pool_id: Option<String>,
    /// Pool deposit: maximum amounts of the two pool assets
    pub pool_max_a: String,
    pub pool_max_b: String,
    /// Pool deposit: accepted price range
    pub pool_min_price: String,
    pub pool_max_price: String,
    /// Pool withdraw: shares burned and minimum amounts received
    pub pool_withdraw_shares: String,
    pub pool_min_a: String,
    pub pool_min_b: String,
}

impl Default for FlowParams {
    fn default() -> Self {
        FlowParams {
            asset_code: "TradeToken".to_string(),
            trustline_limit: "1000".to_string(),
            issue_amount: "500".to_string(),
            sell_amount: "100".to_string(),
            sell_price: "0.5".to_string(),
            buy_amount: "10".to_string(),
            buy_price: "0.5".to_string(),
            send_amount: "10".to_string(),
            dest_min: "5".to_string(),
            send_max: "15".to_string(),
            dest_amount: "10".to_string(),
            tx_timeout_secs: 100,
            liquidity_pool_id: None,
            pool_max_a: "50".to_string(),
            pool_max_b: "100".to_string(),
            pool_min_price: "0.5".to_string(),
            pool_max_price: "2".to_string(),
            pool_withdraw_shares: "10".to_string(),
            pool_min_a: "10".to_string(),
            pool_min_b: "20".to_string(),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents =
            fs::read_to_string(&path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("Failed to parse config: {}", e))
    }
}

/// Template emitted by --generate-config.
pub fn default_config_template() -> &'static str {
    r#"# diam-dex-flow configuration
# Every value shown here is the built-in default; delete anything you do not
# want to override.

[network]
aurora_url = "https://diamtestnet.diamcircle.io/"
friendbot_url = "https://friendbot.diamcircle.io"
passphrase = "Diamante Testnet 2024"

[flow]
asset_code = "TradeToken"
trustline_limit = "1000"
issue_amount = "500"
sell_amount = "100"
sell_price = "0.5"
buy_amount = "10"
buy_price = "0.5"
send_amount = "10"
dest_min = "5"
send_max = "15"
dest_amount = "10"
tx_timeout_secs = 100

# The pool steps run only when a real pool id is configured.
# liquidity_pool_id = "0000000000000000000000000000000000000000000000000000000000000000"
pool_max_a = "50"
pool_max_b = "100"
pool_min_price = "0.5"
pool_max_price = "2"
pool_withdraw_shares = "10"
pool_min_a = "10"
pool_min_b = "20"
"#
}

// =============================================================================
// Tests
// =============================================================================
