// src/main.rs
//
// CLI entry point: resolves configuration, wires the Aurora client, and runs
// the scripted DEX flow against the test network.

use clap::Parser;
use diam_dex_flow::aurora::AuroraClient;
use diam_dex_flow::config::{default_config_template, Config};
use diam_dex_flow::flow::DexFlow;
use diam_dex_flow::models::StepOutcome;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "diam-dex-flow")]
#[command(about = "Scripted DEX trading flow against the Diamante test network")]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(long, short)]
    config: Option<String>,

    /// Generate a default configuration file
    #[arg(long)]
    generate_config: bool,

    /// Override the Aurora API base URL
    #[arg(long)]
    aurora_url: Option<String>,

    /// Override the Friendbot faucet URL
    #[arg(long)]
    friendbot_url: Option<String>,

    /// Liquidity pool id (64-char hex); enables the pool deposit/withdraw steps
    #[arg(long)]
    pool_id: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.generate_config {
        println!("{}", default_config_template());
        return;
    }

    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                eprintln!("Use --generate-config to create a template.");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Some(url) = args.aurora_url {
        config.network.aurora_url = url;
    }
    if let Some(url) = args.friendbot_url {
        config.network.friendbot_url = url;
    }
    if let Some(pool_id) = args.pool_id {
        config.flow.liquidity_pool_id = Some(pool_id);
    }

    let ledger = Arc::new(AuroraClient::new(
        &config.network.aurora_url,
        &config.network.friendbot_url,
    ));

    let flow = match DexFlow::new(ledger, &config.network.passphrase, config.flow) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to set up flow: {}", e);
            std::process::exit(1);
        }
    };

    println!("Issuer Public Key: {}", flow.issuer_public_key());
    println!("Distributor Public Key: {}", flow.distributor_public_key());
    println!("Buyer Public Key: {}", flow.buyer_public_key());

    let reports = flow.run().await;

    println!();
    println!("Flow summary:");
    for report in &reports {
        match &report.outcome {
            StepOutcome::Completed { tx_hash: Some(hash) } => {
                println!("  {:<32} ok    {}", report.step, hash)
            }
            StepOutcome::Completed { tx_hash: None } => {
                println!("  {:<32} ok", report.step)
            }
            StepOutcome::Failed { error } => {
                println!("  {:<32} FAIL  {}", report.step, error)
            }
            StepOutcome::Skipped { reason } => {
                println!("  {:<32} skip  {}", report.step, reason)
            }
        }
    }
}
