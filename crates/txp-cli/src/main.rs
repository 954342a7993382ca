//! # txp
//!
//! Prepares a transaction request against a node and prints the
//! submission envelope.
//!
//! ```text
//! txp prepare --request transfer.json --rpc-url http://127.0.0.1:8888 --pretty
//! ```
//!
//! Configuration comes from `TXP_*` environment variables, overridden by
//! flags.

mod logging;
mod request;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use tx_preparation::{
    HttpChainClient, PreparationConfig, TransactionPreparationApi, TransactionPreparer,
};

use crate::request::TransactionRequest;

/// Transaction preparation tool
#[derive(Parser, Debug)]
#[command(name = "txp", version)]
#[command(about = "Prepare ledger transactions for submission")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve, encode and pack a transaction request
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// Transaction request JSON file, `-` for stdin
    #[arg(short, long, default_value = "-")]
    request: String,

    /// Node endpoint (overrides TXP_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Reference block distance from head (overrides TXP_BLOCKS_BEHIND)
    #[arg(long)]
    blocks_behind: Option<u64>,

    /// Expiration window in seconds (overrides TXP_EXPIRE_SECONDS)
    #[arg(long)]
    expire_seconds: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Also print the prepared transaction before the envelope
    #[arg(long)]
    print_transaction: bool,
}

impl PrepareArgs {
    fn config(&self) -> PreparationConfig {
        let mut config = PreparationConfig::from_env();
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(blocks_behind) = self.blocks_behind {
            config.tapos.blocks_behind = blocks_behind;
        }
        if let Some(expire_seconds) = self.expire_seconds {
            config.tapos.expire_seconds = expire_seconds;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Prepare(args) => prepare(args).await,
    }
}

async fn prepare(args: PrepareArgs) -> Result<()> {
    let config = args.config();
    let request = TransactionRequest::from_json(&read_input(&args.request)?)?;

    info!("Preparing against {}", config.rpc_url);
    let client =
        Arc::new(HttpChainClient::from_config(&config).context("Failed to create node client")?);
    let preparer = TransactionPreparer::new(config)
        .with_chain_provider(client.clone())
        .with_encoder(client);

    let mut tx = request.into_transaction(preparer.new_transaction());
    let envelope = preparer
        .prepare_submission_envelope(&mut tx)
        .await
        .context("Failed to prepare transaction")?;

    if args.print_transaction {
        println!("{}", tx.to_json(args.pretty)?);
    }
    let output = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{}", output);

    info!("Transaction id {}", envelope.transaction_id()?);
    Ok(())
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read request from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}
