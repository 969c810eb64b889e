use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use pairswap_core::{KeyPair, Transaction};
use pairswap_vm::Router;
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod config;
mod node;
mod txgen;

use cli::{Cli, Commands, QuoteCommands};
use config::{generate_sample_config, NodeConfig};
use node::Node;
use txgen::parse_address;

/// A transaction file holds one transaction or an ordered batch
#[derive(Deserialize)]
#[serde(untagged)]
enum TxFile {
    Batch(Vec<Transaction>),
    Single(Box<Transaction>),
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            init_config(&output)?;
        }
        Commands::Keygen { output } => {
            generate_keypair(output)?;
        }
        Commands::Apply { config, file } => {
            apply_transactions(&config, &file)?;
        }
        Commands::Pool {
            config,
            token_x,
            token_y,
        } => {
            show_pool(&config, &token_x, &token_y)?;
        }
        Commands::Quote { config, command } => {
            quote(&config, command)?;
        }
        Commands::Txgen { command } => {
            txgen::handle_txgen(command)?;
        }
    }

    Ok(())
}

/// Initialize a new configuration file
fn init_config(output: &Path) -> Result<()> {
    info!("Generating sample configuration");

    let (config, user) = generate_sample_config();
    config.save(output)?;
    let genesis = config.to_genesis_config()?;

    info!("Configuration saved to {:?}", output);

    println!("\nConfiguration file created: {}", output.display());
    println!("Funded user:");
    println!("  Address:     {}", user.address);
    println!("  Secret key:  {}", user.secret.to_hex());
    println!("Genesis tokens:");
    for token in &genesis.tokens {
        let meta = token.meta();
        println!("  {:<6} {}", meta.symbol, meta.token_id);
    }
    println!("Router:         {}", genesis.router_address());
    println!("Wrapped native: {}", genesis.wrapped_native_address());
    println!("\nTo apply a transaction, run:");
    println!("  pairswap apply --config {} --file tx.json", output.display());

    Ok(())
}

/// Generate a new keypair
fn generate_keypair(output: Option<PathBuf>) -> Result<()> {
    let keypair = KeyPair::generate();

    println!("Generated new keypair:");
    println!("  Address:     {}", keypair.address);
    println!("  Secret key:  {}", keypair.secret.to_hex());

    if let Some(path) = output {
        std::fs::write(&path, keypair.secret.to_hex())?;
        info!("Secret key saved to {:?}", path);
    }

    println!("\nWARNING: Keep your secret key safe! Do not share it with anyone.");

    Ok(())
}

/// Execute a transaction file and persist the result
fn apply_transactions(config_path: &Path, file: &Path) -> Result<()> {
    let config = NodeConfig::load(config_path)?;
    let content = std::fs::read_to_string(file)?;
    let txs = match serde_json::from_str::<TxFile>(&content)? {
        TxFile::Batch(txs) => txs,
        TxFile::Single(tx) => vec![*tx],
    };

    let mut node = Node::open(config)?;
    info!(
        "Applying {} transactions to {:?}",
        txs.len(),
        node.config().data_dir
    );
    let results = node.apply(&txs)?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

fn show_pool(config_path: &Path, token_x: &str, token_y: &str) -> Result<()> {
    let node = Node::open(NodeConfig::load(config_path)?)?;
    let token_x = parse_address(token_x)?;
    let token_y = parse_address(token_y)?;

    match node.pool_summary(&token_x, &token_y)? {
        Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
        None => {
            println!("No pool for this pair yet.");
            println!(
                "It will be created at {} by the first deposit.",
                Router::predicted_pool_address(&token_x, &token_y)
            );
        }
    }

    Ok(())
}

fn quote(config_path: &Path, command: QuoteCommands) -> Result<()> {
    let node = Node::open(NodeConfig::load(config_path)?)?;
    let router = node.router();

    match command {
        QuoteCommands::Out {
            token_in,
            token_out,
            amount_in,
        } => {
            let amount_out = router.get_out_amount(
                node.state(),
                &parse_address(&token_in)?,
                &parse_address(&token_out)?,
                amount_in,
            )?;
            println!("{} in -> {} out", amount_in, amount_out);
        }
        QuoteCommands::In {
            token_in,
            token_out,
            amount_out,
        } => {
            let amount_in = router.get_in_amount(
                node.state(),
                &parse_address(&token_in)?,
                &parse_address(&token_out)?,
                amount_out,
            )?;
            println!("{} in -> {} out", amount_in, amount_out);
        }
    }

    Ok(())
}
