use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Pairswap - A constant-product exchange
#[derive(Parser)]
#[command(name = "pairswap")]
#[command(about = "Pairswap exchange node and utilities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new node configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Generate a new keypair
    Keygen {
        /// Output file for secret key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Execute a transaction file against the node's state
    Apply {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Transaction JSON file (one transaction or an array)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the pool for a token pair
    Pool {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// First token address hex
        #[arg(long)]
        token_x: String,

        /// Second token address hex
        #[arg(long)]
        token_y: String,
    },

    /// Quote a swap against live reserves (fee excluded)
    Quote {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        #[command(subcommand)]
        command: QuoteCommands,
    },

    /// Generate signed transactions
    Txgen {
        #[command(subcommand)]
        command: TxGenCommands,
    },
}

#[derive(Subcommand)]
pub enum QuoteCommands {
    /// Output received for an exact input
    Out {
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        amount_in: u64,
    },

    /// Input required for an exact output
    In {
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        amount_out: u64,
    },
}

/// Signing and output options shared by every txgen command
#[derive(Args)]
pub struct SignArgs {
    /// Sender secret key hex
    #[arg(long)]
    pub from_secret: String,
    /// Transaction nonce (account nonce + 1)
    #[arg(long)]
    pub nonce: u64,
    /// Output file (JSON)
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Subcommand)]
pub enum TxGenCommands {
    /// Create a native TRANSFER transaction
    Transfer {
        #[command(flatten)]
        sign: SignArgs,
        /// Recipient address hex
        #[arg(long)]
        to: String,
        /// Amount to send
        #[arg(long)]
        amount: u64,
    },

    /// Create a TOKEN_CREATE transaction
    TokenCreate {
        #[command(flatten)]
        sign: SignArgs,
        /// Token name
        #[arg(long)]
        name: String,
        /// Token symbol
        #[arg(long)]
        symbol: String,
        /// Decimals
        #[arg(long, default_value_t = 6)]
        decimals: u8,
        /// Total supply, credited to the sender
        #[arg(long)]
        total_supply: u64,
    },

    /// Create a TOKEN_TRANSFER transaction
    TokenTransfer {
        #[command(flatten)]
        sign: SignArgs,
        /// Token address hex
        #[arg(long)]
        token: String,
        /// Recipient address hex
        #[arg(long)]
        to: String,
        /// Amount to send
        #[arg(long)]
        amount: u64,
    },

    /// Create an APPROVE transaction
    Approve {
        #[command(flatten)]
        sign: SignArgs,
        /// Token address hex
        #[arg(long)]
        token: String,
        /// Spender address hex (a pool, or the router for unwrapping)
        #[arg(long)]
        spender: String,
        /// Allowance
        #[arg(long)]
        amount: u64,
    },

    /// Create a DEPOSIT transaction
    Deposit {
        #[command(flatten)]
        sign: SignArgs,
        #[arg(long)]
        token_x: String,
        #[arg(long)]
        token_y: String,
        #[arg(long)]
        amount_x: u64,
        #[arg(long)]
        amount_y: u64,
    },

    /// Create a WITHDRAW transaction
    Withdraw {
        #[command(flatten)]
        sign: SignArgs,
        #[arg(long)]
        token_x: String,
        #[arg(long)]
        token_y: String,
        /// Percentage of the sender's shares to burn (1-100)
        #[arg(long)]
        percentage: u8,
    },

    /// Create a SWAP transaction
    Swap {
        #[command(flatten)]
        sign: SignArgs,
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        amount_in: u64,
        /// Minimum acceptable output
        #[arg(long, default_value_t = 0)]
        min_amount_out: u64,
    },

    /// Create a WRAP transaction
    Wrap {
        #[command(flatten)]
        sign: SignArgs,
        #[arg(long)]
        amount: u64,
    },

    /// Create an UNWRAP transaction
    Unwrap {
        #[command(flatten)]
        sign: SignArgs,
        #[arg(long)]
        amount: u64,
    },
}
