use std::path::Path;

use anyhow::{anyhow, Result};
use pairswap_core::{compute_token_address, Address, Op, SecretKey, Transaction};
use pairswap_vm::Router;

use crate::cli::{SignArgs, TxGenCommands};

pub fn handle_txgen(command: TxGenCommands) -> Result<()> {
    let (sign, op) = match command {
        TxGenCommands::Transfer { sign, to, amount } => (
            sign,
            Op::Transfer {
                to: parse_address(&to)?,
                amount,
            },
        ),

        TxGenCommands::TokenCreate {
            sign,
            name,
            symbol,
            decimals,
            total_supply,
        } => {
            let creator = parse_secret(&sign.from_secret)?.address();
            let token = compute_token_address(&name, &symbol, decimals, total_supply, &creator);
            println!("Token address: {}", token);
            (
                sign,
                Op::TokenCreate {
                    name,
                    symbol,
                    decimals,
                    total_supply,
                },
            )
        }

        TxGenCommands::TokenTransfer {
            sign,
            token,
            to,
            amount,
        } => (
            sign,
            Op::TokenTransfer {
                token: parse_address(&token)?,
                to: parse_address(&to)?,
                amount,
            },
        ),

        TxGenCommands::Approve {
            sign,
            token,
            spender,
            amount,
        } => (
            sign,
            Op::Approve {
                token: parse_address(&token)?,
                spender: parse_address(&spender)?,
                amount,
            },
        ),

        TxGenCommands::Deposit {
            sign,
            token_x,
            token_y,
            amount_x,
            amount_y,
        } => {
            let token_x = parse_address(&token_x)?;
            let token_y = parse_address(&token_y)?;
            println!(
                "Pool address (approve both tokens to it): {}",
                Router::predicted_pool_address(&token_x, &token_y)
            );
            (
                sign,
                Op::Deposit {
                    token_x,
                    token_y,
                    amount_x,
                    amount_y,
                },
            )
        }

        TxGenCommands::Withdraw {
            sign,
            token_x,
            token_y,
            percentage,
        } => (
            sign,
            Op::Withdraw {
                token_x: parse_address(&token_x)?,
                token_y: parse_address(&token_y)?,
                percentage,
            },
        ),

        TxGenCommands::Swap {
            sign,
            token_in,
            token_out,
            amount_in,
            min_amount_out,
        } => (
            sign,
            Op::Swap {
                token_in: parse_address(&token_in)?,
                token_out: parse_address(&token_out)?,
                amount_in,
                min_amount_out,
            },
        ),

        TxGenCommands::Wrap { sign, amount } => (sign, Op::WrapBaseAsset { amount }),

        TxGenCommands::Unwrap { sign, amount } => (sign, Op::UnwrapBaseAsset { amount }),
    };

    let tx = sign_op(&sign, op)?;
    write_tx(&tx, &sign.out)?;
    println!("Transaction written to {}", sign.out.display());
    Ok(())
}

fn sign_op(sign: &SignArgs, op: Op) -> Result<Transaction> {
    let secret = parse_secret(&sign.from_secret)?;
    Ok(Transaction::new_signed(
        secret.address(),
        sign.nonce,
        vec![op],
        &secret,
    )?)
}

fn write_tx(tx: &Transaction, out: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(tx)?;
    std::fs::write(out, json)?;
    Ok(())
}

fn parse_secret(hex_str: &str) -> Result<SecretKey> {
    SecretKey::from_hex(hex_str).map_err(|e| anyhow!(e))
}

pub fn parse_address(hex_str: &str) -> Result<Address> {
    Address::from_hex(hex_str).map_err(|e| anyhow!("invalid address {}: {}", hex_str, e))
}
