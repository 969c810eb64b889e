//! Constant-product pricing and share arithmetic.
//!
//! All functions are pure. Amounts are `u64`; intermediates are widened to
//! `u128`, where the product of two amounts always fits.

use pairswap_core::{FEE_DENOMINATOR, PERCENT_SCALE, SHARE_PRECISION, SWAP_FEE, TOKENS_PER_SHARE};

use crate::error::VmError;

/// Output for an exact input, ignoring fees:
/// `reserve_out - (reserve_in * reserve_out) / (reserve_in + amount_in)`.
///
/// ```
/// use pairswap_vm::quote_out_amount;
/// assert_eq!(quote_out_amount(1000, 10, 250).unwrap(), 2);
/// ```
pub fn quote_out_amount(reserve_in: u64, reserve_out: u64, amount_in: u64) -> Result<u64, VmError> {
    let k = reserve_in as u128 * reserve_out as u128;
    let denominator = reserve_in as u128 + amount_in as u128;
    if denominator == 0 {
        return Err(VmError::InsufficientLiquidity {
            reserve_out,
            amount_out: 0,
        });
    }
    // k / denominator <= reserve_out
    let remaining = k / denominator;
    u64::try_from(reserve_out as u128 - remaining)
        .map_err(|_| VmError::MathOverflow("quote_out_amount"))
}

/// Input needed for an exact output, ignoring fees:
/// `(reserve_in * reserve_out) / (reserve_out - amount_out) - reserve_in`.
///
/// ```
/// use pairswap_vm::quote_in_amount;
/// assert_eq!(quote_in_amount(1000, 10, 2).unwrap(), 250);
/// ```
pub fn quote_in_amount(reserve_in: u64, reserve_out: u64, amount_out: u64) -> Result<u64, VmError> {
    if amount_out >= reserve_out {
        return Err(VmError::InsufficientLiquidity {
            reserve_out,
            amount_out,
        });
    }
    let k = reserve_in as u128 * reserve_out as u128;
    let needed = k / (reserve_out - amount_out) as u128;
    let amount_in = needed.saturating_sub(reserve_in as u128);
    u64::try_from(amount_in).map_err(|_| VmError::MathOverflow("quote_in_amount"))
}

/// Fee retained by the pool on a swap input
pub fn swap_fee(amount_in: u64) -> u64 {
    (amount_in as u128 * SWAP_FEE as u128 / FEE_DENOMINATOR as u128) as u64
}

/// True iff `amount_a : amount_b` equals `reserve_a : reserve_b` exactly
pub fn ratio_valid(reserve_a: u64, reserve_b: u64, amount_a: u64, amount_b: u64) -> bool {
    reserve_a as u128 * amount_b as u128 == reserve_b as u128 * amount_a as u128
}

/// Shares minted by the deposit that seeds a pool with no outstanding shares
pub fn seed_shares() -> u64 {
    PERCENT_SCALE * TOKENS_PER_SHARE
}

/// Shares minted for depositing `amount_a`, relative to the pool's balance
/// of asset A after the deposit landed
pub fn deposit_shares(amount_a: u64, reserve_a_after: u64) -> Result<u64, VmError> {
    if reserve_a_after == 0 {
        return Err(VmError::ZeroAmount("pool balance after deposit".to_string()));
    }
    let shares = amount_a as u128 * PERCENT_SCALE as u128 * TOKENS_PER_SHARE as u128
        / reserve_a_after as u128;
    u64::try_from(shares).map_err(|_| VmError::MathOverflow("deposit_shares"))
}

/// Shares burned when withdrawing `percentage` of `balance`; dust below one
/// share stays with the provider
pub fn shares_to_burn(balance: u64, percentage: u8) -> u64 {
    (balance as u128 * percentage as u128 / PERCENT_SCALE as u128) as u64
}

/// `shares / total_shares` as an 18-decimal fixed-point fraction
pub fn share_fraction(shares: u64, total_shares: u64) -> Result<u128, VmError> {
    if total_shares == 0 {
        return Err(VmError::InvalidOperation(
            "pool has no outstanding shares".to_string(),
        ));
    }
    Ok(shares as u128 * SHARE_PRECISION / total_shares as u128)
}

/// Portion of `reserve` owed for a fixed-point `fraction`
pub fn amount_for_fraction(reserve: u64, fraction: u128) -> Result<u64, VmError> {
    let amount = (reserve as u128)
        .checked_mul(fraction)
        .ok_or(VmError::MathOverflow("amount_for_fraction"))?
        / SHARE_PRECISION;
    u64::try_from(amount).map_err(|_| VmError::MathOverflow("amount_for_fraction"))
}

/// Product of two reserves
pub fn invariant(reserve_a: u64, reserve_b: u64) -> u128 {
    reserve_a as u128 * reserve_b as u128
}
