use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, Address, Hash};
use crate::types::shares::ShareLedger;

/// Shares minted per token of asset A, relative to the pool's new balance
pub const TOKENS_PER_SHARE: u64 = 10;
/// Scale of withdrawal percentages and of deposit share math
pub const PERCENT_SCALE: u64 = 100;
/// Swap fee numerator, over `FEE_DENOMINATOR` (0.3%)
pub const SWAP_FEE: u64 = 3;
pub const FEE_DENOMINATOR: u64 = 1000;
/// Fixed-point precision (18 decimals) used for withdrawal fractions
pub const SHARE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// A constant-product pool over two assets.
///
/// Reserves are not stored here: they are always the pool address's live
/// balances in the two token ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: Hash,
    /// Contract address holding the reserves
    pub address: Address,
    pub asset_a: Address,
    pub asset_b: Address,
    /// Sole caller allowed to mutate the pool (the router)
    pub owner: Address,
    pub shares: ShareLedger,
}

impl Pool {
    /// Create a pool with assets in the order given
    pub fn new(owner: Address, asset_a: Address, asset_b: Address) -> Self {
        let pool_id = compute_pool_id(asset_a, asset_b);
        let address = pool_address(&pool_id);
        Pool {
            pool_id,
            address,
            asset_a,
            asset_b,
            owner,
            shares: ShareLedger::new(address),
        }
    }

    /// True iff `{a, b}` is exactly this pool's asset set
    pub fn supports(&self, a: &Address, b: &Address) -> bool {
        (*a == self.asset_a && *b == self.asset_b) || (*a == self.asset_b && *b == self.asset_a)
    }
}

/// Sort a token pair, lower identity first
pub fn canonical_pair(token_x: Address, token_y: Address) -> (Address, Address) {
    if token_x <= token_y {
        (token_x, token_y)
    } else {
        (token_y, token_x)
    }
}

/// Sort a token pair and align the caller's amounts with it
pub fn order_amounts(
    token_x: Address,
    token_y: Address,
    amount_x: u64,
    amount_y: u64,
) -> (Address, Address, u64, u64) {
    if token_x <= token_y {
        (token_x, token_y, amount_x, amount_y)
    } else {
        (token_y, token_x, amount_y, amount_x)
    }
}

/// Compute deterministic pool ID from an unordered token pair
pub fn compute_pool_id(token_x: Address, token_y: Address) -> Hash {
    let (a, b) = canonical_pair(token_x, token_y);
    let mut data = Vec::with_capacity(3 + 64);
    data.extend_from_slice(b"amm");
    data.extend_from_slice(a.as_bytes());
    data.extend_from_slice(b.as_bytes());
    hash_blake3(&data)
}

/// Contract address of the pool with the given ID
pub fn pool_address(pool_id: &Hash) -> Address {
    Address::derive(b"pool", pool_id.as_bytes())
}
