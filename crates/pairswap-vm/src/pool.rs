//! Pool engine entrypoints.
//!
//! Every mutating entrypoint takes the calling contract and fails with
//! `Unauthorized` unless it is the pool's recorded owner (the router).
//! Reserves are always read from the token ledgers at the pool address.

use pairswap_core::{Address, Hash, Pool};
use pairswap_state::{ChainState, Storage};
use tracing::debug;

use crate::error::VmError;
use crate::guard::non_reentrant;
use crate::math;

/// Result of a successful deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub pool_id: Hash,
    pub amount_a: u64,
    pub amount_b: u64,
    pub shares: u64,
}

/// Result of a successful withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawOutcome {
    pub shares_burned: u64,
    pub amount_a: u64,
    pub amount_b: u64,
}

/// Result of a successful swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub amount_out: u64,
    /// Portion of the input retained by the pool as fee
    pub fee: u64,
}

fn load_pool<S: Storage>(state: &ChainState<S>, pool_id: &Hash) -> Result<Pool, VmError> {
    state
        .get_pool(pool_id)
        .cloned()
        .ok_or_else(|| VmError::InvalidOperation(format!("Pool {} is not registered", pool_id)))
}

fn ensure_owner(pool: &Pool, caller: &Address) -> Result<(), VmError> {
    if *caller != pool.owner {
        return Err(VmError::Unauthorized {
            caller: *caller,
            owner: pool.owner,
        });
    }
    Ok(())
}

/// Fail unless `{token_a, token_b}` is exactly the pool's asset set
pub fn validate_tokens(pool: &Pool, token_a: &Address, token_b: &Address) -> Result<(), VmError> {
    if !pool.supports(token_a, token_b) {
        return Err(VmError::TokensNotSupported {
            token_a: *token_a,
            token_b: *token_b,
        });
    }
    Ok(())
}

/// Live balances of `asset_a` and `asset_b` held by the pool
pub fn get_balances<S: Storage>(state: &ChainState<S>, pool: &Pool) -> Result<(u64, u64), VmError> {
    Ok((
        state.token_balance(&pool.asset_a, &pool.address)?,
        state.token_balance(&pool.asset_b, &pool.address)?,
    ))
}

/// True iff `amount_a : amount_b` matches the pool's current reserves
pub fn ratio_valid<S: Storage>(
    state: &ChainState<S>,
    pool: &Pool,
    amount_a: u64,
    amount_b: u64,
) -> Result<bool, VmError> {
    let (reserve_a, reserve_b) = get_balances(state, pool)?;
    Ok(math::ratio_valid(reserve_a, reserve_b, amount_a, amount_b))
}

/// Pull `amount` of `asset` from `owner` into the pool using the owner's
/// allowance to the pool
fn pull<S: Storage>(
    state: &mut ChainState<S>,
    pool: &Pool,
    asset: &Address,
    owner: &Address,
    amount: u64,
) -> Result<(), VmError> {
    let available = state.token_allowance(asset, owner, &pool.address)?;
    if available < amount {
        return Err(VmError::InsufficientAllowance {
            owner: *owner,
            spender: pool.address,
            requested: amount,
            available,
            asset: *asset,
        });
    }
    if !state.token_transfer_from(asset, &pool.address, owner, &pool.address, amount)? {
        return Err(VmError::TransferFailed {
            owner: *owner,
            recipient: pool.address,
            amount,
            asset: *asset,
        });
    }
    Ok(())
}

/// Pay `amount` of `asset` out of the pool
fn push<S: Storage>(
    state: &mut ChainState<S>,
    pool: &Pool,
    asset: &Address,
    recipient: &Address,
    amount: u64,
) -> Result<(), VmError> {
    if !state.token_transfer(asset, &pool.address, recipient, amount)? {
        return Err(VmError::TransferFailed {
            owner: pool.address,
            recipient: *recipient,
            amount,
            asset: *asset,
        });
    }
    Ok(())
}

/// Add liquidity in the pool's own asset order and mint shares to
/// `provider`.
///
/// While no shares are outstanding the deposit seeds the pool: any non-zero
/// ratio is accepted and the provider receives the baseline share supply,
/// whatever balances the pool address already held.
pub fn deposit<S: Storage>(
    state: &mut ChainState<S>,
    caller: &Address,
    pool_id: &Hash,
    provider: &Address,
    amount_a: u64,
    amount_b: u64,
) -> Result<DepositOutcome, VmError> {
    let pool = load_pool(state, pool_id)?;
    ensure_owner(&pool, caller)?;

    non_reentrant(state, &pool.address, |state| {
        if amount_a == 0 || amount_b == 0 {
            return Err(VmError::ZeroAmount("deposit amounts".to_string()));
        }

        let (reserve_a, reserve_b) = get_balances(state, &pool)?;
        let seeding = pool.shares.total_shares() == 0;
        if !seeding && !math::ratio_valid(reserve_a, reserve_b, amount_a, amount_b) {
            return Err(VmError::InvalidRatio {
                reserve_a,
                reserve_b,
                amount_a,
                amount_b,
            });
        }

        pull(state, &pool, &pool.asset_a, provider, amount_a)?;
        pull(state, &pool, &pool.asset_b, provider, amount_b)?;

        let shares = if seeding {
            math::seed_shares()
        } else {
            let (reserve_a_after, _) = get_balances(state, &pool)?;
            math::deposit_shares(amount_a, reserve_a_after)?
        };
        if shares == 0 {
            return Err(VmError::ZeroAmount("shares minted".to_string()));
        }

        let pool_mut = state
            .get_pool_mut(pool_id)
            .ok_or_else(|| VmError::InvalidOperation(format!("Pool {} vanished", pool_id)))?;
        pool_mut.shares.mint(&pool.address, provider, shares)?;

        debug!(
            "Deposit into pool {}: {} / {} from {}, minted {} shares",
            pool_id, amount_a, amount_b, provider, shares
        );

        Ok(DepositOutcome {
            pool_id: *pool_id,
            amount_a,
            amount_b,
            shares,
        })
    })
}

/// Burn `percentage` of the provider's shares and pay out the matching
/// fraction of both reserves
pub fn withdraw<S: Storage>(
    state: &mut ChainState<S>,
    caller: &Address,
    pool_id: &Hash,
    provider: &Address,
    percentage: u8,
) -> Result<WithdrawOutcome, VmError> {
    let pool = load_pool(state, pool_id)?;
    ensure_owner(&pool, caller)?;

    non_reentrant(state, &pool.address, |state| {
        if percentage == 0 || percentage > 100 {
            return Err(VmError::InvalidPercentage(percentage));
        }

        let balance = pool.shares.balance_of(provider);
        let shares_burned = math::shares_to_burn(balance, percentage);
        if shares_burned == 0 {
            return Err(VmError::NoSharesToBurn {
                provider: *provider,
            });
        }
        let fraction = math::share_fraction(shares_burned, pool.shares.total_shares())?;

        let (reserve_a, reserve_b) = get_balances(state, &pool)?;
        let amount_a = math::amount_for_fraction(reserve_a, fraction)?;
        let amount_b = math::amount_for_fraction(reserve_b, fraction)?;

        // Shares go before any tokens leave the pool
        let pool_mut = state
            .get_pool_mut(pool_id)
            .ok_or_else(|| VmError::InvalidOperation(format!("Pool {} vanished", pool_id)))?;
        pool_mut.shares.burn(&pool.address, provider, shares_burned)?;

        push(state, &pool, &pool.asset_a, provider, amount_a)?;
        push(state, &pool, &pool.asset_b, provider, amount_b)?;

        debug!(
            "Withdraw {}% from pool {} for {}: burned {} shares for {} / {}",
            percentage, pool_id, provider, shares_burned, amount_a, amount_b
        );

        Ok(WithdrawOutcome {
            shares_burned,
            amount_a,
            amount_b,
        })
    })
}

/// Swap an exact `amount_in` of `token_in` for `token_out`.
///
/// The fee is taken from the input before quoting, and the trade is refused
/// if the product of the reserves would shrink.
#[allow(clippy::too_many_arguments)]
pub fn swap<S: Storage>(
    state: &mut ChainState<S>,
    caller: &Address,
    pool_id: &Hash,
    account: &Address,
    token_in: &Address,
    token_out: &Address,
    amount_in: u64,
    min_amount_out: u64,
) -> Result<SwapOutcome, VmError> {
    let pool = load_pool(state, pool_id)?;
    ensure_owner(&pool, caller)?;

    non_reentrant(state, &pool.address, |state| {
        validate_tokens(&pool, token_in, token_out)?;
        if amount_in == 0 {
            return Err(VmError::ZeroAmount("swap input".to_string()));
        }

        let available = state.token_allowance(token_in, account, &pool.address)?;
        if available < amount_in {
            return Err(VmError::InsufficientAllowance {
                owner: *account,
                spender: pool.address,
                requested: amount_in,
                available,
                asset: *token_in,
            });
        }

        let reserve_in = state.token_balance(token_in, &pool.address)?;
        let reserve_out = state.token_balance(token_out, &pool.address)?;
        if reserve_in == 0 || reserve_out == 0 {
            return Err(VmError::InsufficientLiquidity {
                reserve_out,
                amount_out: 0,
            });
        }

        let fee = math::swap_fee(amount_in);
        let amount_out = math::quote_out_amount(reserve_in, reserve_out, amount_in - fee)?;
        if amount_out == 0 {
            return Err(VmError::ZeroAmount("swap output".to_string()));
        }
        if amount_out < min_amount_out {
            return Err(VmError::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }

        let k_before = math::invariant(reserve_in, reserve_out);
        let reserve_in_after = reserve_in
            .checked_add(amount_in)
            .ok_or(VmError::MathOverflow("swap reserve"))?;
        let k_after = math::invariant(reserve_in_after, reserve_out - amount_out);
        if k_after < k_before {
            return Err(VmError::InvariantViolated { k_before, k_after });
        }

        pull(state, &pool, token_in, account, amount_in)?;
        push(state, &pool, token_out, account, amount_out)?;

        debug!(
            "Swap in pool {}: {} {} -> {} {} for {} (fee {})",
            pool_id, amount_in, token_in, amount_out, token_out, account, fee
        );

        Ok(SwapOutcome { amount_out, fee })
    })
}

/// Fee-exclusive output quote against the pool's live reserves
pub fn get_out_amount<S: Storage>(
    state: &ChainState<S>,
    pool: &Pool,
    token_in: &Address,
    token_out: &Address,
    amount_in: u64,
) -> Result<u64, VmError> {
    validate_tokens(pool, token_in, token_out)?;
    let reserve_in = state.token_balance(token_in, &pool.address)?;
    let reserve_out = state.token_balance(token_out, &pool.address)?;
    math::quote_out_amount(reserve_in, reserve_out, amount_in)
}

/// Fee-exclusive input quote against the pool's live reserves
pub fn get_in_amount<S: Storage>(
    state: &ChainState<S>,
    pool: &Pool,
    token_in: &Address,
    token_out: &Address,
    amount_out: u64,
) -> Result<u64, VmError> {
    validate_tokens(pool, token_in, token_out)?;
    let reserve_in = state.token_balance(token_in, &pool.address)?;
    let reserve_out = state.token_balance(token_out, &pool.address)?;
    math::quote_in_amount(reserve_in, reserve_out, amount_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_core::{canonical_pair, GenesisConfig, GenesisToken, KeyPair};
    use pairswap_state::MemoryStorage;

    struct Fixture {
        state: ChainState<MemoryStorage>,
        provider: Address,
        pool_id: Hash,
        pool_address: Address,
        asset_a: Address,
        asset_b: Address,
    }

    fn token(name: &str, holder: Address) -> GenesisToken {
        GenesisToken {
            name: name.to_string(),
            symbol: name.to_uppercase(),
            decimals: 0,
            total_supply: 1_000_000,
            holder,
        }
    }

    fn fixture() -> Fixture {
        let provider = KeyPair::generate().address;
        let mut config = GenesisConfig::new(1);
        config.tokens.push(token("alpha", provider));
        config.tokens.push(token("beta", provider));
        let (asset_a, asset_b) =
            canonical_pair(config.tokens[0].meta().token_id, config.tokens[1].meta().token_id);

        let mut state = ChainState::new(MemoryStorage::new());
        state.init_genesis(&config).unwrap();
        let pool = Pool::new(state.router, asset_a, asset_b);
        let pool_id = pool.pool_id;
        let pool_address = pool.address;
        state.add_pool(pool);

        for asset in [asset_a, asset_b] {
            state
                .token_approve(&asset, &provider, &pool_address, u64::MAX)
                .unwrap();
        }

        Fixture {
            state,
            provider,
            pool_id,
            pool_address,
            asset_a,
            asset_b,
        }
    }

    fn seed(f: &mut Fixture, amount_a: u64, amount_b: u64) {
        let router = f.state.router;
        deposit(&mut f.state, &router, &f.pool_id, &f.provider, amount_a, amount_b).unwrap();
    }

    fn shares(f: &Fixture) -> u64 {
        f.state.get_pool(&f.pool_id).unwrap().shares.balance_of(&f.provider)
    }

    #[test]
    fn test_seed_deposit_mints_thousand_shares() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);

        assert_eq!(shares(&f), 1000);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (1000, 10));
    }

    #[test]
    fn test_seed_deposit_ignores_donated_balance() {
        let mut f = fixture();
        let (a, provider, pool_address) = (f.asset_a, f.provider, f.pool_address);
        assert!(f.state.token_transfer(&a, &provider, &pool_address, 1).unwrap());

        seed(&mut f, 1000, 10);
        assert_eq!(shares(&f), 1000);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (1001, 10));
    }

    #[test]
    fn test_reseed_after_last_provider_leaves_dust() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        withdraw(&mut f.state, &router, &f.pool_id, &f.provider, 100).unwrap();
        assert_eq!(f.state.get_pool(&f.pool_id).unwrap().shares.total_shares(), 0);

        let (b, provider, pool_address) = (f.asset_b, f.provider, f.pool_address);
        assert!(f.state.token_transfer(&b, &provider, &pool_address, 3).unwrap());
        let outcome = deposit(&mut f.state, &router, &f.pool_id, &f.provider, 500, 7).unwrap();
        assert_eq!(outcome.shares, 1000);
    }

    #[test]
    fn test_proportional_deposit() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let outcome = deposit(&mut f.state, &router, &f.pool_id, &f.provider, 100, 1).unwrap();

        // 100 * 100 * 10 / 1100
        assert_eq!(outcome.shares, 90);
        assert_eq!(shares(&f), 1090);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (1100, 11));
    }

    #[test]
    fn test_mismatched_ratio_rejected() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let err = deposit(&mut f.state, &router, &f.pool_id, &f.provider, 100, 5).unwrap_err();

        assert!(matches!(
            err,
            VmError::InvalidRatio { reserve_a: 1000, reserve_b: 10, amount_a: 100, amount_b: 5 }
        ));
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (1000, 10));
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut f = fixture();
        let router = f.state.router;
        let err = deposit(&mut f.state, &router, &f.pool_id, &f.provider, 0, 10).unwrap_err();
        assert!(matches!(err, VmError::ZeroAmount(_)));
    }

    #[test]
    fn test_only_owner_may_call() {
        let mut f = fixture();
        let provider = f.provider;
        let err = deposit(&mut f.state, &provider, &f.pool_id, &provider, 10, 10).unwrap_err();
        assert!(matches!(err, VmError::Unauthorized { caller, .. } if caller == provider));

        let err = withdraw(&mut f.state, &provider, &f.pool_id, &provider, 50).unwrap_err();
        assert!(matches!(err, VmError::Unauthorized { .. }));
    }

    #[test]
    fn test_missing_allowance() {
        let mut f = fixture();
        let (asset_a, pool_address, provider) = (f.asset_a, f.pool_address, f.provider);
        f.state
            .token_approve(&asset_a, &provider, &pool_address, 5)
            .unwrap();
        let router = f.state.router;
        let err = deposit(&mut f.state, &router, &f.pool_id, &provider, 10, 10).unwrap_err();

        assert!(matches!(
            err,
            VmError::InsufficientAllowance { requested: 10, available: 5, asset, spender, .. }
                if asset == asset_a && spender == pool_address
        ));
    }

    #[test]
    fn test_full_withdraw_returns_reserves() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let outcome = withdraw(&mut f.state, &router, &f.pool_id, &f.provider, 100).unwrap();

        assert_eq!(
            outcome,
            WithdrawOutcome {
                shares_burned: 1000,
                amount_a: 1000,
                amount_b: 10
            }
        );
        assert_eq!(shares(&f), 0);
        assert_eq!(f.state.get_pool(&f.pool_id).unwrap().shares.total_shares(), 0);
        assert_eq!(
            f.state.token_balance(&f.asset_a, &f.provider).unwrap(),
            1_000_000
        );
    }

    #[test]
    fn test_partial_withdraw() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let outcome = withdraw(&mut f.state, &router, &f.pool_id, &f.provider, 25).unwrap();

        assert_eq!(outcome.shares_burned, 250);
        assert_eq!(outcome.amount_a, 250);
        assert_eq!(outcome.amount_b, 2);
        assert_eq!(shares(&f), 750);
    }

    #[test]
    fn test_invalid_percentage() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        for pct in [0u8, 101, 255] {
            let err = withdraw(&mut f.state, &router, &f.pool_id, &f.provider, pct).unwrap_err();
            assert!(matches!(err, VmError::InvalidPercentage(p) if p == pct));
        }
    }

    #[test]
    fn test_withdraw_without_shares() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let stranger = KeyPair::generate().address;
        let err = withdraw(&mut f.state, &router, &f.pool_id, &stranger, 100).unwrap_err();
        assert!(matches!(err, VmError::NoSharesToBurn { provider } if provider == stranger));
    }

    #[test]
    fn test_swap_applies_fee_and_moves_tokens() {
        let mut f = fixture();
        seed(&mut f, 100_000, 100_000);
        let router = f.state.router;
        let (a, b, provider) = (f.asset_a, f.asset_b, f.provider);
        let outcome =
            swap(&mut f.state, &router, &f.pool_id, &provider, &a, &b, 1000, 1).unwrap();

        // fee = 3, quote(100_000, 100_000, 997) = 100_000 - 10^10 / 100_997
        assert_eq!(outcome.fee, 3);
        assert_eq!(outcome.amount_out, 988);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (101_000, 99_012));
    }

    #[test]
    fn test_swap_slippage_leaves_reserves() {
        let mut f = fixture();
        seed(&mut f, 100_000, 100_000);
        let router = f.state.router;
        let (a, b, provider) = (f.asset_a, f.asset_b, f.provider);
        let err =
            swap(&mut f.state, &router, &f.pool_id, &provider, &a, &b, 1000, 989).unwrap_err();

        assert!(matches!(
            err,
            VmError::SlippageExceeded { amount_out: 988, min_amount_out: 989 }
        ));
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert_eq!(get_balances(&f.state, &pool).unwrap(), (100_000, 100_000));
    }

    #[test]
    fn test_swap_rejects_foreign_token() {
        let mut f = fixture();
        seed(&mut f, 1000, 1000);
        let router = f.state.router;
        let (a, provider) = (f.asset_a, f.provider);
        let other = Address::derive(b"token", b"other");
        let err =
            swap(&mut f.state, &router, &f.pool_id, &provider, &a, &other, 10, 0).unwrap_err();
        assert!(matches!(err, VmError::TokensNotSupported { .. }));

        let err = swap(&mut f.state, &router, &f.pool_id, &provider, &a, &a, 10, 0).unwrap_err();
        assert!(matches!(err, VmError::TokensNotSupported { .. }));
    }

    #[test]
    fn test_swap_refuses_rounding_that_shrinks_product() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let router = f.state.router;
        let (a, b, provider) = (f.asset_a, f.asset_b, f.provider);
        // fee rounds to 0; quote(1000, 10, 1) = 1 leaves 1001 * 9 < 10_000
        let err = swap(&mut f.state, &router, &f.pool_id, &provider, &a, &b, 1, 0).unwrap_err();
        assert!(matches!(
            err,
            VmError::InvariantViolated { k_before: 10_000, k_after: 9_009 }
        ));
    }

    #[test]
    fn test_swap_on_empty_pool() {
        let mut f = fixture();
        let router = f.state.router;
        let (a, b, provider) = (f.asset_a, f.asset_b, f.provider);
        let err = swap(&mut f.state, &router, &f.pool_id, &provider, &a, &b, 10, 0).unwrap_err();
        assert!(matches!(err, VmError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_live_quotes() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        let (a, b) = (f.asset_a, f.asset_b);

        assert_eq!(get_out_amount(&f.state, &pool, &a, &b, 250).unwrap(), 2);
        assert_eq!(get_in_amount(&f.state, &pool, &a, &b, 2).unwrap(), 250);
        assert!(get_in_amount(&f.state, &pool, &a, &b, 10).is_err());
    }

    #[test]
    fn test_ratio_valid_against_live_reserves() {
        let mut f = fixture();
        seed(&mut f, 1000, 10);
        let pool = f.state.get_pool(&f.pool_id).unwrap().clone();
        assert!(ratio_valid(&f.state, &pool, 100, 1).unwrap());
        assert!(!ratio_valid(&f.state, &pool, 100, 5).unwrap());
    }
}
