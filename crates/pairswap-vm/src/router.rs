//! Pool registry and routing facade.
//!
//! The router maps an unordered token pair to its canonical pool, creating
//! the pool on first deposit, and is the sole caller pool entrypoints
//! accept. It also bridges the native base asset to and from its wrapped
//! token. Every entrypoint runs as one unit of work under the router's
//! reentrancy flag.

use pairswap_core::{
    canonical_pair, compute_pool_id, order_amounts, pool_address, Address, Hash, Pool,
};
use pairswap_state::{ChainState, Storage};
use tracing::{debug, info};

use crate::error::VmError;
use crate::guard::{atomically, non_reentrant};
use crate::pool::{self, DepositOutcome, SwapOutcome, WithdrawOutcome};
use crate::wrapped;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    pub address: Address,
    /// Wrapped base-asset contract; the only accepted native sender
    pub wrapped_native: Address,
}

impl Router {
    pub fn new(address: Address, wrapped_native: Address) -> Self {
        Router {
            address,
            wrapped_native,
        }
    }

    /// The router deployed on the chain `state` describes
    pub fn from_state<S: Storage>(state: &ChainState<S>) -> Self {
        Router::new(state.router, state.wrapped_native)
    }

    /// Registry key for an unordered pair; symmetric in its arguments
    pub fn canonical_identifier(token_x: &Address, token_y: &Address) -> Hash {
        compute_pool_id(*token_x, *token_y)
    }

    /// Contract address the pool for this pair has (or will have once
    /// created)
    pub fn predicted_pool_address(token_x: &Address, token_y: &Address) -> Address {
        pool_address(&Self::canonical_identifier(token_x, token_y))
    }

    pub fn resolve_pool<'a, S: Storage>(
        &self,
        state: &'a ChainState<S>,
        token_x: &Address,
        token_y: &Address,
    ) -> Result<&'a Pool, VmError> {
        state
            .get_pool(&Self::canonical_identifier(token_x, token_y))
            .ok_or(VmError::NoLiquidityPoolFound {
                token_x: *token_x,
                token_y: *token_y,
            })
    }

    pub fn get_pool_address<S: Storage>(
        &self,
        state: &ChainState<S>,
        token_x: &Address,
        token_y: &Address,
    ) -> Result<Address, VmError> {
        Ok(self.resolve_pool(state, token_x, token_y)?.address)
    }

    fn create_pool<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        token_x: &Address,
        token_y: &Address,
    ) -> Result<Hash, VmError> {
        if token_x == token_y {
            return Err(VmError::InvalidOperation("Pool tokens must differ".to_string()));
        }
        for token in [token_x, token_y] {
            if state.get_token(token).is_none() {
                return Err(VmError::TokenNotFound(*token));
            }
        }

        let (asset_a, asset_b) = canonical_pair(*token_x, *token_y);
        let pool = Pool::new(self.address, asset_a, asset_b);
        let pool_id = pool.pool_id;
        info!(
            "Created pool {} at {} for {} / {}",
            pool_id, pool.address, asset_a, asset_b
        );
        state.add_pool(pool);
        Ok(pool_id)
    }

    /// Add liquidity for `provider`, creating the pool if the pair has none
    pub fn deposit<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        provider: &Address,
        token_x: &Address,
        token_y: &Address,
        amount_x: u64,
        amount_y: u64,
    ) -> Result<DepositOutcome, VmError> {
        atomically(state, |state| {
            non_reentrant(state, &self.address, |state| {
                let pool_id = Self::canonical_identifier(token_x, token_y);
                if state.get_pool(&pool_id).is_none() {
                    self.create_pool(state, token_x, token_y)?;
                }
                let (_, _, amount_a, amount_b) =
                    order_amounts(*token_x, *token_y, amount_x, amount_y);
                pool::deposit(state, &self.address, &pool_id, provider, amount_a, amount_b)
            })
        })
    }

    /// Remove `percentage` of the provider's liquidity from an existing pool
    pub fn withdraw<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        provider: &Address,
        token_x: &Address,
        token_y: &Address,
        percentage: u8,
    ) -> Result<WithdrawOutcome, VmError> {
        atomically(state, |state| {
            non_reentrant(state, &self.address, |state| {
                let pool_id = self.resolve_pool(state, token_x, token_y)?.pool_id;
                pool::withdraw(state, &self.address, &pool_id, provider, percentage)
            })
        })
    }

    /// Swap through the pool for `token_in`/`token_out`
    pub fn swap<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        account: &Address,
        token_in: &Address,
        token_out: &Address,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<SwapOutcome, VmError> {
        atomically(state, |state| {
            non_reentrant(state, &self.address, |state| {
                let pool_id = self.resolve_pool(state, token_in, token_out)?.pool_id;
                pool::swap(
                    state,
                    &self.address,
                    &pool_id,
                    account,
                    token_in,
                    token_out,
                    amount_in,
                    min_amount_out,
                )
            })
        })
    }

    pub fn get_out_amount<S: Storage>(
        &self,
        state: &ChainState<S>,
        token_in: &Address,
        token_out: &Address,
        amount_in: u64,
    ) -> Result<u64, VmError> {
        let pool = self.resolve_pool(state, token_in, token_out)?;
        pool::get_out_amount(state, pool, token_in, token_out, amount_in)
    }

    pub fn get_in_amount<S: Storage>(
        &self,
        state: &ChainState<S>,
        token_in: &Address,
        token_out: &Address,
        amount_out: u64,
    ) -> Result<u64, VmError> {
        let pool = self.resolve_pool(state, token_in, token_out)?;
        pool::get_in_amount(state, pool, token_in, token_out, amount_out)
    }

    /// Convert `value` of the caller's native asset into wrapped tokens
    pub fn wrap_base_asset<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        caller: &Address,
        value: u64,
    ) -> Result<(), VmError> {
        atomically(state, |state| {
            non_reentrant(state, &self.address, |state| {
                if value == 0 {
                    return Err(VmError::ZeroAmount("wrap value".to_string()));
                }

                // Value attached to the call, not a plain transfer
                let have = state.native_balance(caller);
                if have < value {
                    return Err(VmError::InsufficientBalance { have, need: value });
                }
                state.transfer_native(caller, &self.address, value)?;

                wrapped::deposit(state, &self.address, value)?;
                if !state.token_transfer(&self.wrapped_native, &self.address, caller, value)? {
                    return Err(VmError::TokenTransferFailed {
                        from: self.address,
                        to: *caller,
                        amount: value,
                    });
                }

                debug!("Wrapped {} native for {}", value, caller);
                Ok(())
            })
        })
    }

    /// Redeem `amount` wrapped tokens (pulled via the caller's allowance to
    /// the router) for native asset paid to the caller
    pub fn unwrap_base_asset<S: Storage>(
        &self,
        state: &mut ChainState<S>,
        caller: &Address,
        amount: u64,
    ) -> Result<(), VmError> {
        atomically(state, |state| {
            non_reentrant(state, &self.address, |state| {
                if amount == 0 {
                    return Err(VmError::ZeroAmount("unwrap amount".to_string()));
                }

                let pulled = state.token_transfer_from(
                    &self.wrapped_native,
                    &self.address,
                    caller,
                    &self.address,
                    amount,
                )?;
                if !pulled {
                    return Err(VmError::TokenTransferFailed {
                        from: *caller,
                        to: self.address,
                        amount,
                    });
                }

                wrapped::withdraw(state, &self.address, amount).map_err(|e| {
                    debug!("Wrapped contract refused withdrawal: {}", e);
                    VmError::NativeTransferFailed {
                        recipient: self.address,
                        amount,
                    }
                })?;

                wrapped::send_native(state, &self.address, caller, amount).map_err(|e| {
                    debug!("Native payout failed: {}", e);
                    VmError::NativeTransferFailed {
                        recipient: *caller,
                        amount,
                    }
                })?;

                debug!("Unwrapped {} native for {}", amount, caller);
                Ok(())
            })
        })
    }

    /// Receive rule for plain native transfers into the router
    pub fn receive_native(&self, sender: &Address) -> Result<(), VmError> {
        if *sender != self.wrapped_native {
            return Err(VmError::UnauthorizedNativeSender { sender: *sender });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_core::{GenesisConfig, GenesisToken, KeyPair};
    use pairswap_state::MemoryStorage;

    struct Setup {
        state: ChainState<MemoryStorage>,
        router: Router,
        user: Address,
        x: Address,
        y: Address,
    }

    fn setup() -> Setup {
        let user = KeyPair::generate().address;
        let mut config = GenesisConfig::new(9);
        config.initial_balances.push((user, 50_000));
        for name in ["xeno", "yarn"] {
            config.tokens.push(GenesisToken {
                name: name.to_string(),
                symbol: name.to_uppercase(),
                decimals: 0,
                total_supply: 1_000_000,
                holder: user,
            });
        }
        let x = config.tokens[0].meta().token_id;
        let y = config.tokens[1].meta().token_id;

        let mut state = ChainState::new(MemoryStorage::new());
        state.init_genesis(&config).unwrap();
        let pool = Router::predicted_pool_address(&x, &y);
        for token in [x, y] {
            state.token_approve(&token, &user, &pool, u64::MAX).unwrap();
        }

        Setup {
            router: Router::from_state(&state),
            state,
            user,
            x,
            y,
        }
    }

    #[test]
    fn test_canonical_identifier_is_symmetric() {
        let a = Address::derive(b"token", b"a");
        let b = Address::derive(b"token", b"b");
        assert_eq!(
            Router::canonical_identifier(&a, &b),
            Router::canonical_identifier(&b, &a)
        );
    }

    #[test]
    fn test_unknown_pair_not_found() {
        let s = setup();
        let err = s.router.get_pool_address(&s.state, &s.x, &s.y).unwrap_err();
        assert!(matches!(err, VmError::NoLiquidityPoolFound { .. }));
    }

    #[test]
    fn test_deposit_creates_pool_once() {
        let mut s = setup();
        s.router.deposit(&mut s.state, &s.user, &s.x, &s.y, 1000, 10).unwrap();
        assert_eq!(s.state.pools.len(), 1);

        let address = s.router.get_pool_address(&s.state, &s.y, &s.x).unwrap();
        assert_eq!(address, Router::predicted_pool_address(&s.x, &s.y));
        assert_eq!(s.router.resolve_pool(&s.state, &s.x, &s.y).unwrap().owner, s.router.address);

        // Reversed argument order reaches the same pool with amounts realigned
        s.router.deposit(&mut s.state, &s.user, &s.y, &s.x, 1, 100).unwrap();
        assert_eq!(s.state.pools.len(), 1);
        assert_eq!(s.state.token_balance(&s.x, &address).unwrap(), 1100);
        assert_eq!(s.state.token_balance(&s.y, &address).unwrap(), 11);
    }

    #[test]
    fn test_failed_first_deposit_leaves_no_pool() {
        let mut s = setup();
        let err = s.router.deposit(&mut s.state, &s.user, &s.x, &s.y, 0, 10).unwrap_err();
        assert!(matches!(err, VmError::ZeroAmount(_)));
        assert!(s.state.pools.is_empty());
        assert!(!s.state.is_entered(&s.router.address));
    }

    #[test]
    fn test_pool_creation_rejects_bad_pairs() {
        let mut s = setup();
        let err = s.router.deposit(&mut s.state, &s.user, &s.x, &s.x, 10, 10).unwrap_err();
        assert!(matches!(err, VmError::InvalidOperation(_)));

        let ghost = Address::derive(b"token", b"ghost");
        let err = s.router.deposit(&mut s.state, &s.user, &s.x, &ghost, 10, 10).unwrap_err();
        assert!(matches!(err, VmError::TokenNotFound(t) if t == ghost));
        assert!(s.state.pools.is_empty());
    }

    #[test]
    fn test_withdraw_and_swap_need_pool() {
        let mut s = setup();
        let err = s.router.withdraw(&mut s.state, &s.user, &s.x, &s.y, 50).unwrap_err();
        assert!(matches!(err, VmError::NoLiquidityPoolFound { .. }));
        let err = s.router.swap(&mut s.state, &s.user, &s.x, &s.y, 10, 0).unwrap_err();
        assert!(matches!(err, VmError::NoLiquidityPoolFound { .. }));
    }

    #[test]
    fn test_swap_quotes_through_router() {
        let mut s = setup();
        s.router.deposit(&mut s.state, &s.user, &s.x, &s.y, 1000, 10).unwrap();
        assert_eq!(s.router.get_out_amount(&s.state, &s.x, &s.y, 250).unwrap(), 2);
        assert_eq!(s.router.get_in_amount(&s.state, &s.x, &s.y, 2).unwrap(), 250);

        let outcome = s.router.swap(&mut s.state, &s.user, &s.x, &s.y, 250, 1).unwrap();
        // 250 - fee 0 quotes to 2
        assert_eq!(outcome.amount_out, 2);
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let mut s = setup();
        let wrapped = s.router.wrapped_native;

        s.router.wrap_base_asset(&mut s.state, &s.user, 5_000).unwrap();
        assert_eq!(s.state.native_balance(&s.user), 45_000);
        assert_eq!(s.state.token_balance(&wrapped, &s.user).unwrap(), 5_000);
        assert_eq!(s.state.native_balance(&s.router.address), 0);

        let router = s.router.address;
        s.state.token_approve(&wrapped, &s.user, &router, 2_000).unwrap();
        s.router.unwrap_base_asset(&mut s.state, &s.user, 2_000).unwrap();
        assert_eq!(s.state.native_balance(&s.user), 47_000);
        assert_eq!(s.state.token_balance(&wrapped, &s.user).unwrap(), 3_000);
        assert_eq!(s.state.native_balance(&wrapped), 3_000);
        assert_eq!(s.state.native_balance(&router), 0);
    }

    #[test]
    fn test_unwrap_without_allowance_fails_cleanly() {
        let mut s = setup();
        let wrapped = s.router.wrapped_native;
        s.router.wrap_base_asset(&mut s.state, &s.user, 1_000).unwrap();

        let err = s.router.unwrap_base_asset(&mut s.state, &s.user, 500).unwrap_err();
        assert!(matches!(err, VmError::TokenTransferFailed { amount: 500, .. }));
        assert_eq!(s.state.token_balance(&wrapped, &s.user).unwrap(), 1_000);
        assert_eq!(s.state.native_balance(&s.user), 49_000);
    }

    #[test]
    fn test_zero_wrap_rejected() {
        let mut s = setup();
        let err = s.router.wrap_base_asset(&mut s.state, &s.user, 0).unwrap_err();
        assert!(matches!(err, VmError::ZeroAmount(_)));
        let err = s.router.unwrap_base_asset(&mut s.state, &s.user, 0).unwrap_err();
        assert!(matches!(err, VmError::ZeroAmount(_)));
    }

    #[test]
    fn test_wrap_more_than_balance() {
        let mut s = setup();
        let err = s.router.wrap_base_asset(&mut s.state, &s.user, 50_001).unwrap_err();
        assert!(matches!(err, VmError::InsufficientBalance { have: 50_000, need: 50_001 }));
        assert_eq!(s.state.native_balance(&s.user), 50_000);
    }

    #[test]
    fn test_receive_native_rule() {
        let s = setup();
        assert!(s.router.receive_native(&s.router.wrapped_native).is_ok());
        assert!(matches!(
            s.router.receive_native(&s.user),
            Err(VmError::UnauthorizedNativeSender { .. })
        ));
    }
}
