//! Minimal model of the wrapped base-asset contract.
//!
//! The contract's account holds the native collateral; its token ledger
//! (at the same address) tracks the wrapped supply one-for-one.

use pairswap_core::Address;
use pairswap_state::{ChainState, Storage};
use tracing::debug;

use crate::error::VmError;
use crate::router::Router;

/// Move native base asset, running the recipient's receive rule first.
///
/// The router is the only contract with a receive rule; ordinary accounts
/// accept any transfer.
pub fn send_native<S: Storage>(
    state: &mut ChainState<S>,
    from: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), VmError> {
    if *to == state.router {
        Router::from_state(state).receive_native(from)?;
    }
    let have = state.native_balance(from);
    if have < amount {
        return Err(VmError::InsufficientBalance { have, need: amount });
    }
    state.transfer_native(from, to, amount)?;
    debug!("Native transfer of {} from {} to {}", amount, from, to);
    Ok(())
}

/// Lock `value` native from `depositor` and mint the same amount of wrapped
/// tokens to it
pub fn deposit<S: Storage>(
    state: &mut ChainState<S>,
    depositor: &Address,
    value: u64,
) -> Result<(), VmError> {
    let wrapped = state.wrapped_native;
    send_native(state, depositor, &wrapped, value)?;
    if !state.token_mint(&wrapped, depositor, value)? {
        return Err(VmError::MathOverflow("wrapped supply"));
    }
    debug!("Wrapped {} native for {}", value, depositor);
    Ok(())
}

/// Burn `amount` wrapped tokens held by `holder` and release the same amount
/// of native collateral to it
pub fn withdraw<S: Storage>(
    state: &mut ChainState<S>,
    holder: &Address,
    amount: u64,
) -> Result<(), VmError> {
    let wrapped = state.wrapped_native;
    let have = state.token_balance(&wrapped, holder)?;
    if !state.token_burn(&wrapped, holder, amount)? {
        return Err(VmError::InsufficientBalance { have, need: amount });
    }
    send_native(state, &wrapped, holder, amount)?;
    debug!("Unwrapped {} native for {}", amount, holder);
    Ok(())
}
