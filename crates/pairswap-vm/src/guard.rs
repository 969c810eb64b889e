//! Unit-of-work and reentrancy helpers shared by router and pool entrypoints

use pairswap_core::Address;
use pairswap_state::{ChainState, Storage};
use tracing::debug;

use crate::error::VmError;

/// Run `f` as a single unit of work: if it fails, every ledger mutation it
/// made is discarded before the error is returned.
pub fn atomically<S, T, F>(state: &mut ChainState<S>, f: F) -> Result<T, VmError>
where
    S: Storage,
    F: FnOnce(&mut ChainState<S>) -> Result<T, VmError>,
{
    let snapshot = state.snapshot();
    match f(state) {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!("Reverting unit of work: {}", e);
            state.restore(snapshot);
            Err(e)
        }
    }
}

/// Run `f` with `contract` marked as executing. A nested call into the same
/// contract fails with `ReentrantCall`; the flag is cleared on every return
/// path.
pub fn non_reentrant<S, T, F>(
    state: &mut ChainState<S>,
    contract: &Address,
    f: F,
) -> Result<T, VmError>
where
    S: Storage,
    F: FnOnce(&mut ChainState<S>) -> Result<T, VmError>,
{
    if !state.enter(contract) {
        return Err(VmError::ReentrantCall(*contract));
    }
    let result = f(state);
    state.exit(contract);
    result
}
