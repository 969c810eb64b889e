//! Pairswap VM - Pool engine, router and transaction execution
//!
//! The pool engine implements constant-product swaps and share accounting;
//! the router resolves or creates pools per canonical pair, bridges the
//! native base asset, and is the only caller pools accept. The executor
//! runs signed transactions as all-or-nothing units of work.

pub mod error;
pub mod executor;
pub mod guard;
pub mod math;
pub mod pool;
pub mod router;
pub mod validation;
pub mod wrapped;

pub use error::VmError;
pub use executor::{ExecutionEvent, ExecutionResult, Executor};
pub use guard::{atomically, non_reentrant};
pub use math::{quote_in_amount, quote_out_amount};
pub use pool::{DepositOutcome, SwapOutcome, WithdrawOutcome};
pub use router::Router;
pub use validation::{validate_transaction, ValidationResult};
