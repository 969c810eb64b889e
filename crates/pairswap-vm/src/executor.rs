use pairswap_core::{Address, Hash, Op, TokenMeta, Transaction};
use pairswap_state::{ChainState, Storage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::VmError;
use crate::guard::atomically;
use crate::router::Router;
use crate::validation::validate_transaction;
use crate::wrapped::send_native;

/// Result of executing a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Transaction hash
    pub tx_hash: Hash,
    /// Whether execution succeeded
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Events generated during execution; empty when the transaction failed
    pub events: Vec<ExecutionEvent>,
}

impl ExecutionResult {
    fn failed(tx_hash: Hash, error: String) -> Self {
        ExecutionResult {
            tx_hash,
            success: false,
            error: Some(error),
            events: vec![],
        }
    }
}

/// Events emitted during transaction execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    TokenCreated {
        token: Address,
        creator: Address,
        symbol: String,
        total_supply: u64,
    },
    TokenTransfer {
        token: Address,
        from: Address,
        to: Address,
        amount: u64,
    },
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        amount: u64,
    },
    PoolCreated {
        pool_id: Hash,
        pool: Address,
        asset_a: Address,
        asset_b: Address,
    },
    Deposited {
        pool: Address,
        provider: Address,
        amount_a: u64,
        amount_b: u64,
        shares: u64,
    },
    Withdrawn {
        pool: Address,
        provider: Address,
        percentage: u8,
        amount_a: u64,
        amount_b: u64,
    },
    Swapped {
        pool: Address,
        account: Address,
        token_in: Address,
        token_out: Address,
        amount_in: u64,
        amount_out: u64,
    },
    Wrapped {
        account: Address,
        amount: u64,
    },
    Unwrapped {
        account: Address,
        amount: u64,
    },
}

/// Transaction executor
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    pub fn new() -> Self {
        Executor
    }

    /// Execute a single transaction.
    ///
    /// All ops run as one unit of work. A transaction that passes validation
    /// consumes its nonce even if an op fails; the failed ops leave no trace.
    pub fn execute_transaction<S: Storage>(
        &self,
        tx: &Transaction,
        state: &mut ChainState<S>,
    ) -> ExecutionResult {
        let tx_hash = match tx.hash() {
            Ok(h) => h,
            Err(e) => {
                return ExecutionResult::failed(
                    Hash::ZERO,
                    format!("Failed to hash transaction: {}", e),
                )
            }
        };

        debug!("Executing transaction {}", tx_hash);

        let validation = validate_transaction(tx, state);
        if !validation.is_valid {
            let error_msg = validation
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown validation error".to_string());
            warn!("Transaction {} rejected: {}", tx_hash, error_msg);
            return ExecutionResult::failed(tx_hash, error_msg);
        }

        let mut events = Vec::new();
        let outcome = atomically(state, |state| {
            for op in &tx.ops {
                self.execute_op(op, &tx.sender, state, &mut events)?;
            }
            Ok(())
        });

        state.increment_nonce(&tx.sender);

        match outcome {
            Ok(()) => {
                info!("Transaction {} executed successfully", tx_hash);
                ExecutionResult {
                    tx_hash,
                    success: true,
                    error: None,
                    events,
                }
            }
            Err(e) => {
                warn!("Transaction {} reverted: {}", tx_hash, e);
                ExecutionResult::failed(tx_hash, e.to_string())
            }
        }
    }

    /// Execute a single operation
    fn execute_op<S: Storage>(
        &self,
        op: &Op,
        sender: &Address,
        state: &mut ChainState<S>,
        events: &mut Vec<ExecutionEvent>,
    ) -> Result<(), VmError> {
        let router = Router::from_state(state);

        match op {
            Op::Transfer { to, amount } => {
                send_native(state, sender, to, *amount)?;
                events.push(ExecutionEvent::Transfer {
                    from: *sender,
                    to: *to,
                    amount: *amount,
                });
            }

            Op::TokenCreate {
                name,
                symbol,
                decimals,
                total_supply,
            } => {
                if name.is_empty() || symbol.is_empty() {
                    return Err(VmError::InvalidOperation(
                        "Token name and symbol must be non-empty".to_string(),
                    ));
                }
                if *total_supply == 0 {
                    return Err(VmError::ZeroAmount("token supply".to_string()));
                }
                let meta = TokenMeta::new(
                    name.clone(),
                    symbol.clone(),
                    *decimals,
                    *total_supply,
                    *sender,
                );
                let token = meta.token_id;
                if state.get_token(&token).is_some() {
                    return Err(VmError::TokenExists(token));
                }
                state.add_token(meta, sender);
                debug!("Created token {} ({}) with supply {}", token, symbol, total_supply);
                events.push(ExecutionEvent::TokenCreated {
                    token,
                    creator: *sender,
                    symbol: symbol.clone(),
                    total_supply: *total_supply,
                });
            }

            Op::TokenTransfer { token, to, amount } => {
                let have = state.token_balance(token, sender)?;
                if !state.token_transfer(token, sender, to, *amount)? {
                    return Err(VmError::InsufficientBalance {
                        have,
                        need: *amount,
                    });
                }
                debug!("Transferred {} of {} from {} to {}", amount, token, sender, to);
                events.push(ExecutionEvent::TokenTransfer {
                    token: *token,
                    from: *sender,
                    to: *to,
                    amount: *amount,
                });
            }

            Op::Approve {
                token,
                spender,
                amount,
            } => {
                state.token_approve(token, sender, spender, *amount)?;
                events.push(ExecutionEvent::Approval {
                    token: *token,
                    owner: *sender,
                    spender: *spender,
                    amount: *amount,
                });
            }

            Op::Deposit {
                token_x,
                token_y,
                amount_x,
                amount_y,
            } => {
                let pool_id = Router::canonical_identifier(token_x, token_y);
                let created = state.get_pool(&pool_id).is_none();

                let outcome = router.deposit(state, sender, token_x, token_y, *amount_x, *amount_y)?;
                let pool = router.resolve_pool(state, token_x, token_y)?;
                if created {
                    events.push(ExecutionEvent::PoolCreated {
                        pool_id,
                        pool: pool.address,
                        asset_a: pool.asset_a,
                        asset_b: pool.asset_b,
                    });
                }
                events.push(ExecutionEvent::Deposited {
                    pool: pool.address,
                    provider: *sender,
                    amount_a: outcome.amount_a,
                    amount_b: outcome.amount_b,
                    shares: outcome.shares,
                });
            }

            Op::Withdraw {
                token_x,
                token_y,
                percentage,
            } => {
                let outcome = router.withdraw(state, sender, token_x, token_y, *percentage)?;
                events.push(ExecutionEvent::Withdrawn {
                    pool: router.get_pool_address(state, token_x, token_y)?,
                    provider: *sender,
                    percentage: *percentage,
                    amount_a: outcome.amount_a,
                    amount_b: outcome.amount_b,
                });
            }

            Op::Swap {
                token_in,
                token_out,
                amount_in,
                min_amount_out,
            } => {
                let outcome =
                    router.swap(state, sender, token_in, token_out, *amount_in, *min_amount_out)?;
                events.push(ExecutionEvent::Swapped {
                    pool: router.get_pool_address(state, token_in, token_out)?,
                    account: *sender,
                    token_in: *token_in,
                    token_out: *token_out,
                    amount_in: *amount_in,
                    amount_out: outcome.amount_out,
                });
            }

            Op::WrapBaseAsset { amount } => {
                router.wrap_base_asset(state, sender, *amount)?;
                events.push(ExecutionEvent::Wrapped {
                    account: *sender,
                    amount: *amount,
                });
            }

            Op::UnwrapBaseAsset { amount } => {
                router.unwrap_base_asset(state, sender, *amount)?;
                events.push(ExecutionEvent::Unwrapped {
                    account: *sender,
                    amount: *amount,
                });
            }
        }

        Ok(())
    }

    /// Execute multiple transactions in order
    pub fn execute_transactions<S: Storage>(
        &self,
        txs: &[Transaction],
        state: &mut ChainState<S>,
    ) -> Vec<ExecutionResult> {
        txs.iter()
            .map(|tx| self.execute_transaction(tx, state))
            .collect()
    }
}
