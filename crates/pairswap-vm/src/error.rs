use pairswap_core::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    // Validation
    #[error("Tokens {token_a} / {token_b} are not supported by this pool")]
    TokensNotSupported { token_a: Address, token_b: Address },

    #[error("Invalid percentage {0}: must be in 1..=100")]
    InvalidPercentage(u8),

    #[error("Amount must be > 0: {0}")]
    ZeroAmount(String),

    // Authorization
    #[error("Insufficient allowance of {asset}: owner {owner}, spender {spender}, requested {requested}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        requested: u64,
        available: u64,
        asset: Address,
    },

    #[error("Caller {caller} is not the owner {owner}")]
    Unauthorized { caller: Address, owner: Address },

    #[error("Native transfers are only accepted from the wrapped asset contract, not {sender}")]
    UnauthorizedNativeSender { sender: Address },

    #[error("Reentrant call into {0}")]
    ReentrantCall(Address),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    // External dependencies
    #[error("Transfer of {amount} {asset} from {owner} to {recipient} failed")]
    TransferFailed {
        owner: Address,
        recipient: Address,
        amount: u64,
        asset: Address,
    },

    #[error("Wrapped token transfer of {amount} from {from} to {to} failed")]
    TokenTransferFailed { from: Address, to: Address, amount: u64 },

    #[error("Native transfer of {amount} to {recipient} failed")]
    NativeTransferFailed { recipient: Address, amount: u64 },

    // Invariants
    #[error("Deposit ratio {amount_a}:{amount_b} does not match reserves {reserve_a}:{reserve_b}")]
    InvalidRatio {
        reserve_a: u64,
        reserve_b: u64,
        amount_a: u64,
        amount_b: u64,
    },

    #[error("Slippage exceeded: output {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded { amount_out: u64, min_amount_out: u64 },

    #[error("Insufficient liquidity: requested {amount_out} of reserve {reserve_out}")]
    InsufficientLiquidity { reserve_out: u64, amount_out: u64 },

    #[error("Constant product would decrease from {k_before} to {k_after}")]
    InvariantViolated { k_before: u128, k_after: u128 },

    #[error("No shares to burn for {provider}")]
    NoSharesToBurn { provider: Address },

    #[error("Arithmetic overflow in {0}")]
    MathOverflow(&'static str),

    // Registry
    #[error("No liquidity pool found for {token_x} / {token_y}")]
    NoLiquidityPoolFound { token_x: Address, token_y: Address },

    #[error("Token not found: {0}")]
    TokenNotFound(Address),

    #[error("Token already exists: {0}")]
    TokenExists(Address),

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Share ledger error: {0}")]
    Shares(#[from] pairswap_core::ShareError),

    #[error("State error: {0}")]
    State(#[from] pairswap_state::StateError),

    #[error("Core error: {0}")]
    Core(#[from] pairswap_core::CoreError),
}
