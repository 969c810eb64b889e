use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Failures of a pool's share-accounting ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("Share ledger is owned by {owner}, caller {caller} may not mutate it")]
    NotLedgerOwner {
        caller: crate::crypto::Address,
        owner: crate::crypto::Address,
    },

    #[error("Insufficient shares for {provider}: have {have}, need {need}")]
    InsufficientShares {
        provider: crate::crypto::Address,
        have: u64,
        need: u64,
    },

    #[error("Share supply overflow")]
    SupplyOverflow,
}
