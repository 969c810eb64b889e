pub mod account;
pub mod genesis;
pub mod pool;
pub mod shares;
pub mod token;
pub mod transaction;

pub use account::Account;
pub use genesis::{GenesisConfig, GenesisToken};
pub use pool::{
    canonical_pair, compute_pool_id, order_amounts, pool_address, Pool, FEE_DENOMINATOR,
    PERCENT_SCALE, SHARE_PRECISION, SWAP_FEE, TOKENS_PER_SHARE,
};
pub use shares::ShareLedger;
pub use token::{compute_token_address, TokenLedger, TokenMeta};
pub use transaction::{Op, Transaction};
