//! Pairswap State - State management and storage
//!
//! This crate holds the chain state (native accounts, token ledgers and the
//! pool registry), its snapshot/restore unit of work, storage backends and
//! the merkle state root.

pub mod error;
pub mod merkle;
pub mod state;
pub mod storage;

pub use error::StateError;
pub use merkle::compute_state_root;
pub use state::{ChainState, StateSnapshot};
pub use storage::{FileStorage, MemoryStorage, Storage};
