//! Pairswap Core - Core types, cryptography, and serialization
//!
//! This crate provides the shared vocabulary of the pairswap exchange:
//! addresses, token ledgers, pool descriptors, share ledgers and the
//! signed transaction envelope.

pub mod crypto;
pub mod error;
pub mod serialize;
pub mod types;

pub use crypto::{hash_blake3, sign, verify, Address, Hash, KeyPair, SecretKey, Sig};
pub use error::{CoreError, ShareError};
pub use types::*;
