use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::hash_blake3;
use crate::error::CoreError;

/// A 32-byte account or contract address.
///
/// Externally owned accounts use their Ed25519 public key as address.
/// Contracts (router, wrapped asset, pools, tokens) use an address derived
/// from a domain tag and seed, which never collides with a key in practice.
/// The derived `Ord` is the total order used to canonicalize asset pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Some(Address(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes).ok_or(CoreError::InvalidAddress)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derive a contract address from a domain tag and seed bytes
    pub fn derive(domain: &[u8], seed: &[u8]) -> Self {
        let mut data = Vec::with_capacity(domain.len() + seed.len() + 1);
        data.extend_from_slice(domain);
        data.push(b':');
        data.extend_from_slice(seed);
        Address(*hash_blake3(&data).as_bytes())
    }

    /// Convert to ed25519-dalek VerifyingKey for signature verification
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, CoreError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidAddress)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Ed25519 secret key (32 bytes seed)
/// Not serializable to prevent accidental exposure
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    /// Generate a new random secret key
    pub fn generate() -> Self {
        SecretKey(SigningKey::generate(&mut OsRng))
    }

    /// Create from raw bytes (seed)
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        SecretKey(SigningKey::from_bytes(bytes))
    }

    /// Address owned by this key
    pub fn address(&self) -> Address {
        Address(self.0.verifying_key().to_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.0
    }

    /// Export raw bytes (use with caution)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidAddress);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(&arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// An account key pair
#[derive(Clone)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub address: Address,
}

impl KeyPair {
    pub fn generate() -> Self {
        let secret = SecretKey::generate();
        let address = secret.address();
        KeyPair { secret, address }
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let address = secret.address();
        KeyPair { secret, address }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
