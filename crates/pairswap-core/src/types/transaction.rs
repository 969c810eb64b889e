use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, sign, verify, Address, Hash, SecretKey, Sig};
use crate::error::CoreError;
use crate::serialize;

/// Operations that can be included in a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Send native base asset
    Transfer { to: Address, amount: u64 },
    /// Create a fungible token; the sender receives the whole supply
    TokenCreate {
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u64,
    },
    /// Send fungible tokens
    TokenTransfer {
        token: Address,
        to: Address,
        amount: u64,
    },
    /// Allow `spender` to pull up to `amount` of `token` from the sender
    Approve {
        token: Address,
        spender: Address,
        amount: u64,
    },
    /// Add liquidity to the pool for an unordered pair, creating it if needed
    Deposit {
        token_x: Address,
        token_y: Address,
        amount_x: u64,
        amount_y: u64,
    },
    /// Remove a percentage of the sender's shares from a pool
    Withdraw {
        token_x: Address,
        token_y: Address,
        percentage: u8,
    },
    /// Swap an exact input amount with a minimum output guard
    Swap {
        token_in: Address,
        token_out: Address,
        amount_in: u64,
        min_amount_out: u64,
    },
    /// Convert native base asset into the wrapped token
    WrapBaseAsset { amount: u64 },
    /// Redeem wrapped tokens for native base asset
    UnwrapBaseAsset { amount: u64 },
}

/// A signed batch of operations executed atomically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    /// Must equal the account nonce + 1
    pub nonce: u64,
    pub ops: Vec<Op>,
    /// Signature over the transaction (excluding this field)
    pub signature: Sig,
}

#[derive(Serialize)]
struct TransactionSigningData<'a> {
    sender: &'a Address,
    nonce: u64,
    ops: &'a [Op],
}

impl Transaction {
    /// Create a new unsigned transaction
    pub fn new(sender: Address, nonce: u64, ops: Vec<Op>) -> Self {
        Transaction {
            sender,
            nonce,
            ops,
            signature: Sig::default(),
        }
    }

    pub fn signing_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serialize::to_bytes(&TransactionSigningData {
            sender: &self.sender,
            nonce: self.nonce,
            ops: &self.ops,
        })
    }

    pub fn sign(&mut self, secret_key: &SecretKey) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        self.signature = sign(secret_key, &bytes);
        Ok(())
    }

    pub fn new_signed(
        sender: Address,
        nonce: u64,
        ops: Vec<Op>,
        secret_key: &SecretKey,
    ) -> Result<Self, CoreError> {
        let mut tx = Self::new(sender, nonce, ops);
        tx.sign(secret_key)?;
        Ok(tx)
    }

    pub fn verify_signature(&self) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        verify(&self.sender, &bytes, &self.signature)
    }

    pub fn hash(&self) -> Result<Hash, CoreError> {
        let bytes = serialize::to_bytes(self)?;
        Ok(hash_blake3(&bytes))
    }

    /// Native base asset the sender must hold up front
    pub fn native_spend(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Transfer { amount, .. } | Op::WrapBaseAsset { amount } => *amount,
                _ => 0,
            })
            .fold(0u64, |acc, amount| acc.saturating_add(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn swap_op() -> Op {
        Op::Swap {
            token_in: Address::derive(b"token", b"a"),
            token_out: Address::derive(b"token", b"b"),
            amount_in: 250,
            min_amount_out: 2,
        }
    }

    #[test]
    fn test_transaction_signing() {
        let sender = KeyPair::generate();
        let tx = Transaction::new_signed(sender.address, 1, vec![swap_op()], &sender.secret).unwrap();
        assert!(tx.verify_signature().is_ok());
    }

    #[test]
    fn test_transaction_wrong_signature() {
        let sender = KeyPair::generate();
        let wrong_signer = KeyPair::generate();
        let tx =
            Transaction::new_signed(sender.address, 1, vec![swap_op()], &wrong_signer.secret).unwrap();
        assert!(tx.verify_signature().is_err());
    }

    #[test]
    fn test_tampered_ops_fail_verification() {
        let sender = KeyPair::generate();
        let mut tx = Transaction::new_signed(sender.address, 1, vec![swap_op()], &sender.secret).unwrap();
        tx.ops.push(Op::WrapBaseAsset { amount: 1 });
        assert!(tx.verify_signature().is_err());
    }

    #[test]
    fn test_native_spend() {
        let sender = KeyPair::generate();
        let tx = Transaction::new(
            sender.address,
            1,
            vec![
                Op::Transfer {
                    to: sender.address,
                    amount: 100,
                },
                Op::WrapBaseAsset { amount: 50 },
                swap_op(),
            ],
        );
        assert_eq!(tx.native_spend(), 150);
    }
}
