use serde::{Deserialize, Serialize};

/// Native-asset account in the chain state
///
/// Fungible token balances live in each token's own ledger; an account only
/// carries the base asset and its transaction nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    /// Native base-asset balance
    pub balance: u64,
    /// Number of transactions executed by this account
    pub nonce: u64,
}

impl Account {
    pub fn new(balance: u64) -> Self {
        Account { balance, nonce: 0 }
    }

    /// Credit native balance, returning false on overflow
    pub fn credit(&mut self, amount: u64) -> bool {
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Debit native balance, returning false when the balance is short
    pub fn debit(&mut self, amount: u64) -> bool {
        if self.balance < amount {
            return false;
        }
        self.balance -= amount;
        true
    }
}
