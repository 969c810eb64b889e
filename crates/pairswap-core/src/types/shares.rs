use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::Address;
use crate::error::ShareError;

/// Liquidity-provider share ledger of a single pool.
///
/// Only the owning pool may mint or burn; `total_shares` always equals the
/// sum of `balances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    owner: Address,
    balances: BTreeMap<Address, u64>,
    total_shares: u64,
}

impl ShareLedger {
    pub fn new(owner: Address) -> Self {
        ShareLedger {
            owner,
            balances: BTreeMap::new(),
            total_shares: 0,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn balance_of(&self, provider: &Address) -> u64 {
        self.balances.get(provider).copied().unwrap_or(0)
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    /// Providers with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.balances.iter()
    }

    pub fn mint(&mut self, caller: &Address, provider: &Address, amount: u64) -> Result<(), ShareError> {
        self.ensure_owner(caller)?;
        let total = self
            .total_shares
            .checked_add(amount)
            .ok_or(ShareError::SupplyOverflow)?;
        if amount == 0 {
            return Ok(());
        }
        // balance <= total, so it cannot overflow once the total does not
        *self.balances.entry(*provider).or_insert(0) += amount;
        self.total_shares = total;
        Ok(())
    }

    pub fn burn(&mut self, caller: &Address, provider: &Address, amount: u64) -> Result<(), ShareError> {
        self.ensure_owner(caller)?;
        let have = self.balance_of(provider);
        if have < amount {
            return Err(ShareError::InsufficientShares {
                provider: *provider,
                have,
                need: amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        if have == amount {
            self.balances.remove(provider);
        } else {
            self.balances.insert(*provider, have - amount);
        }
        self.total_shares -= amount;
        Ok(())
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), ShareError> {
        if *caller != self.owner {
            return Err(ShareError::NotLedgerOwner {
                caller: *caller,
                owner: self.owner,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn pool() -> Address {
        Address::derive(b"pool", b"shares-test")
    }

    #[test]
    fn test_mint_and_burn() {
        let provider = KeyPair::generate().address;
        let mut ledger = ShareLedger::new(pool());

        ledger.mint(&pool(), &provider, 1000).unwrap();
        assert_eq!(ledger.balance_of(&provider), 1000);
        assert_eq!(ledger.total_shares(), 1000);

        ledger.burn(&pool(), &provider, 400).unwrap();
        assert_eq!(ledger.balance_of(&provider), 600);
        assert_eq!(ledger.total_shares(), 600);
    }

    #[test]
    fn test_burn_more_than_balance() {
        let provider = KeyPair::generate().address;
        let mut ledger = ShareLedger::new(pool());
        ledger.mint(&pool(), &provider, 10).unwrap();

        let err = ledger.burn(&pool(), &provider, 11).unwrap_err();
        assert_eq!(
            err,
            ShareError::InsufficientShares {
                provider,
                have: 10,
                need: 11
            }
        );
        assert_eq!(ledger.total_shares(), 10);
    }

    #[test]
    fn test_only_owner_mutates() {
        let provider = KeyPair::generate().address;
        let mut ledger = ShareLedger::new(pool());

        let err = ledger.mint(&provider, &provider, 5).unwrap_err();
        assert!(matches!(err, ShareError::NotLedgerOwner { .. }));
        assert_eq!(ledger.total_shares(), 0);
    }

    #[test]
    fn test_total_matches_sum_of_balances() {
        let mut ledger = ShareLedger::new(pool());
        let providers: Vec<Address> = (0..4).map(|_| KeyPair::generate().address).collect();
        for (i, p) in providers.iter().enumerate() {
            ledger.mint(&pool(), p, 100 * (i as u64 + 1)).unwrap();
        }
        ledger.burn(&pool(), &providers[2], 300).unwrap();

        let sum: u64 = ledger.holders().map(|(_, amount)| *amount).sum();
        assert_eq!(sum, ledger.total_shares());
        assert_eq!(ledger.holders().count(), 3);
    }
}
