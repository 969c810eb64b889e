use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::Address;

/// Metadata for a fungible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// Token contract address, also the asset identity used by pools
    pub token_id: Address,
    /// Human-readable name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Outstanding supply
    pub total_supply: u64,
    /// Creator/publisher
    pub creator: Address,
}

impl TokenMeta {
    /// Create metadata and compute the deterministic token address
    pub fn new(name: String, symbol: String, decimals: u8, total_supply: u64, creator: Address) -> Self {
        let token_id = compute_token_address(&name, &symbol, decimals, total_supply, &creator);
        TokenMeta {
            token_id,
            name,
            symbol,
            decimals,
            total_supply,
            creator,
        }
    }

    /// Metadata for the wrapped base asset; supply starts at zero and
    /// tracks deposits of the native asset.
    pub fn wrapped_native(token_id: Address, name: &str, symbol: &str, decimals: u8) -> Self {
        TokenMeta {
            token_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            total_supply: 0,
            creator: Address::ZERO,
        }
    }
}

/// Compute a deterministic token address from metadata
pub fn compute_token_address(
    name: &str,
    symbol: &str,
    decimals: u8,
    total_supply: u64,
    creator: &Address,
) -> Address {
    let mut data = Vec::new();
    data.extend_from_slice(creator.as_bytes());
    data.extend_from_slice(name.as_bytes());
    data.extend_from_slice(symbol.as_bytes());
    data.push(decimals);
    data.extend_from_slice(&total_supply.to_le_bytes());
    Address::derive(b"token", &data)
}

/// Balance and allowance book of one fungible token contract.
///
/// Mutators report failure with `false` rather than an error, the way an
/// external token contract answers `transfer`/`transferFrom`; callers turn
/// a `false` into their own typed error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    pub meta: TokenMeta,
    pub balances: BTreeMap<Address, u64>,
    /// (owner, spender) -> remaining allowance
    pub allowances: BTreeMap<(Address, Address), u64>,
}

impl TokenLedger {
    pub fn new(meta: TokenMeta) -> Self {
        TokenLedger {
            meta,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn token_id(&self) -> Address {
        self.meta.token_id
    }

    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Set the allowance `spender` may pull from `owner`
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> bool {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return false;
        }
        if from == to || amount == 0 {
            return true;
        }
        let Some(to_balance) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        true
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> bool {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return false;
        }
        if !self.transfer(from, to, amount) {
            return false;
        }
        self.approve(from, spender, allowance - amount);
        true
    }

    /// Create new units, returning false if supply would overflow
    pub fn mint(&mut self, to: &Address, amount: u64) -> bool {
        let Some(supply) = self.meta.total_supply.checked_add(amount) else {
            return false;
        };
        let Some(balance) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.meta.total_supply = supply;
        self.set_balance(to, balance);
        true
    }

    /// Destroy units held by `from`
    pub fn burn(&mut self, from: &Address, amount: u64) -> bool {
        let balance = self.balance_of(from);
        if balance < amount {
            return false;
        }
        self.meta.total_supply = self.meta.total_supply.saturating_sub(amount);
        self.set_balance(from, balance - amount);
        true
    }

    fn set_balance(&mut self, owner: &Address, amount: u64) {
        if amount == 0 {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn ledger_with(holder: &Address, amount: u64) -> TokenLedger {
        let meta = TokenMeta::new("Token".to_string(), "TOK".to_string(), 6, amount, *holder);
        let mut ledger = TokenLedger::new(meta);
        ledger.balances.insert(*holder, amount);
        ledger
    }

    #[test]
    fn test_token_address_deterministic() {
        let creator = KeyPair::generate();
        let t1 = TokenMeta::new("Token".to_string(), "TOK".to_string(), 6, 1_000_000, creator.address);
        let t2 = TokenMeta::new("Token".to_string(), "TOK".to_string(), 6, 1_000_000, creator.address);
        assert_eq!(t1.token_id, t2.token_id);
    }

    #[test]
    fn test_transfer() {
        let alice = KeyPair::generate().address;
        let bob = KeyPair::generate().address;
        let mut ledger = ledger_with(&alice, 1000);

        assert!(ledger.transfer(&alice, &bob, 300));
        assert_eq!(ledger.balance_of(&alice), 700);
        assert_eq!(ledger.balance_of(&bob), 300);

        assert!(!ledger.transfer(&alice, &bob, 701));
        assert_eq!(ledger.balance_of(&alice), 700);
    }

    #[test]
    fn test_transfer_to_self_keeps_balance() {
        let alice = KeyPair::generate().address;
        let mut ledger = ledger_with(&alice, 1000);
        assert!(ledger.transfer(&alice, &alice, 400));
        assert_eq!(ledger.balance_of(&alice), 1000);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let alice = KeyPair::generate().address;
        let pool = Address::derive(b"pool", b"test");
        let mut ledger = ledger_with(&alice, 1000);

        assert!(!ledger.transfer_from(&pool, &alice, &pool, 100));

        ledger.approve(&alice, &pool, 150);
        assert!(ledger.transfer_from(&pool, &alice, &pool, 100));
        assert_eq!(ledger.allowance(&alice, &pool), 50);
        assert_eq!(ledger.balance_of(&pool), 100);

        assert!(!ledger.transfer_from(&pool, &alice, &pool, 51));
        assert_eq!(ledger.allowance(&alice, &pool), 50);
    }

    #[test]
    fn test_transfer_from_keeps_allowance_when_balance_short() {
        let alice = KeyPair::generate().address;
        let pool = Address::derive(b"pool", b"test");
        let mut ledger = ledger_with(&alice, 10);
        ledger.approve(&alice, &pool, 100);

        assert!(!ledger.transfer_from(&pool, &alice, &pool, 50));
        assert_eq!(ledger.allowance(&alice, &pool), 100);
        assert_eq!(ledger.balance_of(&alice), 10);
    }

    #[test]
    fn test_mint_and_burn_track_supply() {
        let holder = KeyPair::generate().address;
        let token_id = Address::derive(b"wrapped", b"native");
        let mut ledger = TokenLedger::new(TokenMeta::wrapped_native(token_id, "Wrapped", "WNAT", 6));

        assert!(ledger.mint(&holder, 500));
        assert_eq!(ledger.meta.total_supply, 500);
        assert!(!ledger.burn(&holder, 501));
        assert!(ledger.burn(&holder, 200));
        assert_eq!(ledger.meta.total_supply, 300);
        assert_eq!(ledger.balance_of(&holder), 300);
    }
}
