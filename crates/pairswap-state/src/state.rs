use std::collections::{BTreeMap, BTreeSet};

use pairswap_core::{
    serialize, Account, Address, GenesisConfig, Hash, Pool, TokenLedger, TokenMeta,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StateError;
use crate::merkle::compute_state_root;
use crate::storage::Storage;

/// Key prefixes for storage
mod keys {
    pub const ACCOUNT: &[u8] = b"acc:";
    pub const TOKEN: &[u8] = b"tok:";
    pub const POOL: &[u8] = b"pool:";
    pub const CHAIN_ID: &[u8] = b"chain:id";
    pub const ROUTER: &[u8] = b"chain:router";
    pub const WRAPPED_NATIVE: &[u8] = b"chain:wrapped";
}

/// The exchange's global state
pub struct ChainState<S: Storage> {
    storage: S,
    pub chain_id: u64,
    /// Router contract address; owner of every pool
    pub router: Address,
    /// Wrapped base-asset token contract address
    pub wrapped_native: Address,
    /// Native base-asset accounts
    pub accounts: BTreeMap<Address, Account>,
    /// Token contracts by address
    pub tokens: BTreeMap<Address, TokenLedger>,
    /// Pool registry keyed by canonical pair ID (append-only)
    pub pools: BTreeMap<Hash, Pool>,
    /// Contracts with an entrypoint currently executing
    entered: BTreeSet<Address>,
}

/// Copy of every mutable ledger, taken at the start of a unit of work
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    accounts: BTreeMap<Address, Account>,
    tokens: BTreeMap<Address, TokenLedger>,
    pools: BTreeMap<Hash, Pool>,
}

impl<S: Storage> ChainState<S> {
    /// Create a new chain state with given storage
    pub fn new(storage: S) -> Self {
        ChainState {
            storage,
            chain_id: 0,
            router: Address::ZERO,
            wrapped_native: Address::ZERO,
            accounts: BTreeMap::new(),
            tokens: BTreeMap::new(),
            pools: BTreeMap::new(),
            entered: BTreeSet::new(),
        }
    }

    /// Initialize state from genesis configuration
    pub fn init_genesis(&mut self, config: &GenesisConfig) -> Result<(), StateError> {
        info!("Initializing genesis state for chain {}", config.chain_id);

        self.chain_id = config.chain_id;
        self.router = config.router_address();
        self.wrapped_native = config.wrapped_native_address();

        for (address, balance) in &config.initial_balances {
            self.credit_native(address, *balance)?;
            debug!("Set initial balance for {}: {}", address, balance);
        }

        self.tokens.insert(
            self.wrapped_native,
            TokenLedger::new(config.wrapped_native_meta()),
        );

        for token in &config.tokens {
            let meta = token.meta();
            let mut ledger = TokenLedger::new(meta.clone());
            ledger.balances.insert(token.holder, token.total_supply);
            debug!(
                "Registered genesis token {} ({}) with supply {}",
                meta.token_id, meta.symbol, meta.total_supply
            );
            self.tokens.insert(meta.token_id, ledger);
        }

        self.persist_state()?;

        info!(
            "Genesis state initialized: router {}, wrapped native {}",
            self.router, self.wrapped_native
        );
        Ok(())
    }

    /// Persist current state to storage
    pub fn persist_state(&mut self) -> Result<(), StateError> {
        for (key, value) in self.entries()? {
            self.storage.put(&key, &value);
        }
        self.storage.commit()
    }

    /// Load state from storage into memory
    pub fn load_from_storage(&mut self) -> Result<(), StateError> {
        self.accounts.clear();
        self.tokens.clear();
        self.pools.clear();
        self.entered.clear();

        let chain_id = self
            .storage
            .get(keys::CHAIN_ID)
            .ok_or_else(|| StateError::NotInitialized("missing chain id".to_string()))?;
        self.chain_id = decode(&chain_id)?;
        self.router = self.load_address(keys::ROUTER)?;
        self.wrapped_native = self.load_address(keys::WRAPPED_NATIVE)?;

        for (address, account) in self.load_prefixed::<Account>(keys::ACCOUNT)? {
            if let Some(address) = Address::from_slice(&address) {
                self.accounts.insert(address, account);
            }
        }

        for (address, ledger) in self.load_prefixed::<TokenLedger>(keys::TOKEN)? {
            if let Some(address) = Address::from_slice(&address) {
                self.tokens.insert(address, ledger);
            }
        }

        for (pool_id, pool) in self.load_prefixed::<Pool>(keys::POOL)? {
            if let Some(pool_id) = Hash::from_slice(&pool_id) {
                self.pools.insert(pool_id, pool);
            }
        }

        info!(
            "Loaded state: {} accounts, {} tokens, {} pools",
            self.accounts.len(),
            self.tokens.len(),
            self.pools.len()
        );
        Ok(())
    }

    /// Compute the current state root
    pub fn compute_state_root(&self) -> Result<Hash, StateError> {
        let entries = self.entries()?;
        Ok(compute_state_root(
            entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())),
        ))
    }

    fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        let mut entries = Vec::new();

        entries.push((keys::CHAIN_ID.to_vec(), encode(&self.chain_id)?));
        entries.push((keys::ROUTER.to_vec(), encode(&self.router)?));
        entries.push((keys::WRAPPED_NATIVE.to_vec(), encode(&self.wrapped_native)?));

        for (address, account) in &self.accounts {
            entries.push(([keys::ACCOUNT, address.as_bytes()].concat(), encode(account)?));
        }
        for (address, ledger) in &self.tokens {
            entries.push(([keys::TOKEN, address.as_bytes()].concat(), encode(ledger)?));
        }
        for (pool_id, pool) in &self.pools {
            entries.push(([keys::POOL, pool_id.as_bytes()].concat(), encode(pool)?));
        }

        Ok(entries)
    }

    fn load_prefixed<T: DeserializeOwned>(
        &self,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, T)>, StateError> {
        let mut loaded = Vec::new();
        for key in self.storage.keys_with_prefix(prefix) {
            if let Some(value) = self.storage.get(&key) {
                loaded.push((key[prefix.len()..].to_vec(), decode(&value)?));
            }
        }
        Ok(loaded)
    }

    fn load_address(&self, key: &[u8]) -> Result<Address, StateError> {
        let value = self.storage.get(key).ok_or_else(|| {
            StateError::NotInitialized(String::from_utf8_lossy(key).into_owned())
        })?;
        decode(&value)
    }

    // Unit of work

    /// Capture every mutable ledger
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            accounts: self.accounts.clone(),
            tokens: self.tokens.clone(),
            pools: self.pools.clone(),
        }
    }

    /// Discard all mutations made since `snapshot` was taken
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.accounts = snapshot.accounts;
        self.tokens = snapshot.tokens;
        self.pools = snapshot.pools;
    }

    // Reentrancy flags

    /// Mark `contract` as executing; false if it already is
    pub fn enter(&mut self, contract: &Address) -> bool {
        self.entered.insert(*contract)
    }

    pub fn exit(&mut self, contract: &Address) {
        self.entered.remove(contract);
    }

    pub fn is_entered(&self, contract: &Address) -> bool {
        self.entered.contains(contract)
    }

    // Native accounts

    pub fn get_account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn native_balance(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.balance)
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.nonce)
    }

    pub fn increment_nonce(&mut self, address: &Address) {
        let account = self.accounts.entry(*address).or_default();
        account.nonce = account.nonce.saturating_add(1);
    }

    pub fn credit_native(&mut self, address: &Address, amount: u64) -> Result<(), StateError> {
        if !self.accounts.entry(*address).or_default().credit(amount) {
            return Err(StateError::BalanceOverflow(address.to_hex()));
        }
        Ok(())
    }

    pub fn debit_native(&mut self, address: &Address, amount: u64) -> Result<(), StateError> {
        let have = self.native_balance(address);
        if have < amount {
            return Err(StateError::InsufficientBalance { have, need: amount });
        }
        if let Some(account) = self.accounts.get_mut(address) {
            account.debit(amount);
        }
        Ok(())
    }

    /// Move native base asset between accounts
    pub fn transfer_native(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        self.debit_native(from, amount)?;
        self.credit_native(to, amount)
    }

    // Token contracts

    pub fn add_token(&mut self, meta: TokenMeta, holder: &Address) {
        let mut ledger = TokenLedger::new(meta);
        let supply = ledger.meta.total_supply;
        if supply > 0 {
            ledger.balances.insert(*holder, supply);
        }
        self.tokens.insert(ledger.token_id(), ledger);
    }

    pub fn get_token(&self, token: &Address) -> Option<&TokenLedger> {
        self.tokens.get(token)
    }

    fn token(&self, token: &Address) -> Result<&TokenLedger, StateError> {
        self.tokens
            .get(token)
            .ok_or_else(|| StateError::TokenNotFound(token.to_hex()))
    }

    fn token_mut(&mut self, token: &Address) -> Result<&mut TokenLedger, StateError> {
        self.tokens
            .get_mut(token)
            .ok_or_else(|| StateError::TokenNotFound(token.to_hex()))
    }

    pub fn token_balance(&self, token: &Address, owner: &Address) -> Result<u64, StateError> {
        Ok(self.token(token)?.balance_of(owner))
    }

    pub fn token_allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<u64, StateError> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    pub fn token_approve(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        self.token_mut(token)?.approve(owner, spender, amount);
        Ok(())
    }

    pub fn token_transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<bool, StateError> {
        Ok(self.token_mut(token)?.transfer(from, to, amount))
    }

    pub fn token_transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<bool, StateError> {
        Ok(self.token_mut(token)?.transfer_from(spender, from, to, amount))
    }

    pub fn token_mint(&mut self, token: &Address, to: &Address, amount: u64) -> Result<bool, StateError> {
        Ok(self.token_mut(token)?.mint(to, amount))
    }

    pub fn token_burn(&mut self, token: &Address, from: &Address, amount: u64) -> Result<bool, StateError> {
        Ok(self.token_mut(token)?.burn(from, amount))
    }

    // Pool registry

    /// Register a pool; existing entries are never replaced
    pub fn add_pool(&mut self, pool: Pool) {
        self.pools.entry(pool.pool_id).or_insert(pool);
    }

    pub fn get_pool(&self, pool_id: &Hash) -> Option<&Pool> {
        self.pools.get(pool_id)
    }

    pub fn get_pool_mut(&mut self, pool_id: &Hash) -> Option<&mut Pool> {
        self.pools.get_mut(pool_id)
    }

    /// Rollback storage changes that were staged but not committed
    pub fn rollback(&mut self) {
        self.storage.rollback();
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StateError> {
    serialize::to_bytes(value).map_err(|e| StateError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StateError> {
    serialize::from_bytes(bytes).map_err(|e| StateError::Serialization(e.to_string()))
}
