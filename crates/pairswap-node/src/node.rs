use anyhow::{bail, Result};
use pairswap_core::{Address, Hash, Transaction};
use pairswap_state::{ChainState, FileStorage};
use pairswap_vm::{pool, ExecutionResult, Executor, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::NodeConfig;

/// A single-process exchange node: chain state persisted in the data
/// directory, advanced by applying signed transactions
pub struct Node {
    config: NodeConfig,
    state: ChainState<FileStorage>,
    executor: Executor,
}

/// Read-only view of one pool
#[derive(Debug, Serialize)]
pub struct PoolSummary {
    pub pool_id: Hash,
    pub address: Address,
    pub asset_a: Address,
    pub asset_b: Address,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub total_shares: u64,
    pub holders: Vec<(Address, u64)>,
}

impl Node {
    /// Open the node's state, writing genesis on first start
    pub fn open(config: NodeConfig) -> Result<Self> {
        let storage = FileStorage::new(config.state_path())?;
        let fresh = storage.is_empty();
        let mut state = ChainState::new(storage);

        if fresh {
            info!("No state found in {:?}, initializing genesis", config.data_dir);
            state.init_genesis(&config.to_genesis_config()?)?;
        } else {
            state.load_from_storage()?;
            if state.chain_id != config.chain_id {
                bail!(
                    "State in {:?} belongs to chain {}, config says {}",
                    config.data_dir,
                    state.chain_id,
                    config.chain_id
                );
            }
        }

        info!(
            "Node ready: chain {}, router {}, state root {}",
            state.chain_id,
            state.router,
            state.compute_state_root()?
        );

        Ok(Node {
            config,
            state,
            executor: Executor::new(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn state(&self) -> &ChainState<FileStorage> {
        &self.state
    }

    pub fn router(&self) -> Router {
        Router::from_state(&self.state)
    }

    /// Execute transactions in order and persist the resulting state
    pub fn apply(&mut self, txs: &[Transaction]) -> Result<Vec<ExecutionResult>> {
        let results = self.executor.execute_transactions(txs, &mut self.state);
        self.state.persist_state()?;

        let failed = results.iter().filter(|r| !r.success).count();
        if failed > 0 {
            warn!("{} of {} transactions failed", failed, results.len());
        }
        info!(
            "Applied {} transactions, state root {}",
            results.len(),
            self.state.compute_state_root()?
        );
        Ok(results)
    }

    /// Summary of the pool for a pair, if it exists
    pub fn pool_summary(&self, token_x: &Address, token_y: &Address) -> Result<Option<PoolSummary>> {
        let Ok(entry) = self.router().resolve_pool(&self.state, token_x, token_y) else {
            return Ok(None);
        };
        let (reserve_a, reserve_b) = pool::get_balances(&self.state, entry)?;

        Ok(Some(PoolSummary {
            pool_id: entry.pool_id,
            address: entry.address,
            asset_a: entry.asset_a,
            asset_b: entry.asset_b,
            reserve_a,
            reserve_b,
            total_shares: entry.shares.total_shares(),
            holders: entry
                .shares
                .holders()
                .map(|(holder, shares)| (*holder, *shares))
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generate_sample_config;
    use pairswap_core::Op;

    fn config_in(dir: &std::path::Path) -> (NodeConfig, pairswap_core::KeyPair) {
        let (mut config, user) = generate_sample_config();
        config.data_dir = dir.to_path_buf();
        (config, user)
    }

    #[test]
    fn test_open_writes_genesis_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let (config, user) = config_in(dir.path());

        let mut node = Node::open(config.clone()).unwrap();
        assert_eq!(node.state().native_balance(&user.address), 1_000_000_000);

        let tx = Transaction::new_signed(
            user.address,
            1,
            vec![Op::WrapBaseAsset { amount: 1_000 }],
            &user.secret,
        )
        .unwrap();
        let results = node.apply(&[tx]).unwrap();
        assert!(results[0].success);
        drop(node);

        let node = Node::open(config).unwrap();
        let wrapped = node.state().wrapped_native;
        assert_eq!(node.state().native_balance(&user.address), 999_999_000);
        assert_eq!(node.state().token_balance(&wrapped, &user.address).unwrap(), 1_000);
        assert_eq!(node.state().nonce(&user.address), 1);
    }

    #[test]
    fn test_chain_id_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let (mut config, _) = config_in(dir.path());
        Node::open(config.clone()).unwrap();

        config.chain_id = 2;
        assert!(Node::open(config).is_err());
    }

    #[test]
    fn test_pool_summary() {
        let dir = tempfile::tempdir().unwrap();
        let (config, user) = config_in(dir.path());
        let genesis = config.to_genesis_config().unwrap();
        let x = genesis.tokens[0].meta().token_id;
        let y = genesis.tokens[1].meta().token_id;
        let mut node = Node::open(config).unwrap();
        assert!(node.pool_summary(&x, &y).unwrap().is_none());

        let pool = Router::predicted_pool_address(&x, &y);
        let ops = vec![
            Op::Approve { token: x, spender: pool, amount: 5_000 },
            Op::Approve { token: y, spender: pool, amount: 5_000 },
            Op::Deposit { token_x: x, token_y: y, amount_x: 5_000, amount_y: 5_000 },
        ];
        let tx = Transaction::new_signed(user.address, 1, ops, &user.secret).unwrap();
        assert!(node.apply(&[tx]).unwrap()[0].success);

        let summary = node.pool_summary(&y, &x).unwrap().unwrap();
        assert_eq!(summary.address, pool);
        assert_eq!((summary.reserve_a, summary.reserve_b), (5_000, 5_000));
        assert_eq!(summary.total_shares, 1_000);
        assert_eq!(summary.holders, vec![(user.address, 1_000)]);
    }
}
