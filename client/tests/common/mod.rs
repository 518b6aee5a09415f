#![allow(dead_code)]

use orange_staking::states::{StakingPool, UserStake};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use staking_client::error::{ClientError, Result};
use staking_client::instructions::utils::PoolAddresses;
use staking_client::{PoolClient, StakingRpc, TransactionRecord};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory node: accounts, token balances and history set up by the test.
#[derive(Default)]
pub struct MockRpc {
    pub accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    pub token_balances: Mutex<HashMap<Pubkey, u64>>,
    pub balances: Mutex<HashMap<Pubkey, u64>>,
    /// Reads of these addresses fail with a transport error.
    pub unreachable: Mutex<HashSet<Pubkey>>,
    /// Token accounts whose data does not unpack.
    pub garbled_token_accounts: Mutex<HashSet<Pubkey>>,
    /// Latency of successive account reads; the data is captured before
    /// waiting, so a slow read returns what was stored when it started.
    pub read_delays: Mutex<VecDeque<Duration>>,
    pub transactions: Mutex<Vec<TransactionRecord>>,
    /// Transaction history reads fail with a transport error.
    pub history_down: AtomicBool,
    pub requested_limits: Mutex<Vec<usize>>,
    pub sent: Mutex<Vec<Transaction>>,
    /// Custom program error returned by the next sends.
    pub reject_with: Mutex<Option<u32>>,
    pub account_reads: AtomicUsize,
}

impl MockRpc {
    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(address, data);
    }

    pub fn set_unreachable(&self, address: Pubkey) {
        self.unreachable.lock().unwrap().insert(address);
    }

    pub fn delay_reads(&self, delays: &[Duration]) {
        self.read_delays.lock().unwrap().extend(delays.iter().copied());
    }

    pub fn reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }

    fn check_reachable(&self, address: &Pubkey) -> Result<()> {
        if self.unreachable.lock().unwrap().contains(address) {
            return Err(ClientError::transport(format!("{address}: connection reset")));
        }
        Ok(())
    }
}

impl StakingRpc for MockRpc {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        self.check_reachable(address)?;
        let data = self.accounts.lock().unwrap().get(address).cloned();
        let delay = self.read_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(data)
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64> {
        self.check_reachable(token_account)?;
        if self.garbled_token_accounts.lock().unwrap().contains(token_account) {
            return Err(ClientError::malformed("token", "invalid account data"));
        }
        Ok(self
            .token_balances
            .lock()
            .unwrap()
            .get(token_account)
            .copied()
            .unwrap_or_default())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.check_reachable(address)?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or_default())
    }

    async fn get_recent_transactions(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>> {
        self.check_reachable(address)?;
        if self.history_down.load(Ordering::SeqCst) {
            return Err(ClientError::transport("signature history unavailable"));
        }
        self.requested_limits.lock().unwrap().push(limit);
        let transactions = self.transactions.lock().unwrap();
        Ok(transactions.iter().take(limit).cloned().collect())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        if let Some(code) = *self.reject_with.lock().unwrap() {
            return Err(ClientError::rejected(code));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }
}

pub fn addresses() -> PoolAddresses {
    PoolAddresses::derive(&orange_staking::orange_mint::id(), &orange_staking::id()).unwrap()
}

pub fn pool_with_index(reward_per_token_stored: u128) -> StakingPool {
    let addresses = addresses();
    StakingPool {
        authority: Pubkey::new_unique(),
        stake_mint: addresses.stake_mint,
        stake_vault: addresses.stake_vault,
        reward_vault: addresses.reward_vault,
        total_staked: 1_000_000,
        total_stakers: 1,
        reward_duration: 86_400,
        last_reward_time: 1_700_000_000,
        reward_per_token_stored,
        min_stake_amount: 1_000_000,
        instant_unstake_fee: 100,
        bump: addresses.pool_bump,
    }
}

pub fn position(owner: Pubkey, staked_amount: u64, paid: u128) -> UserStake {
    UserStake {
        owner,
        pool: addresses().pool,
        staked_amount,
        stake_time: 1_700_000_000,
        reward_per_token_paid: paid,
        pending_rewards: 0,
        total_rewards_claimed: 0,
    }
}

/// A client over a node holding `pool`.
pub fn client_with_pool(pool: &StakingPool) -> PoolClient<MockRpc> {
    let rpc = MockRpc::default();
    rpc.set_account(addresses().pool, pool.pack().to_vec());
    PoolClient::new(rpc, &orange_staking::orange_mint::id(), &orange_staking::id()).unwrap()
}
