use log::{debug, warn};
use orange_staking::rewards::RewardCalculator;
use orange_staking::states::{StakingPool, UserStake};
use serde::Serialize;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};

use crate::activity::{classify, ActivityEvent};
use crate::error::{ClientError, Result};
use crate::instructions::rpc::{send_txn, StakingRpc};
use crate::instructions::utils::{deserialize_anchor_account, PoolAddresses};

/// A user-level value that is either what the node returned, or a zero-valued
/// stand-in because the read failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fetched<T> {
    Loaded(T),
    Defaulted,
}

impl<T> Fetched<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetched::Loaded(value) => Some(value),
            Fetched::Defaulted => None,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Fetched::Defaulted)
    }
}

impl<T: Default + Clone> Fetched<T> {
    /// The loaded value, or `T::default()` when defaulted.
    pub fn value(&self) -> T {
        self.loaded().cloned().unwrap_or_default()
    }
}

/// Pool state, and the state of one user when one was asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub pool: StakingPool,
    /// `Loaded(None)` when the user has never staked, or when no user was given.
    pub user_stake: Fetched<Option<UserStake>>,
    pub token_balance: Fetched<u64>,
    pub pending_rewards: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total_staked: u64,
    pub total_stakers: u64,
    /// Lamports available to claims.
    pub reward_vault_balance: u64,
    pub min_stake_amount: u64,
    pub instant_unstake_fee: u16,
    pub last_reward_time: i64,
}

/// Read side of the staking program for one stake mint.
pub struct PoolClient<R> {
    rpc: R,
    addresses: PoolAddresses,
}

impl<R: StakingRpc> PoolClient<R> {
    pub fn new(rpc: R, stake_mint: &Pubkey, program_id: &Pubkey) -> Result<Self> {
        Ok(PoolClient {
            rpc,
            addresses: PoolAddresses::derive(stake_mint, program_id)?,
        })
    }

    pub fn addresses(&self) -> &PoolAddresses {
        &self.addresses
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub async fn fetch_pool(&self) -> Result<StakingPool> {
        debug!("fetching pool {}", self.addresses.pool);
        match self.rpc.get_account_data(&self.addresses.pool).await? {
            Some(data) => deserialize_anchor_account(&data, "pool"),
            None => Err(ClientError::PoolNotInitialized),
        }
    }

    /// Pool state plus, with `user`, their stake, token balance and claimable
    /// rewards.
    ///
    /// The pool is mandatory. The user's stake and balance are read
    /// concurrently. A transport failure of the stake read, or any failure of
    /// the balance read, leaves that field `Defaulted` instead of failing the
    /// snapshot. Rewards are only accrued for a nonzero stake; an emptied
    /// position reports zero.
    pub async fn snapshot(&self, user: Option<&Pubkey>) -> Result<Snapshot> {
        let pool = self.fetch_pool().await?;
        let Some(owner) = user else {
            return Ok(Snapshot {
                pool,
                user_stake: Fetched::Loaded(None),
                token_balance: Fetched::Loaded(0),
                pending_rewards: 0,
            });
        };

        let user_stake_address = self.addresses.user_stake(owner)?;
        let token_account = self.addresses.user_token_account(owner);
        let (stake_data, balance) = tokio::join!(
            self.rpc.get_account_data(&user_stake_address),
            self.rpc.get_token_balance(&token_account),
        );

        let user_stake = match stake_data {
            Ok(Some(data)) => Fetched::Loaded(Some(deserialize_anchor_account::<UserStake>(
                &data,
                "user stake",
            )?)),
            Ok(None) => Fetched::Loaded(None),
            Err(err) if err.is_retryable() => {
                warn!("user stake of {owner} unavailable: {err}");
                Fetched::Defaulted
            }
            Err(err) => return Err(err),
        };
        let token_balance = match balance {
            Ok(amount) => Fetched::Loaded(amount),
            Err(err) => {
                warn!("token balance of {owner} unavailable: {err}");
                Fetched::Defaulted
            }
        };

        let pending_rewards = match user_stake.loaded() {
            Some(Some(stake)) if stake.staked_amount > 0 => {
                RewardCalculator::pending_rewards(&pool, stake).ok_or_else(|| {
                    ClientError::malformed("user stake", "reward checkpoint ahead of the pool")
                })?
            }
            _ => 0,
        };

        Ok(Snapshot {
            pool,
            user_stake,
            token_balance,
            pending_rewards,
        })
    }

    pub async fn pool_stats(&self) -> Result<PoolStats> {
        let (pool, vault_balance) = tokio::join!(
            self.fetch_pool(),
            self.rpc.get_balance(&self.addresses.reward_vault),
        );
        let pool = pool?;
        Ok(PoolStats {
            total_staked: pool.total_staked,
            total_stakers: pool.total_stakers,
            reward_vault_balance: vault_balance?,
            min_stake_amount: pool.min_stake_amount,
            instant_unstake_fee: pool.instant_unstake_fee,
            last_reward_time: pool.last_reward_time,
        })
    }

    /// The `limit` most recent user actions on the pool. Twice as many
    /// transactions are read since administrative and failed ones are dropped.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEvent>> {
        let records = self
            .rpc
            .get_recent_transactions(&self.addresses.pool, limit.saturating_mul(2))
            .await?;
        Ok(classify(records, limit).collect())
    }

    pub async fn submit(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature> {
        send_txn(&self.rpc, instructions, payer, signers).await
    }
}
