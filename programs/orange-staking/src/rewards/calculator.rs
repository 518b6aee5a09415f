//! Reward accrual and fee calculations, identical to the program's own.

use anchor_lang::error::ErrorCode as AnchorErrorCode;
use anchor_lang::prelude::*;

use super::U256;
use crate::error::ErrorCode;
use crate::states::{StakingPool, UserStake};
use crate::{FEE_RATE_DENOMINATOR_VALUE, PRECISION};

/// Outcome of an `instant_unstake` of `amount` tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantUnstakeQuote {
    /// Tokens withheld by the pool.
    pub fee: u64,
    /// Tokens transferred back to the user, `amount - fee`.
    pub received: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardCalculator {}

impl RewardCalculator {
    /// Lamports earned by `staked_amount` tokens while the pool index moved
    /// from `reward_per_token_paid` to `reward_per_token_stored`.
    ///
    /// Returns `None` if the index went backwards or the result does not fit
    /// in a u64.
    pub fn earned(
        staked_amount: u64,
        reward_per_token_stored: u128,
        reward_per_token_paid: u128,
    ) -> Option<u64> {
        let delta = reward_per_token_stored.checked_sub(reward_per_token_paid)?;
        let earned = U256::from(staked_amount)
            .checked_mul(U256::from(delta))?
            .checked_div(U256::from(PRECISION))?;
        if earned > U256::from(u64::MAX) {
            return None;
        }
        Some(earned.low_u64())
    }

    /// Rewards `user` could claim right now.
    ///
    /// An empty position accrues nothing, its settled `pending_rewards` are
    /// returned as is. `None` means the two records are inconsistent: the
    /// pool index is behind the user checkpoint, or the total overflows.
    pub fn pending_rewards(pool: &StakingPool, user: &UserStake) -> Option<u64> {
        if user.staked_amount == 0 {
            return Some(user.pending_rewards);
        }
        let earned = Self::earned(
            user.staked_amount,
            pool.reward_per_token_stored,
            user.reward_per_token_paid,
        )?;
        user.pending_rewards.checked_add(earned)
    }

    /// Pool index after a deposit of `amount` lamports. Deposits made while
    /// nothing is staked leave the index unchanged.
    pub fn reward_per_token_after_deposit(pool: &StakingPool, amount: u64) -> Option<u128> {
        if pool.total_staked == 0 {
            return Some(pool.reward_per_token_stored);
        }
        let increase = U256::from(amount)
            .checked_mul(U256::from(PRECISION))?
            .checked_div(U256::from(pool.total_staked))?;
        if increase > U256::from(u128::MAX) {
            return None;
        }
        pool.reward_per_token_stored.checked_add(increase.as_u128())
    }

    /// Fee is `amount * fee_bps / 10_000`, rounded down.
    pub fn instant_unstake_quote(amount: u64, fee_bps: u16) -> Option<InstantUnstakeQuote> {
        let fee = u128::from(amount)
            .checked_mul(u128::from(fee_bps))?
            .checked_div(u128::from(FEE_RATE_DENOMINATOR_VALUE))?;
        let fee = u64::try_from(fee).ok()?;
        Some(InstantUnstakeQuote {
            fee,
            received: amount.checked_sub(fee)?,
        })
    }

    pub fn check_stake(pool: &StakingPool, amount: u64) -> Result<()> {
        if amount < pool.min_stake_amount {
            return Err(ErrorCode::BelowMinimumStake.into());
        }
        Ok(())
    }

    /// Same rule for `unstake` and `instant_unstake`.
    pub fn check_unstake(user: &UserStake, amount: u64) -> Result<()> {
        if amount == 0 || amount > user.staked_amount {
            return Err(ErrorCode::InsufficientStake.into());
        }
        Ok(())
    }

    /// Returns the amount a claim would pay.
    pub fn check_claim(pool: &StakingPool, user: &UserStake) -> Result<u64> {
        // Records that disagree on the index cannot have come from the program.
        let rewards = Self::pending_rewards(pool, user)
            .ok_or(AnchorErrorCode::AccountDidNotDeserialize)?;
        if rewards == 0 {
            return Err(ErrorCode::NoRewardsToClaim.into());
        }
        Ok(rewards)
    }

    pub fn check_deposit(pool: &StakingPool, authority: &Pubkey) -> Result<()> {
        if pool.authority != *authority {
            return Err(ErrorCode::Unauthorized.into());
        }
        Ok(())
    }
}
