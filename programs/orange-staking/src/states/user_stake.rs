use anchor_lang::error::ErrorCode as AnchorErrorCode;
use anchor_lang::prelude::*;
use arrayref::{array_ref, array_refs, mut_array_refs};
use std::io::Write;

use super::pool::{read_u128, write_u128};
use super::{check_discriminator, DISCRIMINATOR_LEN};

//
// ──────────────────────────────────────────────────────────────────────────────
// UserStake Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive each user's stake account,
/// `USER_STAKE_SEED + pool + owner`.
pub const USER_STAKE_SEED: &str = "user_stake";

/// Stake position of one owner in one pool.
///
/// Created by the program on the first stake and kept afterwards, even once
/// `staked_amount` drops back to zero, so the claim history survives.
///
/// Layout (little-endian, 120 bytes): discriminator(8) · owner(32) · pool(32) ·
/// staked_amount(8) · stake_time(8) · reward_per_token_paid(16) ·
/// pending_rewards(8) · total_rewards_claimed(8).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStake {
    /// Owner (user) to whom this record belongs.
    pub owner: Pubkey,

    /// Pool this position belongs to.
    pub pool: Pubkey,

    /// Tokens currently staked, in base units.
    pub staked_amount: u64,

    /// Unix timestamp of the first stake of the current position.
    pub stake_time: i64,

    /// Pool reward index at this user's last settlement.
    pub reward_per_token_paid: u128,

    /// Rewards settled but not yet claimed, in lamports.
    pub pending_rewards: u64,

    /// Lifetime claimed rewards, in lamports.
    pub total_rewards_claimed: u64,
}

impl UserStake {
    /// `sha256("account:UserStake")[..8]`
    pub const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [102, 53, 163, 107, 9, 138, 87, 153];

    /// Fixed serialized size of the account.
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 32 * 2: owner, pool
    /// - 8 * 2: staked_amount, stake_time
    /// - 16: reward_per_token_paid
    /// - 8 * 2: pending_rewards, total_rewards_claimed
    pub const LEN: usize = 8 + 32 * 2 + 8 * 2 + 16 + 8 * 2;

    /// Decodes a raw account buffer, checking the tag and the fixed length.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let mut data = data;
        Self::try_deserialize(&mut data)
    }

    /// Encodes the record, tag included.
    pub fn pack(&self) -> [u8; Self::LEN] {
        let mut dst = [0u8; Self::LEN];
        self.pack_into_slice(&mut dst);
        dst
    }

    fn unpack_from_slice(src: &[u8; Self::LEN]) -> Self {
        let (
            _discriminator,
            owner,
            pool,
            staked_amount,
            stake_time,
            reward_per_token_paid,
            pending_rewards,
            total_rewards_claimed,
        ) = array_refs![src, 8, 32, 32, 8, 8, 16, 8, 8];
        UserStake {
            owner: Pubkey::new_from_array(*owner),
            pool: Pubkey::new_from_array(*pool),
            staked_amount: u64::from_le_bytes(*staked_amount),
            stake_time: i64::from_le_bytes(*stake_time),
            reward_per_token_paid: read_u128(reward_per_token_paid),
            pending_rewards: u64::from_le_bytes(*pending_rewards),
            total_rewards_claimed: u64::from_le_bytes(*total_rewards_claimed),
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8; Self::LEN]) {
        let (
            discriminator,
            owner,
            pool,
            staked_amount,
            stake_time,
            reward_per_token_paid,
            pending_rewards,
            total_rewards_claimed,
        ) = mut_array_refs![dst, 8, 32, 32, 8, 8, 16, 8, 8];
        *discriminator = Self::DISCRIMINATOR;
        owner.copy_from_slice(self.owner.as_ref());
        pool.copy_from_slice(self.pool.as_ref());
        *staked_amount = self.staked_amount.to_le_bytes();
        *stake_time = self.stake_time.to_le_bytes();
        write_u128(self.reward_per_token_paid, reward_per_token_paid);
        *pending_rewards = self.pending_rewards.to_le_bytes();
        *total_rewards_claimed = self.total_rewards_claimed.to_le_bytes();
    }
}

impl AccountDeserialize for UserStake {
    fn try_deserialize(buf: &mut &[u8]) -> Result<Self> {
        check_discriminator(buf, &Self::DISCRIMINATOR)?;
        Self::try_deserialize_unchecked(buf)
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> Result<Self> {
        let data: &[u8] = *buf;
        if data.len() < Self::LEN {
            return Err(AnchorErrorCode::AccountDidNotDeserialize.into());
        }
        let stake = Self::unpack_from_slice(array_ref![data, 0, UserStake::LEN]);
        *buf = &data[Self::LEN..];
        Ok(stake)
    }
}

impl AccountSerialize for UserStake {
    fn try_serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer
            .write_all(&self.pack())
            .map_err(|_| AnchorErrorCode::AccountDidNotSerialize.into())
    }
}
