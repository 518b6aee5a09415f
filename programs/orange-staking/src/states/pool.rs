use anchor_lang::error::ErrorCode as AnchorErrorCode;
use anchor_lang::prelude::*;
use arrayref::{array_ref, array_refs, mut_array_refs};
use std::io::Write;

use super::{check_discriminator, DISCRIMINATOR_LEN};

//
// ──────────────────────────────────────────────────────────────────────────────
// StakingPool Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the pool account of a stake mint.
pub const POOL_SEED: &str = "pool";

/// Global state of the staking pool for one stake mint.
///
/// The program keeps a single reward index for the whole pool: every reward
/// deposit raises `reward_per_token_stored` by `amount * PRECISION / total_staked`
/// and each `UserStake` realizes its share lazily against its own checkpoint.
///
/// Layout (little-endian, 195 bytes):
///
/// | offset | field                     | width |
/// |--------|---------------------------|-------|
/// | 0      | discriminator             | 8     |
/// | 8      | authority                 | 32    |
/// | 40     | stake_mint                | 32    |
/// | 72     | stake_vault               | 32    |
/// | 104    | reward_vault              | 32    |
/// | 136    | total_staked              | 8     |
/// | 144    | total_stakers             | 8     |
/// | 152    | reward_duration           | 8     |
/// | 160    | last_reward_time          | 8     |
/// | 168    | reward_per_token_stored   | 16    |
/// | 184    | min_stake_amount          | 8     |
/// | 192    | instant_unstake_fee       | 2     |
/// | 194    | bump                      | 1     |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakingPool {
    /// Admin allowed to deposit rewards.
    pub authority: Pubkey,

    /// Mint of the staked token.
    pub stake_mint: Pubkey,

    /// PDA token account holding every staked token.
    pub stake_vault: Pubkey,

    /// PDA system account holding SOL rewards.
    pub reward_vault: Pubkey,

    /// Sum of all users' `staked_amount`; equals the stake vault balance.
    pub total_staked: u64,

    /// Number of users with a nonzero stake.
    pub total_stakers: u64,

    /// Epoch length in seconds.
    pub reward_duration: i64,

    /// Unix timestamp of the last reward deposit.
    pub last_reward_time: i64,

    /// Lamports earned per staked token since inception, scaled by `PRECISION`.
    /// Never decreases.
    pub reward_per_token_stored: u128,

    /// Smallest accepted stake, in token base units.
    pub min_stake_amount: u64,

    /// Fee charged by `instant_unstake`, in basis points.
    pub instant_unstake_fee: u16,

    /// PDA bump of this account.
    pub bump: u8,
}

impl StakingPool {
    /// `sha256("account:StakingPool")[..8]`
    pub const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [203, 19, 214, 220, 220, 154, 24, 102];

    /// Fixed serialized size of the account.
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 32 * 4: four Pubkeys
    /// - 8 * 4: total_staked, total_stakers, reward_duration, last_reward_time
    /// - 16: reward_per_token_stored
    /// - 8: min_stake_amount
    /// - 2: instant_unstake_fee
    /// - 1: bump
    pub const LEN: usize = 8 + 32 * 4 + 8 * 4 + 16 + 8 + 2 + 1;

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
            authority,
            stake_mint,
            stake_vault,
            reward_vault,
            total_staked,
            total_stakers,
            reward_duration,
            last_reward_time,
            reward_per_token_stored,
            min_stake_amount,
            instant_unstake_fee,
            bump,
        ) = array_refs![src, 8, 32, 32, 32, 32, 8, 8, 8, 8, 16, 8, 2, 1];
        StakingPool {
            authority: Pubkey::new_from_array(*authority),
            stake_mint: Pubkey::new_from_array(*stake_mint),
            stake_vault: Pubkey::new_from_array(*stake_vault),
            reward_vault: Pubkey::new_from_array(*reward_vault),
            total_staked: u64::from_le_bytes(*total_staked),
            total_stakers: u64::from_le_bytes(*total_stakers),
            reward_duration: i64::from_le_bytes(*reward_duration),
            last_reward_time: i64::from_le_bytes(*last_reward_time),
            reward_per_token_stored: read_u128(reward_per_token_stored),
            min_stake_amount: u64::from_le_bytes(*min_stake_amount),
            instant_unstake_fee: u16::from_le_bytes(*instant_unstake_fee),
            bump: bump[0],
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8; Self::LEN]) {
        let (
            discriminator,
            authority,
            stake_mint,
            stake_vault,
            reward_vault,
            total_staked,
            total_stakers,
            reward_duration,
            last_reward_time,
            reward_per_token_stored,
            min_stake_amount,
            instant_unstake_fee,
            bump,
        ) = mut_array_refs![dst, 8, 32, 32, 32, 32, 8, 8, 8, 8, 16, 8, 2, 1];
        *discriminator = Self::DISCRIMINATOR;
        authority.copy_from_slice(self.authority.as_ref());
        stake_mint.copy_from_slice(self.stake_mint.as_ref());
        stake_vault.copy_from_slice(self.stake_vault.as_ref());
        reward_vault.copy_from_slice(self.reward_vault.as_ref());
        *total_staked = self.total_staked.to_le_bytes();
        *total_stakers = self.total_stakers.to_le_bytes();
        *reward_duration = self.reward_duration.to_le_bytes();
        *last_reward_time = self.last_reward_time.to_le_bytes();
        write_u128(self.reward_per_token_stored, reward_per_token_stored);
        *min_stake_amount = self.min_stake_amount.to_le_bytes();
        *instant_unstake_fee = self.instant_unstake_fee.to_le_bytes();
        bump[0] = self.bump;
    }
}

impl AccountDeserialize for StakingPool {
    fn try_deserialize(buf: &mut &[u8]) -> Result<Self> {
        check_discriminator(buf, &Self::DISCRIMINATOR)?;
        Self::try_deserialize_unchecked(buf)
    }

    fn try_deserialize_unchecked(buf: &mut &[u8]) -> Result<Self> {
        let data: &[u8] = *buf;
        if data.len() < Self::LEN {
            return Err(AnchorErrorCode::AccountDidNotDeserialize.into());
        }
        let pool = Self::unpack_from_slice(array_ref![data, 0, StakingPool::LEN]);
        *buf = &data[Self::LEN..];
        Ok(pool)
    }
}

impl AccountSerialize for StakingPool {
    fn try_serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer
            .write_all(&self.pack())
            .map_err(|_| AnchorErrorCode::AccountDidNotSerialize.into())
    }
}

/// Reads a u128 stored as two little-endian u64 halves, `low + (high << 64)`.
pub(crate) fn read_u128(src: &[u8; 16]) -> u128 {
    let (low, high) = array_refs![src, 8, 8];
    u64::from_le_bytes(*low) as u128 + ((u64::from_le_bytes(*high) as u128) << 64)
}

pub(crate) fn write_u128(value: u128, dst: &mut [u8; 16]) {
    let (low, high) = mut_array_refs![dst, 8, 8];
    *low = (value as u64).to_le_bytes();
    *high = ((value >> 64) as u64).to_le_bytes();
}
