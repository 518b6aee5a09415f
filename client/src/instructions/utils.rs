use anchor_lang::AccountDeserialize;
use orange_staking::states::{POOL_SEED, USER_STAKE_SEED};
use orange_staking::{LAMPORTS_PER_SOL, REWARD_VAULT_SEED, STAKE_VAULT_SEED};
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::error::{ClientError, Result};

/// Digits shown after the decimal point of a token amount.
const TOKEN_DISPLAY_DIGITS: usize = 2;
/// Digits shown after the decimal point of a SOL amount.
const SOL_DISPLAY_DIGITS: usize = 4;

/// Decodes an Anchor account, mapping any codec failure to `MalformedAccount`.
pub fn deserialize_anchor_account<T: AccountDeserialize>(
    data: &[u8],
    account: &'static str,
) -> Result<T> {
    let mut data: &[u8] = data;
    T::try_deserialize(&mut data).map_err(|e| ClientError::malformed(account, e))
}

/// Program address for `seeds` followed by the `parents` keys, with its bump.
pub fn derive_address(
    kind: &'static str,
    seeds: &[&[u8]],
    parents: &[&Pubkey],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8)> {
    let mut all: Vec<&[u8]> = Vec::with_capacity(seeds.len() + parents.len());
    all.extend_from_slice(seeds);
    all.extend(parents.iter().map(|key| key.as_ref()));
    Pubkey::try_find_program_address(&all, program_id)
        .ok_or(ClientError::DerivationExhausted(kind))
}

pub fn get_pool_address(stake_mint: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_address("pool", &[POOL_SEED.as_bytes()], &[stake_mint], program_id)
}

pub fn get_stake_vault_address(pool: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_address(
        "stake vault",
        &[STAKE_VAULT_SEED.as_bytes()],
        &[pool],
        program_id,
    )
}

pub fn get_reward_vault_address(pool: &Pubkey, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_address(
        "reward vault",
        &[REWARD_VAULT_SEED.as_bytes()],
        &[pool],
        program_id,
    )
}

pub fn get_user_stake_address(
    pool: &Pubkey,
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8)> {
    derive_address(
        "user stake",
        &[USER_STAKE_SEED.as_bytes()],
        &[pool, owner],
        program_id,
    )
}

/// Associated token account of `owner` for `stake_mint`.
pub fn get_user_token_address(owner: &Pubkey, stake_mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, stake_mint)
}

/// Every address the program uses for one stake mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolAddresses {
    pub program_id: Pubkey,
    pub stake_mint: Pubkey,
    pub pool: Pubkey,
    pub pool_bump: u8,
    pub stake_vault: Pubkey,
    pub reward_vault: Pubkey,
}

impl PoolAddresses {
    pub fn derive(stake_mint: &Pubkey, program_id: &Pubkey) -> Result<Self> {
        let (pool, pool_bump) = get_pool_address(stake_mint, program_id)?;
        let (stake_vault, _) = get_stake_vault_address(&pool, program_id)?;
        let (reward_vault, _) = get_reward_vault_address(&pool, program_id)?;
        Ok(PoolAddresses {
            program_id: *program_id,
            stake_mint: *stake_mint,
            pool,
            pool_bump,
            stake_vault,
            reward_vault,
        })
    }

    pub fn user_stake(&self, owner: &Pubkey) -> Result<Pubkey> {
        get_user_stake_address(&self.pool, owner, &self.program_id).map(|(key, _)| key)
    }

    pub fn user_token_account(&self, owner: &Pubkey) -> Pubkey {
        get_user_token_address(owner, &self.stake_mint)
    }
}

/// Parses a decimal token amount such as `"300000"` or `"1.5"` into base units.
pub fn parse_token_amount(input: &str, decimals: u8) -> Result<u64> {
    let invalid = |reason| ClientError::InvalidAmount {
        input: input.to_string(),
        reason,
    };
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("not a non-negative decimal number"));
    }
    if fraction.len() > decimals as usize {
        return Err(invalid("more fractional digits than the mint has"));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or(invalid("too many decimals"))?;
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid("too large"))?
    };
    let fraction = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        padded.parse::<u64>().map_err(|_| invalid("too large"))?
    };
    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction))
        .ok_or(invalid("too large"))
}

/// Formats base units with two fractional digits, truncating the rest.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    // Past 10^38 the scale exceeds any u64 amount, so everything is fractional.
    let (whole, rest) = match 10u128.checked_pow(decimals as u32) {
        Some(scale) => (amount as u128 / scale, amount as u128 % scale),
        None => (0, amount as u128),
    };
    let fraction = format!("{rest:0width$}", width = decimals as usize);
    let shown = &fraction[..TOKEN_DISPLAY_DIGITS.min(fraction.len())];
    format!("{whole}.{shown:0<TOKEN_DISPLAY_DIGITS$}")
}

/// Formats lamports as SOL with four fractional digits, rounded half up.
pub fn format_sol_amount(lamports: u64) -> String {
    let unit = LAMPORTS_PER_SOL / 10u64.pow(SOL_DISPLAY_DIGITS as u32);
    let rounded = (lamports as u128 + unit as u128 / 2) / unit as u128;
    let scale = 10u128.pow(SOL_DISPLAY_DIGITS as u32);
    format!(
        "{}.{:0width$}",
        rounded / scale,
        rounded % scale,
        width = SOL_DISPLAY_DIGITS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use orange_staking::TOKEN_DECIMALS;

    #[test]
    fn derivation_is_pure() {
        let program_id = orange_staking::id();
        let mint = orange_staking::orange_mint::id();
        let first = get_pool_address(&mint, &program_id).unwrap();
        let second = get_pool_address(&mint, &program_id).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            Pubkey::find_program_address(&[b"pool", mint.as_ref()], &program_id)
        );
    }

    #[test]
    fn derivations_follow_program_seeds() {
        let program_id = orange_staking::id();
        let addresses =
            PoolAddresses::derive(&orange_staking::orange_mint::id(), &program_id).unwrap();
        let owner = Pubkey::new_unique();
        assert_eq!(
            addresses.stake_vault,
            Pubkey::find_program_address(&[b"stake_vault", addresses.pool.as_ref()], &program_id).0
        );
        assert_eq!(
            addresses.reward_vault,
            Pubkey::find_program_address(&[b"reward_vault", addresses.pool.as_ref()], &program_id)
                .0
        );
        assert_eq!(
            addresses.user_stake(&owner).unwrap(),
            Pubkey::find_program_address(
                &[b"user_stake", addresses.pool.as_ref(), owner.as_ref()],
                &program_id
            )
            .0
        );
        assert_ne!(addresses.user_stake(&owner).unwrap(), addresses.pool);
    }

    #[test]
    fn parses_token_amounts() {
        assert_eq!(parse_token_amount("300000", TOKEN_DECIMALS).unwrap(), 300_000_000_000);
        assert_eq!(parse_token_amount("1.5", TOKEN_DECIMALS).unwrap(), 1_500_000);
        assert_eq!(parse_token_amount(".000001", TOKEN_DECIMALS).unwrap(), 1);
        assert_eq!(parse_token_amount("2.", TOKEN_DECIMALS).unwrap(), 2_000_000);
        assert_eq!(parse_token_amount(" 7 ", TOKEN_DECIMALS).unwrap(), 7_000_000);
    }

    #[test]
    fn rejects_bad_token_amounts() {
        for input in ["", ".", "-1", "1e6", "1.2.3", "0.0000001", "abc", "18446744073709.551616"] {
            assert!(
                matches!(
                    parse_token_amount(input, TOKEN_DECIMALS),
                    Err(ClientError::InvalidAmount { .. })
                ),
                "{input:?} accepted"
            );
        }
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_token_amount(300_000_000_000, TOKEN_DECIMALS), "300000.00");
        assert_eq!(format_token_amount(1_239_999, TOKEN_DECIMALS), "1.23");
        assert_eq!(format_token_amount(5, TOKEN_DECIMALS), "0.00");
        assert_eq!(format_token_amount(7, 0), "7.00");
        assert_eq!(format_token_amount(u64::MAX, 39), "0.00");
        assert_eq!(format_token_amount(u64::MAX, u8::MAX), "0.00");
        assert_eq!(format_sol_amount(1_000_000_000), "1.0000");
        assert_eq!(format_sol_amount(123_456_789), "0.1235");
        assert_eq!(format_sol_amount(0), "0.0000");
    }

    #[test]
    fn displayed_amounts_parse_back() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..1_000 {
            // Two fractional digits survive formatting.
            let cents = rng.random_range(0..=1_000_000_000_000u64);
            let amount = cents * 10_000;
            let shown = format_token_amount(amount, TOKEN_DECIMALS);
            assert_eq!(parse_token_amount(&shown, TOKEN_DECIMALS).unwrap(), amount);
        }
    }
}
