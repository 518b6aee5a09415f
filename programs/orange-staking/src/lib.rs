use anchor_lang::prelude::*;

declare_id!("5MRKYXP3y54CEqDsuEGnieLwYGrGkTQNG34xcpbWEoW7");

pub mod orange_mint {
    use anchor_lang::prelude::declare_id;
    declare_id!("QTeMapgDXPdgG8ZKuyD4pkBsuE5qFeKeKEyp5khLHAV");
}

pub const STAKE_VAULT_SEED: &str = "stake_vault";
pub const REWARD_VAULT_SEED: &str = "reward_vault";

/// Scale of `reward_per_token_stored` and `reward_per_token_paid`.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;
/// Denominator of `instant_unstake_fee` (basis points).
pub const FEE_RATE_DENOMINATOR_VALUE: u64 = 10_000;
/// Decimals of the orange mint.
pub const TOKEN_DECIMALS: u8 = 6;
/// Lamports per SOL, rewards are paid in lamports.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub mod accounts;
pub mod error;
pub mod instruction;
pub mod rewards;
pub mod states;

pub use error::ErrorCode;
