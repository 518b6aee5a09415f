//! Accounts each program method expects, in the order the program reads them.
//!
//! `instant_unstake` takes the same accounts as `unstake`.

use anchor_lang::prelude::*;

/// Accounts of `initialize`.
#[derive(Clone, Copy, Debug)]
pub struct Initialize {
    /// Pool PDA `["pool", stake_mint]`, created by the call.
    pub pool: Pubkey,
    pub stake_mint: Pubkey,
    /// Token vault PDA `["stake_vault", pool]`, created by the call.
    pub stake_vault: Pubkey,
    /// SOL vault PDA `["reward_vault", pool]`.
    pub reward_vault: Pubkey,
    /// Pool admin, pays for the new accounts.
    pub authority: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    pub rent: Pubkey,
}

impl ToAccountMetas for Initialize {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new_readonly(self.stake_mint, false),
            AccountMeta::new(self.stake_vault, false),
            AccountMeta::new(self.reward_vault, false),
            AccountMeta::new(self.authority, true),
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.rent, false),
        ]
    }
}

/// Accounts of `stake`. The user stake PDA is created on first use.
#[derive(Clone, Copy, Debug)]
pub struct Stake {
    pub pool: Pubkey,
    pub user_stake: Pubkey,
    pub stake_vault: Pubkey,
    /// User's token account of the stake mint.
    pub user_token_account: Pubkey,
    pub user: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for Stake {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new(self.user_stake, false),
            AccountMeta::new(self.stake_vault, false),
            AccountMeta::new(self.user_token_account, false),
            AccountMeta::new(self.user, true),
            AccountMeta::new_readonly(self.token_program, false),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

/// Accounts of `unstake` and `instant_unstake`.
#[derive(Clone, Copy, Debug)]
pub struct Unstake {
    pub pool: Pubkey,
    pub user_stake: Pubkey,
    pub stake_vault: Pubkey,
    pub user_token_account: Pubkey,
    pub user: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for Unstake {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new(self.user_stake, false),
            AccountMeta::new(self.stake_vault, false),
            AccountMeta::new(self.user_token_account, false),
            AccountMeta::new(self.user, true),
            AccountMeta::new_readonly(self.token_program, false),
        ]
    }
}

/// Accounts of `claim_rewards`. Rewards are lamports paid straight from the
/// reward vault to `user`.
#[derive(Clone, Copy, Debug)]
pub struct ClaimRewards {
    pub pool: Pubkey,
    pub user_stake: Pubkey,
    pub reward_vault: Pubkey,
    pub user: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for ClaimRewards {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new(self.user_stake, false),
            AccountMeta::new(self.reward_vault, false),
            AccountMeta::new(self.user, true),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

/// Accounts of `deposit_rewards`. `authority` must be the pool authority.
#[derive(Clone, Copy, Debug)]
pub struct DepositRewards {
    pub pool: Pubkey,
    pub reward_vault: Pubkey,
    pub authority: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for DepositRewards {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new(self.reward_vault, false),
            AccountMeta::new(self.authority, true),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}
