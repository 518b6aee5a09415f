use anchor_lang::ToAccountMetas;
use orange_staking::accounts as staking_accounts;
use orange_staking::instruction::{
    self as staking_instructions, InstructionArgs, StakingInstruction,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program, sysvar};

use super::utils::PoolAddresses;
use crate::error::Result;

fn program_instruction(
    addresses: &PoolAddresses,
    accounts: impl ToAccountMetas,
    data: Vec<u8>,
) -> Instruction {
    Instruction {
        program_id: addresses.program_id,
        accounts: accounts.to_account_metas(None),
        data,
    }
}

pub fn initialize_instr(
    addresses: &PoolAddresses,
    authority: &Pubkey,
    reward_duration: i64,
    min_stake_amount: u64,
    instant_unstake_fee: u16,
) -> Instruction {
    program_instruction(
        addresses,
        staking_accounts::Initialize {
            pool: addresses.pool,
            stake_mint: addresses.stake_mint,
            stake_vault: addresses.stake_vault,
            reward_vault: addresses.reward_vault,
            authority: *authority,
            token_program: spl_token::id(),
            system_program: system_program::id(),
            rent: sysvar::rent::id(),
        },
        staking_instructions::Initialize {
            reward_duration,
            min_stake_amount,
            instant_unstake_fee,
        }
        .data(),
    )
}

pub fn stake_instr(addresses: &PoolAddresses, user: &Pubkey, amount: u64) -> Result<Instruction> {
    Ok(program_instruction(
        addresses,
        staking_accounts::Stake {
            pool: addresses.pool,
            user_stake: addresses.user_stake(user)?,
            stake_vault: addresses.stake_vault,
            user_token_account: addresses.user_token_account(user),
            user: *user,
            token_program: spl_token::id(),
            system_program: system_program::id(),
        },
        staking_instructions::Stake { amount }.data(),
    ))
}

fn unstake_accounts(addresses: &PoolAddresses, user: &Pubkey) -> Result<staking_accounts::Unstake> {
    Ok(staking_accounts::Unstake {
        pool: addresses.pool,
        user_stake: addresses.user_stake(user)?,
        stake_vault: addresses.stake_vault,
        user_token_account: addresses.user_token_account(user),
        user: *user,
        token_program: spl_token::id(),
    })
}

pub fn unstake_instr(addresses: &PoolAddresses, user: &Pubkey, amount: u64) -> Result<Instruction> {
    Ok(program_instruction(
        addresses,
        unstake_accounts(addresses, user)?,
        staking_instructions::Unstake { amount }.data(),
    ))
}

pub fn instant_unstake_instr(
    addresses: &PoolAddresses,
    user: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    Ok(program_instruction(
        addresses,
        unstake_accounts(addresses, user)?,
        staking_instructions::InstantUnstake { amount }.data(),
    ))
}

pub fn claim_rewards_instr(addresses: &PoolAddresses, user: &Pubkey) -> Result<Instruction> {
    Ok(program_instruction(
        addresses,
        staking_accounts::ClaimRewards {
            pool: addresses.pool,
            user_stake: addresses.user_stake(user)?,
            reward_vault: addresses.reward_vault,
            user: *user,
            system_program: system_program::id(),
        },
        staking_instructions::ClaimRewards {}.data(),
    ))
}

pub fn deposit_rewards_instr(
    addresses: &PoolAddresses,
    authority: &Pubkey,
    lamports: u64,
) -> Instruction {
    program_instruction(
        addresses,
        staking_accounts::DepositRewards {
            pool: addresses.pool,
            reward_vault: addresses.reward_vault,
            authority: *authority,
            system_program: system_program::id(),
        },
        staking_instructions::DepositRewards { amount: lamports }.data(),
    )
}

/// Builds any program instruction; `signer` is the user, or the authority for
/// admin methods.
pub fn build_instr(
    addresses: &PoolAddresses,
    signer: &Pubkey,
    instruction: StakingInstruction,
) -> Result<Instruction> {
    match instruction {
        StakingInstruction::Initialize(args) => Ok(initialize_instr(
            addresses,
            signer,
            args.reward_duration,
            args.min_stake_amount,
            args.instant_unstake_fee,
        )),
        StakingInstruction::Stake(args) => stake_instr(addresses, signer, args.amount),
        StakingInstruction::Unstake(args) => unstake_instr(addresses, signer, args.amount),
        StakingInstruction::InstantUnstake(args) => {
            instant_unstake_instr(addresses, signer, args.amount)
        }
        StakingInstruction::ClaimRewards(_) => claim_rewards_instr(addresses, signer),
        StakingInstruction::DepositRewards(args) => {
            Ok(deposit_rewards_instr(addresses, signer, args.amount))
        }
    }
}
