use anchor_lang::prelude::*;
use arrayref::{array_ref, array_refs};
use base64::{engine::general_purpose::STANDARD, Engine as _};

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: emitted by the program as `Program data: <base64>` log lines
// ──────────────────────────────────────────────────────────────────────────────
//

/// Prefix of the log line carrying an emitted event.
pub const EVENT_LOG_PREFIX: &str = "Program data: ";

/// Emitted by `stake`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeEvent {
    pub user: Pubkey,
    /// Tokens added by this stake.
    pub amount: u64,
    /// User's staked amount after the stake.
    pub total_staked: u64,
    pub timestamp: i64,
}

/// Emitted by `unstake`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnstakeEvent {
    pub user: Pubkey,
    pub amount: u64,
    /// User's staked amount left after the unstake.
    pub remaining: u64,
    pub timestamp: i64,
}

/// Emitted by `instant_unstake`; `received = amount - fee`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantUnstakeEvent {
    pub user: Pubkey,
    pub amount: u64,
    pub fee: u64,
    pub received: u64,
    pub timestamp: i64,
}

/// Emitted by `claim_rewards`, amount in lamports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimEvent {
    pub user: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted by `deposit_rewards`, amount in lamports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardDepositEvent {
    pub depositor: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

impl StakeEvent {
    pub const DISCRIMINATOR: [u8; 8] = [226, 134, 188, 173, 19, 33, 75, 175];
    const LEN: usize = 32 + 8 * 3;

    fn decode(data: &[u8]) -> Option<Self> {
        let src = array_ref![data.get(..Self::LEN)?, 0, StakeEvent::LEN];
        let (user, amount, total_staked, timestamp) = array_refs![src, 32, 8, 8, 8];
        Some(StakeEvent {
            user: Pubkey::new_from_array(*user),
            amount: u64::from_le_bytes(*amount),
            total_staked: u64::from_le_bytes(*total_staked),
            timestamp: i64::from_le_bytes(*timestamp),
        })
    }
}

impl UnstakeEvent {
    pub const DISCRIMINATOR: [u8; 8] = [162, 104, 137, 228, 81, 3, 79, 197];
    const LEN: usize = 32 + 8 * 3;

    fn decode(data: &[u8]) -> Option<Self> {
        let src = array_ref![data.get(..Self::LEN)?, 0, UnstakeEvent::LEN];
        let (user, amount, remaining, timestamp) = array_refs![src, 32, 8, 8, 8];
        Some(UnstakeEvent {
            user: Pubkey::new_from_array(*user),
            amount: u64::from_le_bytes(*amount),
            remaining: u64::from_le_bytes(*remaining),
            timestamp: i64::from_le_bytes(*timestamp),
        })
    }
}

impl InstantUnstakeEvent {
    pub const DISCRIMINATOR: [u8; 8] = [91, 161, 139, 69, 25, 26, 24, 195];
    const LEN: usize = 32 + 8 * 4;

    fn decode(data: &[u8]) -> Option<Self> {
        let src = array_ref![data.get(..Self::LEN)?, 0, InstantUnstakeEvent::LEN];
        let (user, amount, fee, received, timestamp) = array_refs![src, 32, 8, 8, 8, 8];
        Some(InstantUnstakeEvent {
            user: Pubkey::new_from_array(*user),
            amount: u64::from_le_bytes(*amount),
            fee: u64::from_le_bytes(*fee),
            received: u64::from_le_bytes(*received),
            timestamp: i64::from_le_bytes(*timestamp),
        })
    }
}

impl ClaimEvent {
    pub const DISCRIMINATOR: [u8; 8] = [93, 15, 70, 170, 48, 140, 212, 219];
    const LEN: usize = 32 + 8 * 2;

    fn decode(data: &[u8]) -> Option<Self> {
        let src = array_ref![data.get(..Self::LEN)?, 0, ClaimEvent::LEN];
        let (user, amount, timestamp) = array_refs![src, 32, 8, 8];
        Some(ClaimEvent {
            user: Pubkey::new_from_array(*user),
            amount: u64::from_le_bytes(*amount),
            timestamp: i64::from_le_bytes(*timestamp),
        })
    }
}

impl RewardDepositEvent {
    pub const DISCRIMINATOR: [u8; 8] = [222, 218, 60, 95, 59, 13, 62, 112];
    const LEN: usize = 32 + 8 * 2;

    fn decode(data: &[u8]) -> Option<Self> {
        let src = array_ref![data.get(..Self::LEN)?, 0, RewardDepositEvent::LEN];
        let (depositor, amount, timestamp) = array_refs![src, 32, 8, 8];
        Some(RewardDepositEvent {
            depositor: Pubkey::new_from_array(*depositor),
            amount: u64::from_le_bytes(*amount),
            timestamp: i64::from_le_bytes(*timestamp),
        })
    }
}

/// Any event the staking program emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramEvent {
    Stake(StakeEvent),
    Unstake(UnstakeEvent),
    InstantUnstake(InstantUnstakeEvent),
    Claim(ClaimEvent),
    RewardDeposit(RewardDepositEvent),
}

impl ProgramEvent {
    /// Decodes `discriminator ‖ borsh fields`. Unknown tags and short
    /// payloads yield `None`: other programs log `Program data:` too.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let tag = *array_ref![data.get(..8)?, 0, 8];
        let body = &data[8..];
        match tag {
            StakeEvent::DISCRIMINATOR => StakeEvent::decode(body).map(ProgramEvent::Stake),
            UnstakeEvent::DISCRIMINATOR => UnstakeEvent::decode(body).map(ProgramEvent::Unstake),
            InstantUnstakeEvent::DISCRIMINATOR => {
                InstantUnstakeEvent::decode(body).map(ProgramEvent::InstantUnstake)
            }
            ClaimEvent::DISCRIMINATOR => ClaimEvent::decode(body).map(ProgramEvent::Claim),
            RewardDepositEvent::DISCRIMINATOR => {
                RewardDepositEvent::decode(body).map(ProgramEvent::RewardDeposit)
            }
            _ => None,
        }
    }

    /// Parses a `Program data: <base64>` log line.
    pub fn from_log_line(line: &str) -> Option<Self> {
        let payload = line.strip_prefix(EVENT_LOG_PREFIX)?;
        let data = STANDARD.decode(payload.trim()).ok()?;
        Self::decode(&data)
    }

    /// Token amount for stake events, lamports for claims and deposits.
    pub fn amount(&self) -> u64 {
        match self {
            ProgramEvent::Stake(e) => e.amount,
            ProgramEvent::Unstake(e) => e.amount,
            ProgramEvent::InstantUnstake(e) => e.amount,
            ProgramEvent::Claim(e) => e.amount,
            ProgramEvent::RewardDeposit(e) => e.amount,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            ProgramEvent::Stake(e) => e.timestamp,
            ProgramEvent::Unstake(e) => e.timestamp,
            ProgramEvent::InstantUnstake(e) => e.timestamp,
            ProgramEvent::Claim(e) => e.timestamp,
            ProgramEvent::RewardDeposit(e) => e.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim_log(user: &Pubkey, amount: u64, timestamp: i64) -> String {
        let mut data = ClaimEvent::DISCRIMINATOR.to_vec();
        data.extend_from_slice(user.as_ref());
        data.extend_from_slice(&amount.to_le_bytes());
        data.extend_from_slice(&timestamp.to_le_bytes());
        format!("{EVENT_LOG_PREFIX}{}", STANDARD.encode(data))
    }

    #[test]
    fn decodes_claim_event_from_log() {
        let user = Pubkey::new_unique();
        let event = ProgramEvent::from_log_line(&claim_log(&user, 5_000, 1_700_000_000)).unwrap();
        assert_eq!(
            event,
            ProgramEvent::Claim(ClaimEvent {
                user,
                amount: 5_000,
                timestamp: 1_700_000_000
            })
        );
        assert_eq!(event.amount(), 5_000);
    }

    #[test]
    fn decodes_instant_unstake_event() {
        let user = Pubkey::new_unique();
        let mut data = InstantUnstakeEvent::DISCRIMINATOR.to_vec();
        data.extend_from_slice(user.as_ref());
        for v in [1_000_000u64, 10_000, 990_000] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&7i64.to_le_bytes());
        match ProgramEvent::decode(&data) {
            Some(ProgramEvent::InstantUnstake(e)) => {
                assert_eq!(e.fee, 10_000);
                assert_eq!(e.received, 990_000);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ignores_foreign_and_truncated_payloads() {
        assert_eq!(ProgramEvent::from_log_line("Program log: Instruction: Stake"), None);
        assert_eq!(ProgramEvent::from_log_line("Program data: !!!"), None);
        let mut data = StakeEvent::DISCRIMINATOR.to_vec();
        data.extend_from_slice(&[0u8; 20]);
        assert_eq!(ProgramEvent::decode(&data), None);
        assert_eq!(ProgramEvent::decode(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), None);
    }
}
