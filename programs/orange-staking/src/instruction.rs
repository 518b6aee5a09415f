//! Instruction data of the staking program: an 8-byte method tag followed by
//! the little-endian arguments.

use anchor_lang::error::ErrorCode as AnchorErrorCode;
use anchor_lang::prelude::*;
use arrayref::{array_ref, array_refs};

/// Arguments of one program method.
pub trait InstructionArgs: Sized {
    /// Method name the program dispatches on.
    const NAME: &'static str;
    /// `sha256("global:" + NAME)[..8]`
    const DISCRIMINATOR: [u8; 8];
    /// Encoded width of the arguments, tag excluded.
    const ARGS_LEN: usize;

    fn pack_args(&self, dst: &mut Vec<u8>);

    /// Decodes exactly `ARGS_LEN` bytes.
    fn unpack_args(src: &[u8]) -> Option<Self>;

    /// Full instruction data, `tag ‖ args`.
    fn data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(8 + Self::ARGS_LEN);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.pack_args(&mut data);
        data
    }

    fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || data[..8] != Self::DISCRIMINATOR {
            return Err(AnchorErrorCode::InstructionFallbackNotFound.into());
        }
        Self::unpack_args(&data[8..])
            .ok_or_else(|| AnchorErrorCode::InstructionDidNotDeserialize.into())
    }
}

/// Creates the pool of a mint. Admin only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Initialize {
    /// Epoch length in seconds.
    pub reward_duration: i64,
    pub min_stake_amount: u64,
    /// Basis points.
    pub instant_unstake_fee: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stake {
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unstake {
    pub amount: u64,
}

/// Unstake paying `instant_unstake_fee` basis points of `amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantUnstake {
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimRewards {}

/// Moves `amount` lamports from the authority to the reward vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositRewards {
    pub amount: u64,
}

fn unpack_amount(src: &[u8]) -> Option<u64> {
    if src.len() != 8 {
        return None;
    }
    Some(u64::from_le_bytes(*array_ref![src, 0, 8]))
}

impl InstructionArgs for Initialize {
    const NAME: &'static str = "initialize";
    const DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
    const ARGS_LEN: usize = 8 + 8 + 2;

    fn pack_args(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.reward_duration.to_le_bytes());
        dst.extend_from_slice(&self.min_stake_amount.to_le_bytes());
        dst.extend_from_slice(&self.instant_unstake_fee.to_le_bytes());
    }

    fn unpack_args(src: &[u8]) -> Option<Self> {
        if src.len() != Self::ARGS_LEN {
            return None;
        }
        let src = array_ref![src, 0, 18];
        let (reward_duration, min_stake_amount, instant_unstake_fee) = array_refs![src, 8, 8, 2];
        Some(Initialize {
            reward_duration: i64::from_le_bytes(*reward_duration),
            min_stake_amount: u64::from_le_bytes(*min_stake_amount),
            instant_unstake_fee: u16::from_le_bytes(*instant_unstake_fee),
        })
    }
}

impl InstructionArgs for Stake {
    const NAME: &'static str = "stake";
    const DISCRIMINATOR: [u8; 8] = [206, 176, 202, 18, 200, 209, 179, 108];
    const ARGS_LEN: usize = 8;

    fn pack_args(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.amount.to_le_bytes());
    }

    fn unpack_args(src: &[u8]) -> Option<Self> {
        unpack_amount(src).map(|amount| Stake { amount })
    }
}

impl InstructionArgs for Unstake {
    const NAME: &'static str = "unstake";
    const DISCRIMINATOR: [u8; 8] = [90, 95, 107, 42, 205, 124, 50, 225];
    const ARGS_LEN: usize = 8;

    fn pack_args(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.amount.to_le_bytes());
    }

    fn unpack_args(src: &[u8]) -> Option<Self> {
        unpack_amount(src).map(|amount| Unstake { amount })
    }
}

impl InstructionArgs for InstantUnstake {
    const NAME: &'static str = "instant_unstake";
    const DISCRIMINATOR: [u8; 8] = [16, 246, 91, 34, 255, 183, 165, 53];
    const ARGS_LEN: usize = 8;

    fn pack_args(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.amount.to_le_bytes());
    }

    fn unpack_args(src: &[u8]) -> Option<Self> {
        unpack_amount(src).map(|amount| InstantUnstake { amount })
    }
}

impl InstructionArgs for ClaimRewards {
    const NAME: &'static str = "claim_rewards";
    const DISCRIMINATOR: [u8; 8] = [4, 144, 132, 71, 116, 23, 151, 80];
    const ARGS_LEN: usize = 0;

    fn pack_args(&self, _dst: &mut Vec<u8>) {}

    fn unpack_args(src: &[u8]) -> Option<Self> {
        src.is_empty().then_some(ClaimRewards {})
    }
}

impl InstructionArgs for DepositRewards {
    const NAME: &'static str = "deposit_rewards";
    const DISCRIMINATOR: [u8; 8] = [52, 249, 112, 72, 206, 161, 196, 1];
    const ARGS_LEN: usize = 8;

    fn pack_args(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.amount.to_le_bytes());
    }

    fn unpack_args(src: &[u8]) -> Option<Self> {
        unpack_amount(src).map(|amount| DepositRewards { amount })
    }
}

/// The program methods, without arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Initialize,
    Stake,
    Unstake,
    InstantUnstake,
    ClaimRewards,
    DepositRewards,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 6] = [
        InstructionKind::Initialize,
        InstructionKind::Stake,
        InstructionKind::Unstake,
        InstructionKind::InstantUnstake,
        InstructionKind::ClaimRewards,
        InstructionKind::DepositRewards,
    ];

    /// Method name, e.g. `claim_rewards`.
    pub fn name(self) -> &'static str {
        match self {
            InstructionKind::Initialize => Initialize::NAME,
            InstructionKind::Stake => Stake::NAME,
            InstructionKind::Unstake => Unstake::NAME,
            InstructionKind::InstantUnstake => InstantUnstake::NAME,
            InstructionKind::ClaimRewards => ClaimRewards::NAME,
            InstructionKind::DepositRewards => DepositRewards::NAME,
        }
    }

    /// Name the program prints in its `Instruction: <Name>` log line.
    pub fn log_name(self) -> &'static str {
        match self {
            InstructionKind::Initialize => "Initialize",
            InstructionKind::Stake => "Stake",
            InstructionKind::Unstake => "Unstake",
            InstructionKind::InstantUnstake => "InstantUnstake",
            InstructionKind::ClaimRewards => "ClaimRewards",
            InstructionKind::DepositRewards => "DepositRewards",
        }
    }

    pub fn from_log_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.log_name() == name)
    }

    pub fn discriminator(self) -> [u8; 8] {
        match self {
            InstructionKind::Initialize => Initialize::DISCRIMINATOR,
            InstructionKind::Stake => Stake::DISCRIMINATOR,
            InstructionKind::Unstake => Unstake::DISCRIMINATOR,
            InstructionKind::InstantUnstake => InstantUnstake::DISCRIMINATOR,
            InstructionKind::ClaimRewards => ClaimRewards::DISCRIMINATOR,
            InstructionKind::DepositRewards => DepositRewards::DISCRIMINATOR,
        }
    }

    /// Pool administration rather than user activity.
    pub fn is_admin(self) -> bool {
        matches!(self, InstructionKind::Initialize | InstructionKind::DepositRewards)
    }
}

/// A decoded instruction of any kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakingInstruction {
    Initialize(Initialize),
    Stake(Stake),
    Unstake(Unstake),
    InstantUnstake(InstantUnstake),
    ClaimRewards(ClaimRewards),
    DepositRewards(DepositRewards),
}

impl StakingInstruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            StakingInstruction::Initialize(_) => InstructionKind::Initialize,
            StakingInstruction::Stake(_) => InstructionKind::Stake,
            StakingInstruction::Unstake(_) => InstructionKind::Unstake,
            StakingInstruction::InstantUnstake(_) => InstructionKind::InstantUnstake,
            StakingInstruction::ClaimRewards(_) => InstructionKind::ClaimRewards,
            StakingInstruction::DepositRewards(_) => InstructionKind::DepositRewards,
        }
    }

    pub fn data(&self) -> Vec<u8> {
        match self {
            StakingInstruction::Initialize(ix) => ix.data(),
            StakingInstruction::Stake(ix) => ix.data(),
            StakingInstruction::Unstake(ix) => ix.data(),
            StakingInstruction::InstantUnstake(ix) => ix.data(),
            StakingInstruction::ClaimRewards(ix) => ix.data(),
            StakingInstruction::DepositRewards(ix) => ix.data(),
        }
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let kind = data
            .get(..8)
            .and_then(|tag| InstructionKind::ALL.into_iter().find(|k| k.discriminator() == tag))
            .ok_or(AnchorErrorCode::InstructionFallbackNotFound)?;
        Ok(match kind {
            InstructionKind::Initialize => {
                StakingInstruction::Initialize(Initialize::unpack(data)?)
            }
            InstructionKind::Stake => StakingInstruction::Stake(Stake::unpack(data)?),
            InstructionKind::Unstake => StakingInstruction::Unstake(Unstake::unpack(data)?),
            InstructionKind::InstantUnstake => {
                StakingInstruction::InstantUnstake(InstantUnstake::unpack(data)?)
            }
            InstructionKind::ClaimRewards => {
                StakingInstruction::ClaimRewards(ClaimRewards::unpack(data)?)
            }
            InstructionKind::DepositRewards => {
                StakingInstruction::DepositRewards(DepositRewards::unpack(data)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::hash::hash;

    #[test]
    fn tags_are_derived_from_method_names() {
        for kind in InstructionKind::ALL {
            let preimage = format!("global:{}", kind.name());
            assert_eq!(
                hash(preimage.as_bytes()).to_bytes()[..8],
                kind.discriminator(),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn stake_payload_is_tag_plus_le_amount() {
        let data = Stake { amount: 300_000_000_000 }.data();
        assert_eq!(data.len(), 16);
        assert_eq!(data[..8], Stake::DISCRIMINATOR);
        assert_eq!(data[8..], 300_000_000_000u64.to_le_bytes());
    }

    #[test]
    fn initialize_payload_layout() {
        let ix = Initialize {
            reward_duration: 600,
            min_stake_amount: 300_000 * 1_000_000,
            instant_unstake_fee: 100,
        };
        let data = ix.data();
        assert_eq!(data.len(), 8 + 18);
        assert_eq!(data[8..16], 600i64.to_le_bytes());
        assert_eq!(data[16..24], 300_000_000_000u64.to_le_bytes());
        assert_eq!(data[24..], 100u16.to_le_bytes());
        assert_eq!(Initialize::unpack(&data).unwrap(), ix);
    }

    #[test]
    fn claim_rewards_has_no_arguments() {
        assert_eq!(ClaimRewards {}.data(), ClaimRewards::DISCRIMINATOR.to_vec());
    }

    #[test]
    fn unpack_dispatches_on_tag() {
        let data = InstantUnstake { amount: 42 }.data();
        assert_eq!(
            StakingInstruction::unpack(&data).unwrap(),
            StakingInstruction::InstantUnstake(InstantUnstake { amount: 42 })
        );
        assert_eq!(
            Unstake::unpack(&data).unwrap_err(),
            AnchorErrorCode::InstructionFallbackNotFound.into()
        );
    }

    #[test]
    fn unpack_rejects_wrong_argument_width() {
        let mut data = DepositRewards { amount: 1 }.data();
        data.push(0);
        assert_eq!(
            StakingInstruction::unpack(&data).unwrap_err(),
            AnchorErrorCode::InstructionDidNotDeserialize.into()
        );
        assert!(StakingInstruction::unpack(&[1, 2, 3]).is_err());
    }

    #[test]
    fn log_names_round_trip() {
        for kind in InstructionKind::ALL {
            assert_eq!(InstructionKind::from_log_name(kind.log_name()), Some(kind));
        }
        assert_eq!(InstructionKind::from_log_name("Transfer"), None);
        assert!(InstructionKind::DepositRewards.is_admin());
        assert!(!InstructionKind::ClaimRewards.is_admin());
    }
}
