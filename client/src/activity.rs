//! Classification of the pool's transaction history into user activity.

use orange_staking::instruction::InstructionKind;
use orange_staking::states::ProgramEvent;
use regex::Regex;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

/// Anchor logs `Instruction: <Name>` on entry of every method.
const MARKER_PATTERN: &str = r"^Program log: Instruction: (\w+)$";

fn marker_regex() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(MARKER_PATTERN).ok()).as_ref()
}

/// One historical transaction touching the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionRecord {
    pub signature: String,
    pub log_lines: Vec<String>,
    /// Fee payer, if the transaction could be decoded.
    pub signer: Option<Pubkey>,
    /// Block time, `0` when the node does not know it.
    pub timestamp: i64,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Stake,
    /// Both `unstake` and `instant_unstake`.
    Unstake,
    Claim,
}

impl ActivityKind {
    fn from_instruction(kind: InstructionKind) -> Option<Self> {
        match kind {
            InstructionKind::Stake => Some(ActivityKind::Stake),
            InstructionKind::Unstake | InstructionKind::InstantUnstake => {
                Some(ActivityKind::Unstake)
            }
            InstructionKind::ClaimRewards => Some(ActivityKind::Claim),
            InstructionKind::Initialize | InstructionKind::DepositRewards => None,
        }
    }

    fn from_event(event: &ProgramEvent) -> Option<Self> {
        match event {
            ProgramEvent::Stake(_) => Some(ActivityKind::Stake),
            ProgramEvent::Unstake(_) | ProgramEvent::InstantUnstake(_) => {
                Some(ActivityKind::Unstake)
            }
            ProgramEvent::Claim(_) => Some(ActivityKind::Claim),
            ProgramEvent::RewardDeposit(_) => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Stake => "stake",
            ActivityKind::Unstake => "unstake",
            ActivityKind::Claim => "claim",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub actor: Option<Pubkey>,
    pub timestamp: i64,
    pub signature: String,
    /// Token amount for stakes and unstakes, lamports for claims; present
    /// when the program event could be decoded from the logs.
    pub amount: Option<u64>,
}

/// Program methods named by the `Instruction:` markers of `log_lines`.
fn instruction_markers(log_lines: &[String]) -> Vec<InstructionKind> {
    let Some(marker) = marker_regex() else {
        return Vec::new();
    };
    log_lines
        .iter()
        .filter_map(|line| marker.captures(line))
        .filter_map(|caps| caps.get(1))
        .filter_map(|name| InstructionKind::from_log_name(name.as_str()))
        .collect()
}

fn classify_record(record: TransactionRecord) -> Option<ActivityEvent> {
    let markers = instruction_markers(&record.log_lines);
    if markers.iter().any(|kind| kind.is_admin()) {
        return None;
    }
    if !record.success {
        return None;
    }

    let events: Vec<ProgramEvent> = record
        .log_lines
        .iter()
        .filter_map(|line| ProgramEvent::from_log_line(line))
        .collect();
    let kind = markers
        .into_iter()
        .find_map(ActivityKind::from_instruction)
        .or_else(|| events.iter().find_map(ActivityKind::from_event))?;
    let amount = events
        .iter()
        .find(|event| ActivityKind::from_event(event) == Some(kind))
        .map(ProgramEvent::amount);

    Some(ActivityEvent {
        kind,
        actor: record.signer,
        timestamp: record.timestamp,
        signature: record.signature,
        amount,
    })
}

/// Lazily turns `records` (newest first) into at most `limit` activity
/// events, keeping their order.
///
/// Failed transactions, administrative ones (`initialize`, `deposit_rewards`)
/// and transactions without a recognized method are skipped.
pub fn classify<I>(records: I, limit: usize) -> impl Iterator<Item = ActivityEvent>
where
    I: IntoIterator<Item = TransactionRecord>,
{
    records.into_iter().filter_map(classify_record).take(limit)
}
