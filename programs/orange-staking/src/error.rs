use anchor_lang::error::ERROR_CODE_OFFSET;
use anchor_lang::prelude::*;

/// Errors returned by the staking program. The order fixes the on-chain
/// codes (`6000 + index`) and must not change.
#[error_code]
pub enum ErrorCode {
    #[msg("Below minimum stake")]
    BelowMinimumStake,

    #[msg("Insufficient stake")]
    InsufficientStake,

    #[msg("No rewards to claim")]
    NoRewardsToClaim,

    #[msg("Unauthorized")]
    Unauthorized,
}

impl ErrorCode {
    /// Maps the `Custom(code)` of a failed instruction back to the program error.
    pub fn from_custom_code(code: u32) -> Option<Self> {
        [
            ErrorCode::BelowMinimumStake,
            ErrorCode::InsufficientStake,
            ErrorCode::NoRewardsToClaim,
            ErrorCode::Unauthorized,
        ]
        .into_iter()
        .find(|e| e.custom_code() == code)
    }

    pub fn custom_code(self) -> u32 {
        ERROR_CODE_OFFSET + self as u32
    }
}
