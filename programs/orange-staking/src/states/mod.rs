use anchor_lang::error::ErrorCode as AnchorErrorCode;

pub mod pool;
pub use pool::*;

pub mod user_stake;
pub use user_stake::*;

pub mod events;
pub use events::*;

/// Width of the account type tag leading every record.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Checks the tag in front of `buf` before a fixed-layout decode.
pub(crate) fn check_discriminator(
    buf: &[u8],
    expected: &[u8; DISCRIMINATOR_LEN],
) -> anchor_lang::Result<()> {
    if buf.len() < DISCRIMINATOR_LEN {
        return Err(AnchorErrorCode::AccountDiscriminatorNotFound.into());
    }
    if buf[..DISCRIMINATOR_LEN] != expected[..] {
        return Err(AnchorErrorCode::AccountDiscriminatorMismatch.into());
    }
    Ok(())
}
