use anchor_lang::error::Error as AnchorError;
use orange_staking::ErrorCode as ProgramErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures surfaced by the staking client.
///
/// Callers branch on the variant, never on the message: `PoolNotInitialized`
/// is a quiet empty state, `TransportFailure` is worth a retry, everything
/// else is terminal for the operation that produced it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no off-curve {0} address for the given seeds")]
    DerivationExhausted(&'static str),

    #[error("malformed {account} account: {reason}")]
    MalformedAccount {
        account: &'static str,
        reason: String,
    },

    #[error("staking pool is not initialized")]
    PoolNotInitialized,

    #[error("program rejected the transaction: {reason} ({code})")]
    ProgramRejected { code: u32, reason: String },

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    #[error("config: {0}")]
    Config(String),
}

impl ClientError {
    pub fn malformed(account: &'static str, reason: impl ToString) -> Self {
        ClientError::MalformedAccount {
            account,
            reason: reason.to_string(),
        }
    }

    pub fn transport(err: impl ToString) -> Self {
        ClientError::TransportFailure(err.to_string())
    }

    /// Rejection reported by the program for a custom error `code`.
    pub fn rejected(code: u32) -> Self {
        let reason = ProgramErrorCode::from_custom_code(code)
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("custom program error {code:#x}"));
        ClientError::ProgramRejected { code, reason }
    }

    /// Re-invoking the same read may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::TransportFailure(_))
    }

    /// Nothing to show yet, not a failure.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, ClientError::PoolNotInitialized)
    }

    /// The staking program's own error, if this is one.
    pub fn program_error(&self) -> Option<ProgramErrorCode> {
        match self {
            ClientError::ProgramRejected { code, .. } => ProgramErrorCode::from_custom_code(*code),
            _ => None,
        }
    }
}

/// Local pre-checks report program error codes; anything else coming out of
/// the interface crate is a codec failure.
impl From<AnchorError> for ClientError {
    fn from(err: AnchorError) -> Self {
        match err {
            AnchorError::AnchorError(e)
                if ProgramErrorCode::from_custom_code(e.error_code_number).is_some() =>
            {
                ClientError::rejected(e.error_code_number)
            }
            other => ClientError::malformed("program", other),
        }
    }
}
