use std::fmt;

use near_sdk::{env, FunctionError};

/// Everything that can make one of the seven operations abort. A failed call
/// leaves no partial state and emits no event; resolution is caller-driven
/// (fix the call, or wait for the right time window and resubmit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    /// Wrong calling principal for the operation.
    Authorization(&'static str),
    /// Operation attempted out of the required escrow sequence.
    Ordering(&'static str),
    /// Hash-lock already set up, or leg already escrowed/resolved.
    Duplicate(&'static str),
    /// Called before a required instant, or after one has passed.
    Timing(&'static str),
    /// Caller balance on the token ledger is below the required amount.
    InsufficientFunds,
    /// Supplied secret does not hash to the swap's commitment.
    Integrity,
    /// No swap is set up for this hash-lock.
    UnknownSwap,
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::Authorization(detail) => write!(f, "Authorization: {detail}"),
            SwapError::Ordering(detail) => write!(f, "Ordering: {detail}"),
            SwapError::Duplicate(detail) => write!(f, "Duplicate: {detail}"),
            SwapError::Timing(detail) => write!(f, "Timing: {detail}"),
            SwapError::InsufficientFunds => {
                write!(f, "InsufficientFunds: caller balance is below the required amount")
            }
            SwapError::Integrity => {
                write!(f, "Integrity: preimage does not hash to the swap's hash-lock")
            }
            SwapError::UnknownSwap => {
                write!(f, "UnknownSwap: no swap is set up for this hash-lock")
            }
        }
    }
}

impl FunctionError for SwapError {
    fn panic(&self) -> ! {
        env::panic_str(&self.to_string())
    }
}
