//! The precondition predicates gating every transition. All guards for an
//! operation are evaluated before any counter is touched, so a rejected call
//! has no effect.

use near_sdk::{env, AccountId, CryptoHash, Timestamp};

use crate::error::SwapError;
use crate::swap::LegState;

pub fn require_caller_is(
    expected: &AccountId,
    caller: &AccountId,
    detail: &'static str,
) -> Result<(), SwapError> {
    if caller == expected {
        Ok(())
    } else {
        Err(SwapError::Authorization(detail))
    }
}

pub fn require_caller_is_not(
    excluded: &AccountId,
    caller: &AccountId,
    detail: &'static str,
) -> Result<(), SwapError> {
    if caller == excluded {
        Err(SwapError::Authorization(detail))
    } else {
        Ok(())
    }
}

/// Strictly before: a call exactly at `instant` is already too late.
pub fn require_before(
    now: Timestamp,
    instant: Timestamp,
    detail: &'static str,
) -> Result<(), SwapError> {
    if now < instant {
        Ok(())
    } else {
        Err(SwapError::Timing(detail))
    }
}

/// Strictly after: a call exactly at `instant` is still too early.
pub fn require_after(
    now: Timestamp,
    instant: Timestamp,
    detail: &'static str,
) -> Result<(), SwapError> {
    if now > instant {
        Ok(())
    } else {
        Err(SwapError::Timing(detail))
    }
}

/// The secret must hash to the swap's commitment.
pub fn require_preimage(preimage: &CryptoHash, hash_lock: &CryptoHash) -> Result<(), SwapError> {
    if env::sha256_array(preimage) == *hash_lock {
        Ok(())
    } else {
        Err(SwapError::Integrity)
    }
}

/// The leg must not have been escrowed yet (0 -> expected happens once).
pub fn require_leg_empty(state: LegState, detail: &'static str) -> Result<(), SwapError> {
    match state {
        LegState::Empty => Ok(()),
        _ => Err(SwapError::Duplicate(detail)),
    }
}

/// The leg must currently hold its full expected amount.
pub fn require_leg_escrowed(
    state: LegState,
    not_yet: &'static str,
    resolved: &'static str,
) -> Result<(), SwapError> {
    match state {
        LegState::Escrowed => Ok(()),
        LegState::Empty | LegState::Pending => Err(SwapError::Ordering(not_yet)),
        LegState::Redeemed | LegState::Refunded => Err(SwapError::Duplicate(resolved)),
    }
}

/// The asset leg must have stayed empty; once anything was deposited there,
/// the premium's default-refund path is off the table.
pub fn require_asset_stayed_empty(state: LegState, detail: &'static str) -> Result<(), SwapError> {
    match state {
        LegState::Empty => Ok(()),
        _ => Err(SwapError::Ordering(detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_excluded_on_both_sides() {
        // A call exactly at a checkpoint fails the before-guard and the
        // after-guard alike; only strict inequality passes.
        assert!(require_before(99, 100, "t").is_ok());
        assert!(require_before(100, 100, "t").is_err());
        assert!(require_after(100, 100, "t").is_err());
        assert!(require_after(101, 100, "t").is_ok());
    }

    #[test]
    fn escrowed_guard_distinguishes_ordering_from_duplicate() {
        assert_eq!(
            require_leg_escrowed(LegState::Empty, "not yet", "resolved"),
            Err(SwapError::Ordering("not yet"))
        );
        assert_eq!(
            require_leg_escrowed(LegState::Pending, "not yet", "resolved"),
            Err(SwapError::Ordering("not yet"))
        );
        assert!(require_leg_escrowed(LegState::Escrowed, "not yet", "resolved").is_ok());
        assert_eq!(
            require_leg_escrowed(LegState::Redeemed, "not yet", "resolved"),
            Err(SwapError::Duplicate("resolved"))
        );
    }

    #[test]
    fn pending_leg_counts_as_occupied() {
        assert!(require_leg_empty(LegState::Empty, "dup").is_ok());
        assert_eq!(
            require_leg_empty(LegState::Pending, "dup"),
            Err(SwapError::Duplicate("dup"))
        );
        assert_eq!(
            require_asset_stayed_empty(LegState::Pending, "ord"),
            Err(SwapError::Ordering("ord"))
        );
    }
}
