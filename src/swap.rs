use near_sdk::json_types::U128;
use near_sdk::{near, AccountId, CryptoHash, Timestamp};

// Unique identifier for a swap. We are using the SHA256 hash of the secret.
pub type SwapId = CryptoHash;

/// Lifecycle of one escrow leg. `Pending` is only ever held while the leg's
/// deposit transfer is in flight on the token ledger; it keeps `current` at 0,
/// so the externally observable counter is always exactly 0 or `expected`.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LegState {
    Empty,
    Pending,
    Escrowed,
    Redeemed,
    Refunded,
}

/// Which of the two per-swap escrow counters an operation acts on.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LegKind {
    Premium,
    Asset,
}

/// Which terminal transition an outbound transfer settles.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolution {
    AssetRedeem,
    AssetRefund,
    PremiumRefund,
    PremiumRedeem,
}

/// The item being exchanged. Must be deposited before `escrow_deadline`;
/// after `timeout` the premium leg's default-recovery operations unlock.
#[near(serializers = [json, borsh])]
#[derive(Clone)]
pub struct AssetLeg {
    pub expected: U128,
    pub current: U128,
    pub state: LegState,
    pub escrow_deadline: Timestamp,
    pub timeout: Timestamp,
}

/// The good-faith deposit securing protocol compliance.
#[near(serializers = [json, borsh])]
#[derive(Clone)]
pub struct PremiumLeg {
    pub expected: U128,
    pub current: U128,
    pub state: LegState,
    pub deadline: Timestamp,
}

/// One swap instance: the immutable participant/asset identity plus the two
/// mutable leg counters, stored as a single aggregate under the hash-lock.
/// Entries are never removed; both legs driven back to zero is the terminal
/// signal.
#[near(serializers = [json, borsh])]
#[derive(Clone)]
pub struct Swap {
    pub asset_escrower: AccountId,
    pub premium_escrower: AccountId,
    pub asset_ref: AccountId,
    pub asset: AssetLeg,
    pub premium: PremiumLeg,
}

impl Swap {
    /// Amount a depositor must bring for the given leg.
    pub fn escrow_target(&self, leg: LegKind) -> U128 {
        match leg {
            LegKind::Premium => self.premium.expected,
            LegKind::Asset => self.asset.expected,
        }
    }

    /// Marks a leg's deposit as in flight, locking out every other transition
    /// on that leg until the transfer settles.
    pub fn lock_pending(&mut self, leg: LegKind) {
        match leg {
            LegKind::Premium => self.premium.state = LegState::Pending,
            LegKind::Asset => self.asset.state = LegState::Pending,
        }
    }

    /// Drops a `Pending` lock after a failed deposit, returning the leg to
    /// `Empty` so the escrow can be retried.
    pub fn release_pending(&mut self, leg: LegKind) {
        match leg {
            LegKind::Premium => self.premium.state = LegState::Empty,
            LegKind::Asset => self.asset.state = LegState::Empty,
        }
    }

    /// Finalizes a successful deposit: 0 -> expected, `Escrowed`.
    pub fn commit_escrow(&mut self, leg: LegKind) {
        match leg {
            LegKind::Premium => {
                self.premium.current = self.premium.expected;
                self.premium.state = LegState::Escrowed;
            }
            LegKind::Asset => {
                self.asset.current = self.asset.expected;
                self.asset.state = LegState::Escrowed;
            }
        }
    }

    /// Puts a leg back to `Escrowed` after a failed outbound transfer so the
    /// resolution can be retried.
    pub fn restore_escrowed(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::AssetRedeem | Resolution::AssetRefund => {
                self.asset.current = self.asset.expected;
                self.asset.state = LegState::Escrowed;
            }
            Resolution::PremiumRefund | Resolution::PremiumRedeem => {
                self.premium.current = self.premium.expected;
                self.premium.state = LegState::Escrowed;
            }
        }
    }
}
