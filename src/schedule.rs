use near_sdk::Timestamp;

/// The four time checkpoints of one swap instance, every one an integer
/// multiple of `delta` past the shared start time. Both ledger deployments
/// derive their checkpoints from the same `(start_time, delta)` pair; the two
/// instances never communicate, the shared schedule is the only coordination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Schedule {
    pub start_time: Timestamp,
    /// Premium must be deposited strictly before this instant.
    pub premium_deadline: Timestamp,
    /// Asset must be deposited (and redeemed) strictly before this instant.
    pub asset_escrow_deadline: Timestamp,
    /// Outer bound; strictly after it the premium leg's resolution unlocks.
    pub asset_timeout: Timestamp,
}

impl Schedule {
    /// `first_asset_escrow` marks the deployment whose asset leg is escrowed
    /// first in the overall exchange order: that side advertises the later
    /// premium window and the longer timeout. The persisted checkpoints are
    /// the same ones the `set_up` event advertises.
    pub fn derive(start_time: Timestamp, delta: u64, first_asset_escrow: bool) -> Self {
        if first_asset_escrow {
            Self {
                start_time,
                premium_deadline: start_time + 2 * delta,
                asset_escrow_deadline: start_time + 3 * delta,
                asset_timeout: start_time + 6 * delta,
            }
        } else {
            Self {
                start_time,
                premium_deadline: start_time + delta,
                asset_escrow_deadline: start_time + 4 * delta,
                asset_timeout: start_time + 5 * delta,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_escrower_side_checkpoints() {
        let schedule = Schedule::derive(1_000, 1_000, true);
        assert_eq!(schedule.premium_deadline, 3_000);
        assert_eq!(schedule.asset_escrow_deadline, 4_000);
        assert_eq!(schedule.asset_timeout, 7_000);
    }

    #[test]
    fn second_escrower_side_checkpoints() {
        let schedule = Schedule::derive(1_000, 1_000, false);
        assert_eq!(schedule.premium_deadline, 2_000);
        assert_eq!(schedule.asset_escrow_deadline, 5_000);
        assert_eq!(schedule.asset_timeout, 6_000);
    }

    #[test]
    fn checkpoints_scale_with_delta() {
        let schedule = Schedule::derive(0, 60, true);
        assert_eq!(schedule.premium_deadline, 120);
        assert_eq!(schedule.asset_escrow_deadline, 180);
        assert_eq!(schedule.asset_timeout, 360);
    }
}
