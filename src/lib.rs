use near_sdk::json_types::{Base58CryptoHash, U128, U64};
use near_sdk::store::IterableMap;
use near_sdk::{
    env, ext_contract, near, AccountId, CryptoHash, NearToken, Promise, PromiseError,
    PromiseOrValue,
};

mod error;
mod event;
mod guards;
mod schedule;
mod swap;

pub use error::SwapError;
use event::{SetUpData, TransitionData};
use schedule::Schedule;
use swap::{AssetLeg, LegKind, LegState, PremiumLeg, Resolution, Swap, SwapId};

// External contract interfaces
#[ext_contract(ext_fungible_token)]
pub trait FungibleToken {
    fn ft_balance_of(&self, account_id: AccountId) -> U128;
    fn ft_transfer(&mut self, receiver_id: AccountId, amount: U128, memo: Option<String>);
    fn ft_transfer_from(
        &mut self,
        owner_id: AccountId,
        new_owner_id: AccountId,
        amount: U128,
        memo: Option<String>,
    );
}

#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_escrow_funds_checked(
        &mut self,
        hash_lock: Base58CryptoHash,
        leg: LegKind,
        caller: AccountId,
    );
    fn on_escrow_settled(&mut self, hash_lock: Base58CryptoHash, leg: LegKind, caller: AccountId);
    fn on_resolution_settled(
        &mut self,
        hash_lock: Base58CryptoHash,
        resolution: Resolution,
        actor: AccountId,
    );
}

// Define the contract structure
#[near(contract_state)]
pub struct Contract {
    // The keyed registry: one composite record per hash-lock, never removed.
    pub swaps: IterableMap<SwapId, Swap>,
}

impl Default for Contract {
    fn default() -> Self {
        Self {
            swaps: IterableMap::new(b"s"),
        }
    }
}

#[near]
impl Contract {
    #[init]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh swap instance under its hash-lock and advertises the
    /// time schedule both sides will plan around. The persisted checkpoints
    /// are the same branch-dependent ones the `set_up` event reports.
    #[handle_result]
    pub fn setup(
        &mut self,
        expected_asset: U128,
        expected_premium: U128,
        asset_escrower: AccountId,
        premium_escrower: AccountId,
        asset_ref: AccountId,
        hash_lock: Base58CryptoHash,
        start_time: U64,
        first_asset_escrow: bool,
        delta: U64,
    ) -> Result<(), SwapError> {
        let key: SwapId = hash_lock.into();
        if self.swaps.contains_key(&key) {
            return Err(SwapError::Duplicate("a swap with this hash-lock already exists"));
        }

        let schedule = Schedule::derive(start_time.0, delta.0, first_asset_escrow);
        let swap = Swap {
            asset_escrower: asset_escrower.clone(),
            premium_escrower: premium_escrower.clone(),
            asset_ref: asset_ref.clone(),
            asset: AssetLeg {
                expected: expected_asset,
                current: U128(0),
                state: LegState::Empty,
                escrow_deadline: schedule.asset_escrow_deadline,
                timeout: schedule.asset_timeout,
            },
            premium: PremiumLeg {
                expected: expected_premium,
                current: U128(0),
                state: LegState::Empty,
                deadline: schedule.premium_deadline,
            },
        };
        self.swaps.insert(key, swap);

        event::emit(
            event::SET_UP,
            &SetUpData {
                hash_lock: event::hash_lock_repr(&key),
                asset_escrower,
                premium_escrower,
                asset_ref,
                expected_asset,
                expected_premium,
                start_time,
                premium_deadline: U64(schedule.premium_deadline),
                asset_escrow_deadline: U64(schedule.asset_escrow_deadline),
                asset_timeout: U64(schedule.asset_timeout),
            },
        );
        Ok(())
    }

    /// Deposits the premium leg. Only the registered premium escrower, only
    /// once, and only strictly before the premium deadline.
    #[handle_result]
    pub fn escrow_premium(&mut self, hash_lock: Base58CryptoHash) -> Result<Promise, SwapError> {
        self.start_escrow(hash_lock, LegKind::Premium)
    }

    /// Deposits the asset leg. Only the registered asset escrower, only after
    /// the premium is fully escrowed, and only strictly before the asset
    /// escrow deadline.
    #[handle_result]
    pub fn escrow_asset(&mut self, hash_lock: Base58CryptoHash) -> Result<Promise, SwapError> {
        self.start_escrow(hash_lock, LegKind::Asset)
    }

    /// Releases the escrowed asset to whoever presents the secret, except the
    /// asset escrower themselves, strictly before the escrow deadline.
    #[handle_result]
    pub fn redeem_asset(
        &mut self,
        preimage: Base58CryptoHash,
        hash_lock: Base58CryptoHash,
    ) -> Result<Promise, SwapError> {
        let key: SwapId = hash_lock.into();
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let swap = self.swaps.get_mut(&key).ok_or(SwapError::UnknownSwap)?;

        guards::require_caller_is_not(
            &swap.asset_escrower,
            &caller,
            "the asset escrower cannot redeem their own asset",
        )?;
        let preimage_bytes: CryptoHash = preimage.into();
        guards::require_preimage(&preimage_bytes, &key)?;
        guards::require_leg_escrowed(
            swap.asset.state,
            "the asset has not been escrowed",
            "the asset leg has already been resolved",
        )?;
        guards::require_before(
            now,
            swap.asset.escrow_deadline,
            "the asset redeem window has closed",
        )?;

        let amount = swap.asset.current;
        swap.asset.current = U128(0);
        swap.asset.state = LegState::Redeemed;
        let token = swap.asset_ref.clone();

        Ok(transfer_out(
            token,
            hash_lock,
            Resolution::AssetRedeem,
            caller.clone(),
            caller,
            amount,
        ))
    }

    /// Returns an asset that was escrowed but never redeemed in time to its
    /// escrower. Callable by anyone strictly after the escrow deadline.
    #[handle_result]
    pub fn refund_asset(&mut self, hash_lock: Base58CryptoHash) -> Result<Promise, SwapError> {
        let key: SwapId = hash_lock.into();
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let swap = self.swaps.get_mut(&key).ok_or(SwapError::UnknownSwap)?;

        guards::require_leg_escrowed(
            swap.premium.state,
            "the premium has not been escrowed",
            "the premium leg has already been resolved",
        )?;
        guards::require_leg_escrowed(
            swap.asset.state,
            "the asset has not been escrowed",
            "the asset leg has already been resolved",
        )?;
        guards::require_after(
            now,
            swap.asset.escrow_deadline,
            "the asset escrow deadline has not elapsed",
        )?;

        let amount = swap.asset.current;
        swap.asset.current = U128(0);
        swap.asset.state = LegState::Refunded;
        let token = swap.asset_ref.clone();
        let recipient = swap.asset_escrower.clone();

        Ok(transfer_out(
            token,
            hash_lock,
            Resolution::AssetRefund,
            caller,
            recipient,
            amount,
        ))
    }

    /// Returns the premium to its escrower when the asset side defaulted: the
    /// asset leg stayed empty past the timeout. Callable by anyone.
    #[handle_result]
    pub fn refund_premium(&mut self, hash_lock: Base58CryptoHash) -> Result<Promise, SwapError> {
        let key: SwapId = hash_lock.into();
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let swap = self.swaps.get_mut(&key).ok_or(SwapError::UnknownSwap)?;

        guards::require_leg_escrowed(
            swap.premium.state,
            "the premium has not been escrowed",
            "the premium leg has already been resolved",
        )?;
        guards::require_asset_stayed_empty(
            swap.asset.state,
            "the asset leg was escrowed; the premium is not refundable",
        )?;
        guards::require_after(now, swap.asset.timeout, "the timeout has not elapsed")?;

        let amount = swap.premium.current;
        swap.premium.current = U128(0);
        swap.premium.state = LegState::Refunded;
        let token = swap.asset_ref.clone();
        let recipient = swap.premium_escrower.clone();

        Ok(transfer_out(
            token,
            hash_lock,
            Resolution::PremiumRefund,
            caller,
            recipient,
            amount,
        ))
    }

    /// Claims the premium after the timeout. Callable by anyone once the
    /// timeout has elapsed; the asset leg's own resolution is not inspected.
    #[handle_result]
    pub fn redeem_premium(&mut self, hash_lock: Base58CryptoHash) -> Result<Promise, SwapError> {
        let key: SwapId = hash_lock.into();
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let swap = self.swaps.get_mut(&key).ok_or(SwapError::UnknownSwap)?;

        guards::require_leg_escrowed(
            swap.premium.state,
            "the premium has not been escrowed",
            "the premium leg has already been resolved",
        )?;
        if swap.asset.expected.0 == 0 {
            return Err(SwapError::Ordering("the swap has no asset leg to default on"));
        }
        guards::require_after(now, swap.asset.timeout, "the timeout has not elapsed")?;

        let amount = swap.premium.current;
        swap.premium.current = U128(swap.premium.current.0 - swap.premium.expected.0);
        swap.premium.state = LegState::Redeemed;
        let token = swap.asset_ref.clone();

        // The funds go to the caller; the emitted event keeps reporting the
        // registered premium escrower as the destination.
        Ok(transfer_out(
            token,
            hash_lock,
            Resolution::PremiumRedeem,
            caller.clone(),
            caller,
            amount,
        ))
    }

    /// Current aggregate for one hash-lock, for agents that poll instead of
    /// tailing the event log.
    pub fn get_swap(&self, hash_lock: Base58CryptoHash) -> Option<Swap> {
        self.swaps.get(&CryptoHash::from(hash_lock)).cloned()
    }

    // --- PRIVATE CALLBACKS ---

    /// Balance preflight for a deposit. Anything short of the leg's expected
    /// amount releases the `Pending` lock with no counter change.
    #[private]
    pub fn on_escrow_funds_checked(
        &mut self,
        #[callback_result] balance: Result<U128, PromiseError>,
        hash_lock: Base58CryptoHash,
        leg: LegKind,
        caller: AccountId,
    ) -> PromiseOrValue<()> {
        let key: SwapId = hash_lock.into();
        let Some(swap) = self.swaps.get_mut(&key) else {
            return PromiseOrValue::Value(());
        };
        let expected = swap.escrow_target(leg);

        match balance {
            Ok(balance) if balance.0 >= expected.0 => {}
            outcome => {
                swap.release_pending(leg);
                let reason = match outcome {
                    Ok(_) => SwapError::InsufficientFunds.to_string(),
                    Err(_) => "balance lookup on the token ledger failed".to_string(),
                };
                env::log_str(&format!(
                    "ESCROW_ABORTED: hashlock='{}', caller='{}', reason='{}'",
                    event::hash_lock_repr(&key),
                    caller,
                    reason,
                ));
                return PromiseOrValue::Value(());
            }
        }

        let token = swap.asset_ref.clone();
        PromiseOrValue::Promise(
            ext_fungible_token::ext(token)
                .with_attached_deposit(NearToken::from_yoctonear(1))
                .with_static_gas(env::prepaid_gas().saturating_div(4))
                .ft_transfer_from(
                    caller.clone(),
                    env::current_account_id(),
                    expected,
                    Some("premium swap escrow".to_string()),
                )
                .then(
                    ext_self::ext(env::current_account_id())
                        .with_static_gas(env::prepaid_gas().saturating_div(4))
                        .on_escrow_settled(hash_lock, leg, caller),
                ),
        )
    }

    /// Commits a deposit once its transfer has settled, or releases the leg
    /// if the transfer failed so the escrow can be retried.
    #[private]
    pub fn on_escrow_settled(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        hash_lock: Base58CryptoHash,
        leg: LegKind,
        caller: AccountId,
    ) {
        let key: SwapId = hash_lock.into();
        let Some(swap) = self.swaps.get_mut(&key) else {
            return;
        };

        if result.is_err() {
            swap.release_pending(leg);
            env::log_str(&format!(
                "ESCROW_ABORTED: hashlock='{}', caller='{}', reason='deposit transfer failed'",
                event::hash_lock_repr(&key),
                caller,
            ));
            return;
        }

        swap.commit_escrow(leg);
        let kind = match leg {
            LegKind::Premium => event::PREMIUM_ESCROWED,
            LegKind::Asset => event::ASSET_ESCROWED,
        };
        event::emit(
            kind,
            &TransitionData {
                hash_lock: event::hash_lock_repr(&key),
                actor: caller.clone(),
                amount: swap.escrow_target(leg),
                from: caller,
                to: env::current_account_id(),
                premium_current: swap.premium.current,
                asset_current: swap.asset.current,
            },
        );
    }

    /// Finalizes a redeem/refund: emits the transition event on success, or
    /// restores the leg to `Escrowed` if the payout transfer failed.
    #[private]
    pub fn on_resolution_settled(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        hash_lock: Base58CryptoHash,
        resolution: Resolution,
        actor: AccountId,
    ) {
        let key: SwapId = hash_lock.into();
        let Some(swap) = self.swaps.get_mut(&key) else {
            return;
        };

        if result.is_err() {
            swap.restore_escrowed(resolution);
            env::log_str(&format!(
                "RESOLUTION_REVERTED: hashlock='{}', actor='{}'",
                event::hash_lock_repr(&key),
                actor,
            ));
            return;
        }

        let (kind, amount, to) = match resolution {
            Resolution::AssetRedeem => {
                (event::ASSET_REDEEMED, swap.asset.expected, actor.clone())
            }
            Resolution::AssetRefund => (
                event::ASSET_REFUNDED,
                swap.asset.expected,
                swap.asset_escrower.clone(),
            ),
            Resolution::PremiumRefund => (
                event::PREMIUM_REFUNDED,
                swap.premium.expected,
                swap.premium_escrower.clone(),
            ),
            Resolution::PremiumRedeem => (
                event::PREMIUM_REDEEMED,
                swap.premium.expected,
                swap.premium_escrower.clone(),
            ),
        };
        event::emit(
            kind,
            &TransitionData {
                hash_lock: event::hash_lock_repr(&key),
                actor,
                amount,
                from: env::current_account_id(),
                to,
                premium_current: swap.premium.current,
                asset_current: swap.asset.current,
            },
        );
    }
}

impl Contract {
    /// Shared front half of the two deposit operations: synchronous guards,
    /// then the `Pending` lock, then the balance-check/transfer promise chain.
    fn start_escrow(
        &mut self,
        hash_lock: Base58CryptoHash,
        leg: LegKind,
    ) -> Result<Promise, SwapError> {
        let key: SwapId = hash_lock.into();
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let swap = self.swaps.get_mut(&key).ok_or(SwapError::UnknownSwap)?;

        match leg {
            LegKind::Premium => {
                guards::require_caller_is(
                    &swap.premium_escrower,
                    &caller,
                    "only the premium escrower may escrow the premium",
                )?;
                guards::require_leg_empty(
                    swap.premium.state,
                    "the premium has already been escrowed",
                )?;
                guards::require_before(
                    now,
                    swap.premium.deadline,
                    "the premium escrow window has closed",
                )?;
            }
            LegKind::Asset => {
                guards::require_caller_is(
                    &swap.asset_escrower,
                    &caller,
                    "only the asset escrower may escrow the asset",
                )?;
                guards::require_leg_escrowed(
                    swap.premium.state,
                    "the premium must be escrowed before the asset",
                    "the premium leg has already been resolved",
                )?;
                guards::require_leg_empty(swap.asset.state, "the asset has already been escrowed")?;
                guards::require_before(
                    now,
                    swap.asset.escrow_deadline,
                    "the asset escrow window has closed",
                )?;
            }
        }

        swap.lock_pending(leg);
        let token = swap.asset_ref.clone();

        Ok(ext_fungible_token::ext(token)
            .with_static_gas(env::prepaid_gas().saturating_div(4))
            .ft_balance_of(caller.clone())
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(env::prepaid_gas().saturating_div(4))
                    .on_escrow_funds_checked(hash_lock, leg, caller),
            ))
    }
}

/// Issues the payout transfer for a terminal transition. Counters were already
/// driven to their terminal values by the caller, so a re-entrant call during
/// the transfer sees the resolved leg and is rejected by the guards.
fn transfer_out(
    token: AccountId,
    hash_lock: Base58CryptoHash,
    resolution: Resolution,
    actor: AccountId,
    recipient: AccountId,
    amount: U128,
) -> Promise {
    ext_fungible_token::ext(token)
        .with_attached_deposit(NearToken::from_yoctonear(1))
        .with_static_gas(env::prepaid_gas().saturating_div(4))
        .ft_transfer(recipient, amount, Some("premium swap escrow".to_string()))
        .then(
            ext_self::ext(env::current_account_id())
                .with_static_gas(env::prepaid_gas().saturating_div(4))
                .on_resolution_settled(hash_lock, resolution, actor),
        )
}
