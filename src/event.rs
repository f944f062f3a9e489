//! Append-only observable log of successful transitions. Off-chain agents on
//! both deployments watch these lines to decide when to act on the counterpart
//! ledger, so every successful transition emits exactly one event and a
//! rejected call emits none.

use near_sdk::json_types::{U128, U64};
use near_sdk::serde::Serialize;
use near_sdk::{bs58, env, near, serde_json, AccountId, CryptoHash};

pub const EVENT_STANDARD: &str = "premium_swap";
pub const EVENT_VERSION: &str = "1.0.0";

pub const SET_UP: &str = "set_up";
pub const PREMIUM_ESCROWED: &str = "premium_escrowed";
pub const ASSET_ESCROWED: &str = "asset_escrowed";
pub const ASSET_REDEEMED: &str = "asset_redeemed";
pub const ASSET_REFUNDED: &str = "asset_refunded";
pub const PREMIUM_REFUNDED: &str = "premium_refunded";
pub const PREMIUM_REDEEMED: &str = "premium_redeemed";

/// Payload of `set_up`: the swap identity plus the advertised schedule
/// checkpoints the counterpart agents plan around.
#[near(serializers = [json])]
pub struct SetUpData {
    pub hash_lock: String,
    pub asset_escrower: AccountId,
    pub premium_escrower: AccountId,
    pub asset_ref: AccountId,
    pub expected_asset: U128,
    pub expected_premium: U128,
    pub start_time: U64,
    pub premium_deadline: U64,
    pub asset_escrow_deadline: U64,
    pub asset_timeout: U64,
}

/// Payload of every post-setup transition: who acted, what moved where, and
/// both resulting leg counters.
#[near(serializers = [json])]
pub struct TransitionData {
    pub hash_lock: String,
    pub actor: AccountId,
    pub amount: U128,
    pub from: AccountId,
    pub to: AccountId,
    pub premium_current: U128,
    pub asset_current: U128,
}

pub fn hash_lock_repr(hash_lock: &CryptoHash) -> String {
    bs58::encode(hash_lock).into_string()
}

/// NEP-297 frame shared by all seven event kinds.
pub fn emit<T: Serialize>(kind: &str, data: &T) {
    let payload = serde_json::json!({
        "standard": EVENT_STANDARD,
        "version": EVENT_VERSION,
        "event": kind,
        "data": [data],
    });
    env::log_str(&format!("EVENT_JSON:{payload}"));
}
