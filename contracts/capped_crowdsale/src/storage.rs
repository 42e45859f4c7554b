//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the crowdsale:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key          | Type         | Description                          |
//! |--------------|--------------|--------------------------------------|
//! | `Config`     | `SaleConfig` | Immutable sale parameters            |
//! | `State`      | `SaleState`  | Lifecycle, totals, payout cursors    |
//! | `OrderCount` | `u32`        | Number of distinct contributors      |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day
//! remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                | Type      | Description                            |
//! |--------------------|-----------|----------------------------------------|
//! | `Contributor(i)`   | `Address` | Contribution-sequence index, appended  |
//! |                    |           | on an identity's first contribution    |
//! | `Order(addr)`      | `Order`   | Per-identity order record              |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining.
//!
//! ## Why an explicit contributor index?
//!
//! Cap allocation is first-come-first-served, and the payout cursors in
//! [`crate::types::PayoutRound`] are offsets into a *stable* iteration
//! order. `Contributor(i)` pins that order at first-contribution time; an
//! identity that withdraws to zero keeps its slot (the record is never
//! deleted), so cursors stay valid across the whole sale.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Order, SaleConfig, SaleState};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
///
/// Instance-tier keys (`Config`, `State`, `OrderCount`) live as long as the
/// contract and are extended together. Persistent-tier keys
/// (`Contributor`, `Order`) hold per-contributor data with independent TTLs.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable sale parameters (Instance).
    Config,
    /// Mutable sale state (Instance).
    State,
    /// Number of distinct contributors (Instance).
    OrderCount,
    /// Contribution-sequence index entry (Persistent).
    Contributor(u32),
    /// Per-identity order record (Persistent).
    Order(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Returns `true` once `init` has written the sale configuration.
pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Store the immutable sale configuration. Written exactly once by `init`.
pub fn save_config(env: &Env, config: &SaleConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the sale configuration.
/// Panics if the contract has not been initialized.
pub fn load_config(env: &Env) -> SaleConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("sale not initialized")
}

/// Store the mutable sale state.
pub fn save_state(env: &Env, state: &SaleState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

/// Load the mutable sale state.
/// Panics if the contract has not been initialized.
pub fn load_state(env: &Env) -> SaleState {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .expect("sale not initialized")
}

/// Number of distinct contributors ever seen (and length of the
/// contribution-sequence index).
pub fn order_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::OrderCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Append `buyer` to the contribution-sequence index.
///
/// Must be called exactly once per identity, on its first contribution;
/// the slot is never reused or removed afterwards.
pub fn append_contributor(env: &Env, buyer: &Address) {
    let count = order_count(env);
    let key = DataKey::Contributor(count);
    env.storage().persistent().set(&key, buyer);
    bump_persistent(env, &key);
    env.storage()
        .instance()
        .set(&DataKey::OrderCount, &(count + 1));
    bump_instance(env);
}

/// Look up the contributor at position `index` in contribution sequence.
/// Panics if the index is out of range.
pub fn contributor_at(env: &Env, index: u32) -> Address {
    let key = DataKey::Contributor(index);
    let buyer: Address = env
        .storage()
        .persistent()
        .get(&key)
        .expect("contributor index out of range");
    bump_persistent(env, &key);
    buyer
}

/// Load `buyer`'s order record, if one exists.
pub fn try_load_order(env: &Env, buyer: &Address) -> Option<Order> {
    let key = DataKey::Order(buyer.clone());
    let order: Option<Order> = env.storage().persistent().get(&key);
    if order.is_some() {
        bump_persistent(env, &key);
    }
    order
}

/// Load `buyer`'s order record, or an empty order if none exists.
pub fn load_order(env: &Env, buyer: &Address) -> Order {
    try_load_order(env, buyer).unwrap_or_else(Order::empty)
}

/// Save `buyer`'s order record.
pub fn save_order(env: &Env, buyer: &Address, order: &Order) {
    let key = DataKey::Order(buyer.clone());
    env.storage().persistent().set(&key, order);
    bump_persistent(env, &key);
}
