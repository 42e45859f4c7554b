//! # Types
//!
//! Shared data structures used across all modules of the crowdsale contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! The sale aggregate is internally stored as two separate ledger entries:
//!
//! - [`SaleConfig`] — written once at `init`; never mutated.
//! - [`SaleState`] — written on every contribution, withdrawal, and payout
//!   step.
//!
//! The public API exposes the reconstructed [`Sale`] struct for convenience.
//!
//! ### Lifecycle as a tagged state
//!
//! [`SaleLifecycle`] carries the payout cursors *inside* the `Payout`
//! variant, so a cursor simply does not exist while the sale is open and
//! illegal combinations (e.g. a pruning cursor on an open sale) are
//! unrepresentable:
//!
//! ```text
//! Open ──initiate_payout──► Payout{Pruning}
//!
//! Pruning ──work found──► Distributing ──► Pruning ──► ...
//! Pruning ──no work────► Refunding            (terminal)
//! ```
//!
//! Backward transitions and transitions out of `Refunding` are rejected by
//! the phase controller in [`crate::payout`].

use soroban_sdk::{contracttype, Address};

/// Coarse sale state, as exposed by the `state()` accessor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaleStatus {
    /// Accepting contributions and withdrawals.
    Open,
    /// Settlement in progress or complete; the order ledger is frozen.
    Payout,
}

/// Sub-phase of the payout settlement, meaningful only during `Payout`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PayoutPhase {
    /// The cap allocator is splitting orders into accepted and refundable
    /// portions.
    Pruning,
    /// Allotments computed by the last pruning slice are being confirmed.
    Distributing,
    /// All orders finalized; overflow contributors may claim refunds.
    Refunding,
}

/// Resumption state for the batched payout, stored inside
/// [`SaleLifecycle::Payout`].
///
/// Orders are finalized strictly in contribution sequence, so a single pair
/// of monotone cursors is enough to resume across calls: everything below
/// `pruned` has been through the cap allocator, everything below
/// `distributed` has additionally had its allotment confirmed.
/// `distributed <= pruned` always holds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutRound {
    pub phase: PayoutPhase,
    /// Index of the next order the cap allocator will process.
    pub pruned: u32,
    /// Index of the next order the distribution pass will confirm.
    pub distributed: u32,
}

/// Tagged lifecycle of the sale. See the module docs for the transition
/// diagram.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaleLifecycle {
    Open,
    Payout(PayoutRound),
}

/// Immutable sale parameters, written once at `init`.
///
/// Stored separately from mutable state so that the frequent writes
/// (contributions, payout steps) touch only the small [`SaleState`] entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Token the sale is denominated in (the settlement currency).
    pub token: Address,
    /// Maximum total contribution value the sale will accept.
    pub cap: i128,
    /// Tokens allotted per accepted minor unit of contribution.
    pub token_rate: i128,
    /// Smallest contribution accepted while the sale is open.
    pub min_order: i128,
    /// Smallest withdrawal accepted while the sale is open.
    pub min_withdrawal: i128,
    /// Ledger timestamp at which the sale may be moved into payout.
    pub sale_end_time: u64,
}

/// Mutable sale state, updated on every entry point that changes the ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    pub lifecycle: SaleLifecycle,
    /// Total value currently held against all orders.
    pub total_raised: i128,
    /// Running total accepted under the cap; only grows during pruning.
    pub total_accepted: i128,
}

/// One contributor's running balance and its derived settlement outcome.
///
/// `tokens_allotted` and `refund_owed` are each written exactly once, by the
/// cap allocator; `finalized` marks that write so a resumed pruning pass can
/// skip the order instead of reprocessing it. `refund_owed` is never zeroed
/// after a claim — `refund_claimed` is the sole double-pay guard, which
/// keeps the owed amount auditable.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub contributed: i128,
    pub tokens_allotted: i128,
    pub refund_owed: i128,
    pub finalized: bool,
    pub refund_claimed: bool,
}

impl Order {
    /// A fresh order with no contribution and no settlement outcome.
    pub fn empty() -> Self {
        Order {
            contributed: 0,
            tokens_allotted: 0,
            refund_owed: 0,
            finalized: false,
            refund_claimed: false,
        }
    }
}

/// Full public view of the sale, reconstructed from the split
/// `SaleConfig` + `SaleState` storage entries plus the order counter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sale {
    pub token: Address,
    pub cap: i128,
    pub token_rate: i128,
    pub min_order: i128,
    pub min_withdrawal: i128,
    pub sale_end_time: u64,
    pub total_raised: i128,
    pub total_accepted: i128,
    pub order_count: u32,
    pub status: SaleStatus,
}
