//! # Payout
//!
//! The batched settlement engine: cap allocation and the resumable phase
//! controller behind `initiate_payout` / `continue_payout`.
//!
//! ## Why batched?
//!
//! A single invocation has a hard ceiling on the work it may perform, so a
//! settlement pass whose cost scales with the number of orders cannot run in
//! one call. Instead, every `continue_payout` call processes at most
//! [`PAYOUT_SLICE`] orders and persists its position in the
//! [`PayoutRound`] cursors, letting *any* caller resume the pass later.
//!
//! ## Round structure
//!
//! Each round is a pruning slice followed by a distribution pass over that
//! same slice:
//!
//! - **Pruning** runs the cap allocator over the next slice of unfinalized
//!   orders, then hands the slice to **Distributing**. A pruning call that
//!   finds no remaining work moves the sale to **Refunding** instead, which
//!   is terminal.
//! - **Distributing** confirms the allotments the slice just computed
//!   (emitting one `allotted` event per accepted order) and returns to
//!   **Pruning** for the next round.
//!
//! A ledger of `n` orders therefore settles in `ceil(n / PAYOUT_SLICE)`
//! prune/distribute rounds plus one final pruning call that finds nothing
//! left and opens refunds.
//!
//! ## Idempotency
//!
//! The cap allocator writes `tokens_allotted` and `refund_owed` exactly once
//! per order and sets `finalized`; a finalized order is skipped, never
//! reprocessed, so resuming after any interleaving of callers cannot
//! double-apply an allocation.

use soroban_sdk::{panic_with_error, Env};

use crate::events;
use crate::storage;
use crate::types::{PayoutPhase, PayoutRound, SaleConfig, SaleLifecycle, SaleState};
use crate::Error;

/// Maximum number of orders touched by a single `continue_payout` call.
///
/// Sized to keep one call comfortably inside the per-invocation read/write
/// budget regardless of ledger size.
#[cfg(not(test))]
pub const PAYOUT_SLICE: u32 = 64;
/// Shrunk under test so a handful of orders exercises multi-round payouts.
#[cfg(test)]
pub const PAYOUT_SLICE: u32 = 2;

/// Move the sale from `Open` into `Payout{Pruning}` with fresh cursors.
///
/// Guards: the sale must be open (`SaleNotOpen`) and the sale end time must
/// have passed (`TooEarly`).
pub fn start(env: &Env, config: &SaleConfig, state: &mut SaleState) {
    if state.lifecycle != SaleLifecycle::Open {
        panic_with_error!(env, Error::SaleNotOpen);
    }
    if env.ledger().timestamp() < config.sale_end_time {
        panic_with_error!(env, Error::TooEarly);
    }

    state.lifecycle = SaleLifecycle::Payout(PayoutRound {
        phase: PayoutPhase::Pruning,
        pruned: 0,
        distributed: 0,
    });

    events::payout_started(env, state.total_raised, storage::order_count(env));
}

/// Execute one bounded settlement step and return the phase after the call.
///
/// Panics with `NotInPayout` if the sale is still open. Calling in
/// `Refunding` is a harmless no-op: the terminal phase never regresses.
pub fn step(env: &Env, config: &SaleConfig, state: &mut SaleState) -> PayoutPhase {
    let mut round = match &state.lifecycle {
        SaleLifecycle::Payout(round) => round.clone(),
        SaleLifecycle::Open => panic_with_error!(env, Error::NotInPayout),
    };

    match round.phase {
        PayoutPhase::Pruning => prune_slice(env, config, state, &mut round),
        PayoutPhase::Distributing => distribute_slice(env, &mut round),
        PayoutPhase::Refunding => {}
    }

    let phase = round.phase.clone();
    state.lifecycle = SaleLifecycle::Payout(round);
    phase
}

/// Run the cap allocator over the next slice of orders, in contribution
/// sequence, then hand the slice to the distribution pass. Finding no
/// remaining work opens refunds instead.
fn prune_slice(env: &Env, config: &SaleConfig, state: &mut SaleState, round: &mut PayoutRound) {
    let count = storage::order_count(env);
    if round.pruned >= count {
        round.phase = PayoutPhase::Refunding;
        events::refunds_open(env, state.total_accepted, state.total_raised);
        return;
    }

    let end = count.min(round.pruned + PAYOUT_SLICE);
    while round.pruned < end {
        let buyer = storage::contributor_at(env, round.pruned);
        let mut order = storage::load_order(env, &buyer);
        if !order.finalized {
            // FIFO split against the cap: accept in full while room remains,
            // split the straddling order, refund everything after.
            let remaining = config.cap - state.total_accepted;
            let accepted = if order.contributed <= remaining {
                order.contributed
            } else {
                remaining
            };
            order.tokens_allotted = accepted * config.token_rate;
            order.refund_owed = order.contributed - accepted;
            order.finalized = true;
            state.total_accepted += accepted;
            storage::save_order(env, &buyer, &order);
        }
        round.pruned += 1;
    }

    round.phase = PayoutPhase::Distributing;
}

/// Confirm the allotments computed by the last pruning slice and return to
/// pruning for the next round.
///
/// The window `[distributed, pruned)` is at most one slice wide because
/// distribution always catches up fully before pruning advances again.
fn distribute_slice(env: &Env, round: &mut PayoutRound) {
    while round.distributed < round.pruned {
        let buyer = storage::contributor_at(env, round.distributed);
        let order = storage::load_order(env, &buyer);
        if order.tokens_allotted > 0 {
            events::tokens_allotted(env, &buyer, order.tokens_allotted);
        }
        round.distributed += 1;
    }

    round.phase = PayoutPhase::Pruning;
}
