//! # Events
//!
//! Contract events emitted by the crowdsale, one payload struct per event.
//!
//! Topics follow the `(symbol, subject)` convention: per-order events carry
//! the contributor's address as the second topic so an off-chain consumer
//! can filter by identity without decoding payloads; sale-wide events carry
//! only the symbol.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// A contribution was accepted while the sale was open.
/// Topic: `("ordered", buyer)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReceived {
    pub amount: i128,
    /// Token-equivalent of `amount` at the sale rate.
    pub tokens_ordered: i128,
}

/// Part of an order was withdrawn while the sale was open.
/// Topic: `("withdrawn", buyer)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingWithdrawn {
    pub amount: i128,
}

/// The sale left `Open` and entered the payout state machine.
/// Topic: `("payout",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PayoutStarted {
    pub total_raised: i128,
    pub order_count: u32,
}

/// A distribution pass confirmed an order's finalized token allotment.
/// Topic: `("allotted", buyer)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensAllotted {
    pub tokens: i128,
}

/// Every order has been finalized; refund claims are open.
/// Topic: `("refunds",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundsOpen {
    pub total_accepted: i128,
    pub total_raised: i128,
}

/// An overflow contributor claimed their refund.
/// Topic: `("refunded", buyer)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundPaid {
    pub amount: i128,
}

pub fn contribution_received(env: &Env, buyer: &Address, amount: i128, tokens_ordered: i128) {
    env.events().publish(
        (symbol_short!("ordered"), buyer.clone()),
        ContributionReceived {
            amount,
            tokens_ordered,
        },
    );
}

pub fn funding_withdrawn(env: &Env, buyer: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("withdrawn"), buyer.clone()),
        FundingWithdrawn { amount },
    );
}

pub fn payout_started(env: &Env, total_raised: i128, order_count: u32) {
    env.events().publish(
        (symbol_short!("payout"),),
        PayoutStarted {
            total_raised,
            order_count,
        },
    );
}

pub fn tokens_allotted(env: &Env, buyer: &Address, tokens: i128) {
    env.events().publish(
        (symbol_short!("allotted"), buyer.clone()),
        TokensAllotted { tokens },
    );
}

pub fn refunds_open(env: &Env, total_accepted: i128, total_raised: i128) {
    env.events().publish(
        (symbol_short!("refunds"),),
        RefundsOpen {
            total_accepted,
            total_raised,
        },
    );
}

pub fn refund_paid(env: &Env, buyer: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), buyer.clone()),
        RefundPaid { amount },
    );
}
