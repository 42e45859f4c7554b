//! # Capped Crowdsale Contract
//!
//! A capped fundraising ledger: contributions accumulate while the sale is
//! open, total acceptance is capped at a fixed threshold, accepted value is
//! allotted a proportional token claim, and settlement runs as a resumable
//! batched state machine driven by repeated external calls.
//!
//! | Phase      | Entry Point(s)                                    |
//! |------------|---------------------------------------------------|
//! | Bootstrap  | [`Crowdsale::init`]                               |
//! | Open       | [`Crowdsale::contribute`], [`Crowdsale::withdraw`] |
//! | Settlement | [`Crowdsale::initiate_payout`], [`Crowdsale::continue_payout`] |
//! | Refunds    | [`Crowdsale::withdraw_refund`]                    |
//! | Queries    | `check_order`, `check_tokens_owned`, `get_order`, `state`, `payout_phase`, `get_sale` |
//!
//! ## Architecture
//!
//! Settlement logic is fully delegated to [`payout`]. Storage access is
//! fully delegated to [`storage`]. This file contains **only** the public
//! entry points, their guards, and event emissions.
//!
//! Settlement is callable by *anyone*: `initiate_payout` and
//! `continue_payout` take no caller and require no authorization, so
//! correctness never depends on who cranks the machine. Per-order reads are
//! self-scoped — they take the owner's address and `require_auth` it, so no
//! identity can read another's order.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, Env,
};

mod events;
mod payout;
mod storage;
mod types;

#[cfg(test)]
mod test_orders;

pub use payout::PAYOUT_SLICE;
pub use types::{Order, PayoutPhase, Sale, SaleStatus};

use types::{SaleConfig, SaleLifecycle, SaleState};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    InvalidParams      = 2,
    SaleNotOpen        = 3,
    BelowMinimum       = 4,
    InsufficientOrder  = 5,
    TooEarly           = 6,
    NotInPayout        = 7,
    NotRefunding       = 8,
    NoRefundOwed       = 9,
}

#[contract]
pub struct Crowdsale;

#[contractimpl]
impl Crowdsale {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the sale and fix its parameters.
    ///
    /// Must be called exactly once immediately after deployment; subsequent
    /// calls panic with `Error::AlreadyInitialized`.
    ///
    /// - `token` — settlement currency; all amounts are integer minor units.
    /// - `cap` — maximum total contribution value accepted.
    /// - `token_rate` — tokens allotted per accepted minor unit.
    /// - `min_order` / `min_withdrawal` — floors enforced while open.
    /// - `sale_end_time` — ledger timestamp after which payout may begin.
    ///
    /// All scalars must be positive and `sale_end_time` strictly in the
    /// future, otherwise `Error::InvalidParams`.
    pub fn init(
        env: Env,
        token: Address,
        cap: i128,
        token_rate: i128,
        min_order: i128,
        min_withdrawal: i128,
        sale_end_time: u64,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        if cap <= 0
            || token_rate <= 0
            || min_order <= 0
            || min_withdrawal <= 0
            || sale_end_time <= env.ledger().timestamp()
        {
            panic_with_error!(&env, Error::InvalidParams);
        }

        storage::save_config(
            &env,
            &SaleConfig {
                token,
                cap,
                token_rate,
                min_order,
                min_withdrawal,
                sale_end_time,
            },
        );
        storage::save_state(
            &env,
            &SaleState {
                lifecycle: SaleLifecycle::Open,
                total_raised: 0,
                total_accepted: 0,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Open period: order ledger
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` to the sale, crediting the caller's order.
    ///
    /// Valid only while the sale is open. Fails with `BelowMinimum` if
    /// `amount < min_order`. The first contribution from an identity
    /// appends it to the contribution-sequence index, which later fixes its
    /// position in cap allocation.
    pub fn contribute(env: Env, buyer: Address, amount: i128) -> Result<(), Error> {
        buyer.require_auth();

        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);

        if state.lifecycle != SaleLifecycle::Open {
            panic_with_error!(&env, Error::SaleNotOpen);
        }
        if amount < config.min_order {
            panic_with_error!(&env, Error::BelowMinimum);
        }

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&buyer, &env.current_contract_address(), &amount);

        let mut order = match storage::try_load_order(&env, &buyer) {
            Some(order) => order,
            None => {
                storage::append_contributor(&env, &buyer);
                Order::empty()
            }
        };
        order.contributed += amount;
        storage::save_order(&env, &buyer, &order);

        state.total_raised += amount;
        storage::save_state(&env, &state);

        events::contribution_received(&env, &buyer, amount, amount * config.token_rate);
        Ok(())
    }

    /// Withdraw `amount` from the caller's order, returning the funds.
    ///
    /// Valid only while the sale is open. Fails with `BelowMinimum` if
    /// `amount < min_withdrawal`, and with `InsufficientOrder` if `amount`
    /// exceeds the caller's held balance. Withdrawing to zero keeps the
    /// order record and its index slot.
    pub fn withdraw(env: Env, buyer: Address, amount: i128) -> Result<(), Error> {
        buyer.require_auth();

        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);

        if state.lifecycle != SaleLifecycle::Open {
            panic_with_error!(&env, Error::SaleNotOpen);
        }
        if amount < config.min_withdrawal {
            panic_with_error!(&env, Error::BelowMinimum);
        }

        let mut order = storage::load_order(&env, &buyer);
        if amount > order.contributed {
            panic_with_error!(&env, Error::InsufficientOrder);
        }

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&env.current_contract_address(), &buyer, &amount);

        order.contributed -= amount;
        storage::save_order(&env, &buyer, &order);

        state.total_raised -= amount;
        storage::save_state(&env, &state);

        events::funding_withdrawn(&env, &buyer, amount);
        Ok(())
    }

    /// Return the caller's pending token-equivalent order
    /// (`contributed * token_rate`). Self-scoped.
    pub fn check_order(env: Env, buyer: Address) -> i128 {
        buyer.require_auth();
        let config = storage::load_config(&env);
        storage::load_order(&env, &buyer).contributed * config.token_rate
    }

    // ─────────────────────────────────────────────────────────
    // Settlement: batched payout state machine
    // ─────────────────────────────────────────────────────────

    /// Move the sale into payout. Callable by anyone once the sale end time
    /// has passed; fails with `TooEarly` before it.
    pub fn initiate_payout(env: Env) -> Result<(), Error> {
        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);
        payout::start(&env, &config, &mut state);
        storage::save_state(&env, &state);
        Ok(())
    }

    /// Process one bounded settlement slice and return the phase after the
    /// call. Callable by anyone; fails with `NotInPayout` while the sale is
    /// still open. A no-op once refunds are open.
    pub fn continue_payout(env: Env) -> Result<PayoutPhase, Error> {
        let config = storage::load_config(&env);
        let mut state = storage::load_state(&env);
        let phase = payout::step(&env, &config, &mut state);
        storage::save_state(&env, &state);
        Ok(phase)
    }

    /// Pay out the caller's refund, once refunds are open.
    ///
    /// Fails with `NotRefunding` before the refunding phase and with
    /// `NoRefundOwed` if nothing is owed or the refund was already claimed.
    /// `refund_owed` is kept on the record after payment; `refund_claimed`
    /// is the sole double-pay guard.
    pub fn withdraw_refund(env: Env, buyer: Address) -> Result<(), Error> {
        buyer.require_auth();

        let config = storage::load_config(&env);
        let state = storage::load_state(&env);

        match &state.lifecycle {
            SaleLifecycle::Payout(round) if round.phase == PayoutPhase::Refunding => {}
            _ => panic_with_error!(&env, Error::NotRefunding),
        }

        let mut order = storage::load_order(&env, &buyer);
        if order.refund_owed == 0 || order.refund_claimed {
            panic_with_error!(&env, Error::NoRefundOwed);
        }

        let token_client = token::Client::new(&env, &config.token);
        token_client.transfer(&env.current_contract_address(), &buyer, &order.refund_owed);

        order.refund_claimed = true;
        storage::save_order(&env, &buyer, &order);

        events::refund_paid(&env, &buyer, order.refund_owed);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Return the caller's finalized token allotment (zero until the cap
    /// allocator has processed the order). Self-scoped.
    pub fn check_tokens_owned(env: Env, buyer: Address) -> i128 {
        buyer.require_auth();
        storage::load_order(&env, &buyer).tokens_allotted
    }

    /// Return the caller's full order record. Self-scoped.
    pub fn get_order(env: Env, buyer: Address) -> Order {
        buyer.require_auth();
        storage::load_order(&env, &buyer)
    }

    /// Current coarse sale state.
    pub fn state(env: Env) -> SaleStatus {
        match storage::load_state(&env).lifecycle {
            SaleLifecycle::Open => SaleStatus::Open,
            SaleLifecycle::Payout(_) => SaleStatus::Payout,
        }
    }

    /// Current payout phase, or `None` while the sale is still open.
    pub fn payout_phase(env: Env) -> Option<PayoutPhase> {
        match storage::load_state(&env).lifecycle {
            SaleLifecycle::Open => None,
            SaleLifecycle::Payout(round) => Some(round.phase),
        }
    }

    /// Full public view of the sale, reconstructed from the split
    /// config/state storage entries.
    pub fn get_sale(env: Env) -> Sale {
        let config = storage::load_config(&env);
        let state = storage::load_state(&env);
        Sale {
            token: config.token,
            cap: config.cap,
            token_rate: config.token_rate,
            min_order: config.min_order,
            min_withdrawal: config.min_withdrawal,
            sale_end_time: config.sale_end_time,
            total_raised: state.total_raised,
            total_accepted: state.total_accepted,
            order_count: storage::order_count(&env),
            status: match state.lifecycle {
                SaleLifecycle::Open => SaleStatus::Open,
                SaleLifecycle::Payout(_) => SaleStatus::Payout,
            },
        }
    }
}
