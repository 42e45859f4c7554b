extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env,
};

use crate::{Crowdsale, CrowdsaleClient, Error, SaleStatus};

const CAP: i128 = 20_000;
const RATE: i128 = 2;
const MIN_ORDER: i128 = 1_000;
const MIN_WITHDRAWAL: i128 = 1_000;
const SALE_DURATION: u64 = 86_400;

fn setup() -> (Env, CrowdsaleClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(Crowdsale, ());
    let client = CrowdsaleClient::new(&env, &contract_id);
    (env, client)
}

fn create_token<'a>(env: &Env, admin: &Address) -> (token::Client<'a>, token::StellarAssetClient<'a>) {
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    (
        token::Client::new(env, &sac.address()),
        token::StellarAssetClient::new(env, &sac.address()),
    )
}

fn setup_sale() -> (
    Env,
    CrowdsaleClient<'static>,
    token::Client<'static>,
    token::StellarAssetClient<'static>,
) {
    let (env, client) = setup();
    let token_admin = Address::generate(&env);
    let (token_client, token_sac) = create_token(&env, &token_admin);
    client.init(
        &token_client.address,
        &CAP,
        &RATE,
        &MIN_ORDER,
        &MIN_WITHDRAWAL,
        &(env.ledger().timestamp() + SALE_DURATION),
    );
    (env, client, token_client, token_sac)
}

fn end_sale(env: &Env) {
    env.ledger().with_mut(|li| li.timestamp += SALE_DURATION + 1);
}

#[test]
fn test_accepts_contribution_and_records_order() {
    let (env, client, token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);

    client.contribute(&buyer, &2_000);

    assert_eq!(token.balance(&client.address), 2_000);
    assert_eq!(token.balance(&buyer), 0);
    assert_eq!(client.check_order(&buyer), 4_000);

    let sale = client.get_sale();
    assert_eq!(sale.total_raised, 2_000);
    assert_eq!(sale.order_count, 1);
    assert_eq!(sale.status, SaleStatus::Open);
}

#[test]
fn test_repeat_contributions_accumulate() {
    let (env, client, _token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &5_000);

    client.contribute(&buyer, &2_000);
    client.contribute(&buyer, &3_000);

    assert_eq!(client.check_order(&buyer), 10_000);
    // Same identity, one index slot.
    assert_eq!(client.get_sale().order_count, 1);
    assert_eq!(client.get_sale().total_raised, 5_000);
}

#[test]
fn test_withdrawal_returns_funds_and_shrinks_order() {
    let (env, client, token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);

    client.contribute(&buyer, &2_000);
    client.withdraw(&buyer, &1_000);

    assert_eq!(token.balance(&client.address), 1_000);
    assert_eq!(token.balance(&buyer), 1_000);
    assert_eq!(client.check_order(&buyer), 2_000);
    assert_eq!(client.get_sale().total_raised, 1_000);
}

#[test]
fn test_rejects_contribution_below_minimum() {
    let (env, client, token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);

    assert_eq!(
        client.try_contribute(&buyer, &999),
        Err(Ok(Error::BelowMinimum))
    );

    // The rejected call left everything untouched.
    assert_eq!(client.check_order(&buyer), 0);
    assert_eq!(client.get_sale().total_raised, 0);
    assert_eq!(client.get_sale().order_count, 0);
    assert_eq!(token.balance(&buyer), 2_000);
}

#[test]
fn test_rejects_withdrawal_below_minimum() {
    let (env, client, _token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);
    client.contribute(&buyer, &2_000);

    assert_eq!(
        client.try_withdraw(&buyer, &999),
        Err(Ok(Error::BelowMinimum))
    );
    assert_eq!(client.check_order(&buyer), 4_000);
}

#[test]
fn test_rejects_withdrawal_exceeding_order() {
    let (env, client, _token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);
    client.contribute(&buyer, &2_000);

    assert_eq!(
        client.try_withdraw(&buyer, &2_001),
        Err(Ok(Error::InsufficientOrder))
    );
    assert_eq!(client.check_order(&buyer), 4_000);
    assert_eq!(client.get_sale().total_raised, 2_000);
}

#[test]
fn test_withdrawal_from_unknown_identity_rejected() {
    let (env, client, _token, _sac) = setup_sale();
    let stranger = Address::generate(&env);

    assert_eq!(
        client.try_withdraw(&stranger, &1_000),
        Err(Ok(Error::InsufficientOrder))
    );
}

#[test]
fn test_withdraw_to_zero_keeps_index_slot() {
    let (env, client, _token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &2_000);

    client.contribute(&buyer, &2_000);
    client.withdraw(&buyer, &2_000);

    assert_eq!(client.check_order(&buyer), 0);
    assert_eq!(client.get_sale().order_count, 1);

    // Re-contributing reuses the existing slot instead of appending again.
    sac.mint(&buyer, &1_000);
    client.contribute(&buyer, &1_000);
    assert_eq!(client.check_order(&buyer), 2_000);
    assert_eq!(client.get_sale().order_count, 1);
}

#[test]
fn test_ledger_mutations_rejected_once_payout_starts() {
    let (env, client, _token, sac) = setup_sale();
    let buyer = Address::generate(&env);
    sac.mint(&buyer, &4_000);
    client.contribute(&buyer, &2_000);

    end_sale(&env);
    client.initiate_payout();

    assert_eq!(
        client.try_contribute(&buyer, &2_000),
        Err(Ok(Error::SaleNotOpen))
    );
    assert_eq!(
        client.try_withdraw(&buyer, &1_000),
        Err(Ok(Error::SaleNotOpen))
    );
    assert_eq!(client.get_sale().total_raised, 2_000);
}

#[test]
fn test_init_twice_fails() {
    let (env, client, token, _sac) = setup_sale();
    let end = env.ledger().timestamp() + SALE_DURATION;

    assert_eq!(
        client.try_init(&token.address, &CAP, &RATE, &MIN_ORDER, &MIN_WITHDRAWAL, &end),
        Err(Ok(Error::AlreadyInitialized))
    );
}

#[test]
fn test_init_rejects_past_end_time() {
    let (env, client) = setup();
    let token = Address::generate(&env);
    env.ledger().with_mut(|li| li.timestamp = 1_000);

    assert_eq!(
        client.try_init(&token, &CAP, &RATE, &MIN_ORDER, &MIN_WITHDRAWAL, &500),
        Err(Ok(Error::InvalidParams))
    );
}

#[test]
fn test_init_rejects_nonpositive_params() {
    let (env, client) = setup();
    let token = Address::generate(&env);
    let end = env.ledger().timestamp() + SALE_DURATION;

    assert_eq!(
        client.try_init(&token, &0, &RATE, &MIN_ORDER, &MIN_WITHDRAWAL, &end),
        Err(Ok(Error::InvalidParams))
    );
    assert_eq!(
        client.try_init(&token, &CAP, &0, &MIN_ORDER, &MIN_WITHDRAWAL, &end),
        Err(Ok(Error::InvalidParams))
    );
    assert_eq!(
        client.try_init(&token, &CAP, &RATE, &-1, &MIN_WITHDRAWAL, &end),
        Err(Ok(Error::InvalidParams))
    );
}
