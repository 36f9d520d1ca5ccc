//! Shared ledger plumbing for the Beango Town contracts.
//!
//! - TTL policy for persistent entries, so per-player and per-bout records
//!   never archive while a game is in flight.
//! - Pass-token eligibility: holding any of a small set of interchangeable
//!   pass tokens unlocks play.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{token::TokenClient, Address, Env, IntoVal, Val, Vec};

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Seconds in one UTC day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Write `value` under `key` in persistent storage and push its TTL out to
/// `PERSISTENT_BUMP_LEDGERS`.
pub fn put_persistent<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

/// True when `account` holds a positive balance of any token in `tokens`.
///
/// Stops at the first token with a positive balance, so callers should list
/// the most common pass first.
pub fn holds_any(env: &Env, tokens: &Vec<Address>, account: &Address) -> bool {
    tokens
        .iter()
        .any(|token| TokenClient::new(env, &token).balance(account) > 0)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, token::StellarAssetClient, vec};

    fn create_token<'a>(env: &'a Env, admin: &Address) -> (Address, StellarAssetClient<'a>) {
        let contract = env.register_stellar_asset_contract_v2(admin.clone());
        let client = StellarAssetClient::new(env, &contract.address());
        (contract.address(), client)
    }

    #[test]
    fn test_holds_any_false_without_balance() {
        let env = Env::default();
        env.mock_all_auths();
        let issuer = Address::generate(&env);
        let (pass_a, _) = create_token(&env, &issuer);
        let (pass_b, _) = create_token(&env, &issuer);

        let player = Address::generate(&env);
        assert!(!holds_any(&env, &vec![&env, pass_a, pass_b], &player));
    }

    #[test]
    fn test_holds_any_accepts_any_listed_pass() {
        let env = Env::default();
        env.mock_all_auths();
        let issuer = Address::generate(&env);
        let (pass_a, _) = create_token(&env, &issuer);
        let (pass_b, sac_b) = create_token(&env, &issuer);

        let player = Address::generate(&env);
        sac_b.mint(&player, &1);

        assert!(holds_any(&env, &vec![&env, pass_a.clone(), pass_b], &player));
        assert!(!holds_any(&env, &vec![&env, pass_a], &player));
    }

    #[test]
    fn test_holds_any_empty_set_is_ineligible() {
        let env = Env::default();
        let player = Address::generate(&env);
        assert!(!holds_any(&env, &Vec::new(&env), &player));
    }
}
