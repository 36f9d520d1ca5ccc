//! Beango Random Beacon Contract
//!
//! Publishes one verifiable random value per ledger height, fed by a
//! consensus oracle through a two-phase commit/reveal model:
//!
//! 1. Before height `h` closes, the oracle calls `commit_seed(h, sha256(seed))`.
//! 2. Once the ledger has reached `h`, the oracle calls `reveal_seed(h, seed)`.
//!    The contract checks the seed against the commitment and stores
//!
//!      `value(h) = sha256(seed || h_be_bytes)`
//!
//! Game contracts read `get_random_value(h)`. The value is write-once, so the
//! read is idempotent once available. Until the reveal lands the read fails
//! with `NotAvailable`; that is transient and callers retry later.
//!
//! ## Fairness Model
//! The commitment is fixed before height `h` exists, so neither the oracle nor
//! a player who triggers an action at some height below `h` can know or steer
//! the value the action will eventually consume.
//!
//! ## Storage Strategy
//! - `instance()`: Admin, Oracle.
//! - `persistent()`: Commitment and Value entries per height, TTL bumped on
//!   every write.
#![no_std]
#![allow(unexpected_cfgs)]

use beango_shared::put_persistent;
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, Address, Bytes,
    BytesN, Env,
};

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized     = 2,
    NotAuthorized      = 3,
    /// A seed for this height was already committed.
    AlreadyCommitted   = 4,
    /// `commit_seed` for a height the ledger has already reached.
    HeightNotInFuture  = 5,
    /// `reveal_seed` before the ledger reached the height.
    HeightNotReached   = 6,
    CommitmentNotFound = 7,
    /// `sha256(seed)` does not match the stored commitment.
    SeedMismatch       = 8,
    AlreadyRevealed    = 9,
    /// No value has been revealed for this height yet.
    NotAvailable       = 10,
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

#[contracttype]
pub enum DataKey {
    // --- instance() ---
    Admin,
    Oracle,
    // --- persistent() ---
    /// `sha256(seed)` committed for a height.
    Commitment(u32),
    /// The published random value for a height.
    Value(u32),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct SeedCommitted {
    #[topic]
    pub height: u32,
    pub seed_hash: BytesN<32>,
}

/// Carries the seed so off-chain verifiers can re-derive the value.
#[contractevent]
pub struct RandomnessPublished {
    #[topic]
    pub height: u32,
    pub seed: BytesN<32>,
    pub value: BytesN<32>,
}

#[contractevent]
pub struct OracleChanged {
    pub oracle: Address,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct RandomBeacon;

#[contractimpl]
impl RandomBeacon {
    /// Initialize the contract. May only be called once.
    ///
    /// `oracle` is the sole address permitted to commit and reveal seeds.
    pub fn init(env: Env, admin: Address, oracle: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Oracle, &oracle);

        Ok(())
    }

    /// Replace the oracle. Admin only.
    pub fn set_oracle(env: Env, admin: Address, oracle: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;

        env.storage().instance().set(&DataKey::Oracle, &oracle);
        OracleChanged { oracle }.publish(&env);

        Ok(())
    }

    /// Commit `sha256(seed)` for a height the ledger has not reached yet.
    pub fn commit_seed(
        env: Env,
        oracle: Address,
        height: u32,
        seed_hash: BytesN<32>,
    ) -> Result<(), Error> {
        require_oracle(&env, &oracle)?;

        if height <= env.ledger().sequence() {
            return Err(Error::HeightNotInFuture);
        }

        let key = DataKey::Commitment(height);
        if env.storage().persistent().has(&key) {
            return Err(Error::AlreadyCommitted);
        }
        put_persistent(&env, &key, &seed_hash);

        SeedCommitted { height, seed_hash }.publish(&env);

        Ok(())
    }

    /// Reveal the seed for a reached height and publish its random value.
    pub fn reveal_seed(
        env: Env,
        oracle: Address,
        height: u32,
        seed: BytesN<32>,
    ) -> Result<BytesN<32>, Error> {
        require_oracle(&env, &oracle)?;

        if height > env.ledger().sequence() {
            return Err(Error::HeightNotReached);
        }

        let value_key = DataKey::Value(height);
        if env.storage().persistent().has(&value_key) {
            return Err(Error::AlreadyRevealed);
        }

        let commitment: BytesN<32> = env
            .storage()
            .persistent()
            .get(&DataKey::Commitment(height))
            .ok_or(Error::CommitmentNotFound)?;

        let seed_hash: BytesN<32> = env
            .crypto()
            .sha256(&Bytes::from_array(&env, &seed.to_array()))
            .into();
        if seed_hash != commitment {
            return Err(Error::SeedMismatch);
        }

        let value = derive_value(&env, &seed, height);
        put_persistent(&env, &value_key, &value);
        log!(&env, "beacon: published value", height);

        RandomnessPublished {
            height,
            seed,
            value: value.clone(),
        }
        .publish(&env);

        Ok(value)
    }

    /// Return the random value for `height`, or `NotAvailable` until revealed.
    pub fn get_random_value(env: Env, height: u32) -> Result<BytesN<32>, Error> {
        require_initialized(&env)?;

        env.storage()
            .persistent()
            .get(&DataKey::Value(height))
            .ok_or(Error::NotAvailable)
    }

    /// Return the seed commitment for `height`.
    pub fn get_commitment(env: Env, height: u32) -> Result<BytesN<32>, Error> {
        require_initialized(&env)?;

        env.storage()
            .persistent()
            .get(&DataKey::Commitment(height))
            .ok_or(Error::CommitmentNotFound)
    }

    pub fn get_oracle(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Oracle)
            .ok_or(Error::NotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)?;
    caller.require_auth();
    if caller != &admin {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

fn require_oracle(env: &Env, caller: &Address) -> Result<(), Error> {
    let oracle: Address = env
        .storage()
        .instance()
        .get(&DataKey::Oracle)
        .ok_or(Error::NotInitialized)?;
    caller.require_auth();
    if caller != &oracle {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Derive the published value for `height` from the revealed seed.
///
/// Preimage is 36 bytes: seed (32) || height (4, big-endian). Binding the
/// height in means a seed reused across heights still yields distinct values.
pub fn derive_value(env: &Env, seed: &BytesN<32>, height: u32) -> BytesN<32> {
    let mut preimage = [0u8; 36];
    preimage[..32].copy_from_slice(&seed.to_array());
    preimage[32..].copy_from_slice(&height.to_be_bytes());

    env.crypto()
        .sha256(&Bytes::from_slice(env, &preimage))
        .into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
