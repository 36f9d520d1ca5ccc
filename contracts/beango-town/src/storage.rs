//! Typed accessors over the contract's instance and persistent storage.
//!
//! Player and bout records live in persistent storage, one entry each,
//! addressed only by key. Every write goes through `put_persistent` so the
//! entry's TTL is pushed out.

use beango_shared::put_persistent;
use soroban_sdk::{Address, BytesN, Env, Vec};

use crate::{
    board::Board, BoutRecord, DataKey, Error, GameLimitSettings, GameRules, GridType, MixStrategy,
    PlayerRecord,
};

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if !is_initialized(env) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

pub fn admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn beacon(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Beacon)
        .ok_or(Error::NotInitialized)
}

pub fn set_beacon(env: &Env, beacon: &Address) {
    env.storage().instance().set(&DataKey::Beacon, beacon);
}

pub fn pass_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::PassTokens)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_pass_tokens(env: &Env, tokens: &Vec<Address>) {
    env.storage().instance().set(&DataKey::PassTokens, tokens);
}

pub fn board(env: &Env) -> Result<Board, Error> {
    let cells: Vec<GridType> = env
        .storage()
        .instance()
        .get(&DataKey::Board)
        .ok_or(Error::NotInitialized)?;
    Board::new(cells)
}

pub fn set_board(env: &Env, board: &Board) {
    env.storage().instance().set(&DataKey::Board, board.cells());
}

pub fn limit_settings(env: &Env) -> Result<GameLimitSettings, Error> {
    env.storage()
        .instance()
        .get(&DataKey::LimitSettings)
        .ok_or(Error::NotInitialized)
}

pub fn set_limit_settings(env: &Env, settings: &GameLimitSettings) {
    env.storage().instance().set(&DataKey::LimitSettings, settings);
}

pub fn game_rules(env: &Env) -> Option<GameRules> {
    env.storage().instance().get(&DataKey::GameRules)
}

pub fn set_game_rules(env: &Env, rules: &GameRules) {
    env.storage().instance().set(&DataKey::GameRules, rules);
}

pub fn clear_game_rules(env: &Env) {
    env.storage().instance().remove(&DataKey::GameRules);
}

pub fn mix_strategy(env: &Env) -> MixStrategy {
    env.storage()
        .instance()
        .get(&DataKey::MixStrategy)
        .unwrap_or(MixStrategy::ConcatHash)
}

pub fn set_mix_strategy(env: &Env, strategy: MixStrategy) {
    env.storage().instance().set(&DataKey::MixStrategy, &strategy);
}

pub fn immediate_mode(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::ImmediateMode)
        .unwrap_or(false)
}

pub fn set_immediate_mode(env: &Env, enabled: bool) {
    env.storage().instance().set(&DataKey::ImmediateMode, &enabled);
}

/// Hand out the next play nonce.
pub fn next_play_nonce(env: &Env) -> u64 {
    let nonce: u64 = env
        .storage()
        .instance()
        .get(&DataKey::PlayNonce)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::PlayNonce, &nonce.wrapping_add(1));
    nonce
}

// ---------------------------------------------------------------------------
// Player records
// ---------------------------------------------------------------------------

pub fn find_player(env: &Env, player: &Address) -> Option<PlayerRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Player(player.clone()))
}

/// The stored record, or a fresh one at the origin cell.
pub fn player_or_default(env: &Env, player: &Address) -> PlayerRecord {
    find_player(env, player).unwrap_or(PlayerRecord {
        player: player.clone(),
        cur_grid_num: 0,
        sum_score: 0,
        playable_count: 0,
        last_play_time: None,
    })
}

pub fn put_player(env: &Env, record: &PlayerRecord) {
    put_persistent(env, &DataKey::Player(record.player.clone()), record);
}

// ---------------------------------------------------------------------------
// Bout records
// ---------------------------------------------------------------------------

pub fn find_bout(env: &Env, play_id: &BytesN<32>) -> Option<BoutRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Bout(play_id.clone()))
}

pub fn put_bout(env: &Env, record: &BoutRecord) {
    put_persistent(env, &DataKey::Bout(record.play_id.clone()), record);
}
