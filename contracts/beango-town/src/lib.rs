//! Beango Town Contract
//!
//! A board game of chance. Players holding a pass token spend daily plays to
//! roll dice and walk a token around a closed loop of Blue, Red and Gold
//! cells, collecting points for the cell they land on.
//!
//! ## Game Flow
//! 1. Player calls `play` → one play is taken from the daily allowance and a
//!    pending bout is stored, targeting ledger `now + BINGO_DELAY_LEDGERS`.
//! 2. The random beacon publishes the value for the target ledger
//!    (off-chain oracle step).
//! 3. Player calls `bingo` → the beacon value is mixed with the play id,
//!    dice are read from the digest, the token moves and the bout is scored.
//!
//! Nobody, the player included, can know the target ledger's value when the
//! bout is committed, so a player cannot play only when the outcome would be
//! favourable. `play_and_bingo` skips the delay and resolves in one call
//! against a value that is already published for the current ledger. That
//! value is public, so the outcome can be computed before submitting; the
//! mode stays off unless the admin enables it.
//!
//! ## Scoring
//! Blue = 1, Red = 5, Gold is drawn from `[30, 50]`, or from the admin's
//! `GameRules` range while its time window is open.
//!
//! ## Quota
//! `daily_max_play_count` plays per day, refilled when the player crosses the
//! daily reset hour (UTC). See [`quota`].
#![no_std]
#![allow(unexpected_cfgs)]

use beango_shared::holds_any;
use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, log,
    Address, Bytes, BytesN, Env, Vec,
};

pub mod board;
pub mod dice;
pub mod quota;
pub mod scoring;
mod storage;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Ledgers between a play and the ledger whose randomness resolves it.
pub const BINGO_DELAY_LEDGERS: u32 = 8;

pub const DEFAULT_DAILY_MAX_PLAY_COUNT: u32 = 5;
pub const DEFAULT_DAILY_PLAY_COUNT_RESET_HOURS: u32 = 0;

// ---------------------------------------------------------------------------
// External interfaces
// ---------------------------------------------------------------------------

/// The random beacon: one published 32-byte value per ledger height.
#[contractclient(name = "BeaconClient")]
pub trait RandomBeacon {
    fn get_random_value(env: Env, height: u32) -> BytesN<32>;
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized      = 1,
    NotInitialized          = 2,
    /// Player holds none of the configured pass tokens.
    InsufficientEligibility = 3,
    QuotaExhausted          = 4,
    /// Play id is the all-zero hash.
    InvalidIdentifier       = 5,
    /// Caller has never played.
    NotRegistered           = 6,
    BoutNotFound            = 7,
    BoutAlreadyResolved     = 8,
    /// The bout's target ledger has not been reached. Retry later.
    NotYetResolvable        = 9,
    /// The beacon has not published the target ledger's value. Retry later.
    RandomnessNotReady      = 10,
    PermissionDenied        = 11,
    InvalidConfig           = 12,
    InvalidDiceCount        = 13,
    /// `play_and_bingo` is switched off.
    ImmediateModeDisabled   = 14,
}

// ---------------------------------------------------------------------------
// Storage types
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Beacon,
    PassTokens,
    Board,
    LimitSettings,
    GameRules,
    MixStrategy,
    ImmediateMode,
    PlayNonce,
    Player(Address),
    Bout(BytesN<32>),
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GridType {
    Blue = 0,
    Red  = 1,
    Gold = 2,
}

/// How a ledger's random value is combined with a play id.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MixStrategy {
    /// `sha256(random || play_id)`
    ConcatHash = 0,
    /// `sha256(random ^ play_id)`
    XorHash    = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameLimitSettings {
    pub daily_max_play_count: u32,
    /// UTC hour in `[0, 24)` at which allowances refill.
    pub daily_play_count_reset_hours: u32,
}

/// Gold score override active between `begin_time` and `end_time` inclusive.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameRules {
    pub begin_time: u64,
    pub end_time: u64,
    pub min_score: u32,
    pub max_score: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerRecord {
    pub player: Address,
    pub cur_grid_num: u32,
    pub sum_score: u64,
    /// Only meaningful as returned by `get_player_information`, which
    /// recomputes it against the current time.
    pub playable_count: u32,
    pub last_play_time: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoutRecord {
    pub play_id: BytesN<32>,
    pub player: Address,
    pub play_block_height: u32,
    pub play_time: u64,
    pub dice_count: u32,
    pub expected_block_height: u32,
    pub mix_strategy: MixStrategy,
    pub is_complete: bool,
    // Written once, on resolution. `grid_type` reads Blue until then.
    pub dice_numbers: Vec<u32>,
    pub grid_num: u32,
    pub start_grid_num: u32,
    pub end_grid_num: u32,
    pub grid_type: GridType,
    pub score: u32,
    pub bingo_block_height: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayOutput {
    pub play_id: BytesN<32>,
    pub expected_block_height: u32,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Played {
    #[topic]
    pub play_id: BytesN<32>,
    #[topic]
    pub player: Address,
    pub play_block_height: u32,
    pub expected_block_height: u32,
}

#[contractevent]
pub struct Bingoed {
    #[topic]
    pub play_id: BytesN<32>,
    #[topic]
    pub player: Address,
    pub play_block_height: u32,
    pub grid_type: GridType,
    pub grid_num: u32,
    pub end_grid_num: u32,
    pub score: u32,
    pub is_complete: bool,
    pub bingo_block_height: u32,
}

#[contractevent]
pub struct AdminChanged {
    pub old_admin: Address,
    pub new_admin: Address,
}

#[contractevent]
pub struct GameLimitSettingsUpdated {
    pub daily_max_play_count: u32,
    pub daily_play_count_reset_hours: u32,
}

#[contractevent]
pub struct GameRulesUpdated {
    pub begin_time: u64,
    pub end_time: u64,
    pub min_score: u32,
    pub max_score: u32,
}

#[contractevent]
pub struct BoardUpdated {
    pub length: u32,
}

#[contractevent]
pub struct ImmediateModeUpdated {
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct BeangoTown;

#[contractimpl]
impl BeangoTown {
    /// Initialize the game. May only be called once.
    ///
    /// `beacon` is the random beacon contract; `pass_tokens` are the token
    /// contracts whose holders may play.
    pub fn init(
        env: Env,
        admin: Address,
        beacon: Address,
        pass_tokens: Vec<Address>,
    ) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();

        if pass_tokens.is_empty() {
            return Err(Error::InvalidConfig);
        }

        storage::set_admin(&env, &admin);
        storage::set_beacon(&env, &beacon);
        storage::set_pass_tokens(&env, &pass_tokens);
        storage::set_board(&env, &board::Board::new(board::default_cells(&env))?);
        storage::set_limit_settings(
            &env,
            &GameLimitSettings {
                daily_max_play_count: DEFAULT_DAILY_MAX_PLAY_COUNT,
                daily_play_count_reset_hours: DEFAULT_DAILY_PLAY_COUNT_RESET_HOURS,
            },
        );
        storage::set_mix_strategy(&env, MixStrategy::ConcatHash);
        storage::set_immediate_mode(&env, false);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Play / Bingo
    // -----------------------------------------------------------------------

    /// Spend one play and commit a bout.
    ///
    /// `dice_count` of 0 means one die; more than 3 is rejected.
    /// With `reset_start` the token first returns to the origin cell.
    pub fn play(
        env: Env,
        player: Address,
        dice_count: u32,
        reset_start: bool,
    ) -> Result<PlayOutput, Error> {
        storage::require_initialized(&env)?;
        let dice_count = normalize_dice_count(dice_count)?;
        player.require_auth();

        let target = env.ledger().sequence().saturating_add(BINGO_DELAY_LEDGERS);
        let bout = commit(&env, &player, dice_count, reset_start, target)?;

        Ok(PlayOutput {
            play_id: bout.play_id,
            expected_block_height: bout.expected_block_height,
        })
    }

    /// Resolve a pending bout once its target ledger's randomness is out.
    ///
    /// `NotYetResolvable` and `RandomnessNotReady` are transient; the caller
    /// retries in a later ledger.
    pub fn bingo(env: Env, player: Address, play_id: BytesN<32>) -> Result<BoutRecord, Error> {
        storage::require_initialized(&env)?;
        require_well_formed(&play_id)?;
        player.require_auth();
        log!(&env, "bingo: resolving bout", play_id);

        let record = storage::find_player(&env, &player).ok_or(Error::NotRegistered)?;
        let bout = storage::find_bout(&env, &play_id).ok_or(Error::BoutNotFound)?;
        if bout.is_complete {
            return Err(Error::BoutAlreadyResolved);
        }
        if bout.player != player {
            return Err(Error::PermissionDenied);
        }
        if env.ledger().sequence() < bout.expected_block_height {
            return Err(Error::NotYetResolvable);
        }

        let random = fetch_random(&env, bout.expected_block_height)?;
        resolve(&env, record, bout, &random)
    }

    /// Commit and resolve in one call against the current ledger's value.
    ///
    /// Only while the admin has enabled immediate mode. Fails with
    /// `RandomnessNotReady`, spending nothing, until the beacon has published
    /// the current ledger.
    pub fn play_and_bingo(
        env: Env,
        player: Address,
        dice_count: u32,
        reset_start: bool,
    ) -> Result<BoutRecord, Error> {
        storage::require_initialized(&env)?;
        if !storage::immediate_mode(&env) {
            return Err(Error::ImmediateModeDisabled);
        }
        let dice_count = normalize_dice_count(dice_count)?;
        player.require_auth();

        let height = env.ledger().sequence();
        let random = fetch_random(&env, height)?;

        let bout = commit(&env, &player, dice_count, reset_start, height)?;
        let record = storage::player_or_default(&env, &player);
        resolve(&env, record, bout, &random)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The player's record with `playable_count` computed for the current
    /// time. Players who never played read as a fresh record.
    pub fn get_player_information(env: Env, player: Address) -> Result<PlayerRecord, Error> {
        storage::require_initialized(&env)?;

        let settings = storage::limit_settings(&env)?;
        let board = storage::board(&env)?;
        let eligible = holds_any(&env, &storage::pass_tokens(&env), &player);

        let mut record = storage::player_or_default(&env, &player);
        record.cur_grid_num = board.normalize(record.cur_grid_num);
        record.playable_count =
            quota::playable_count(&settings, &record, eligible, env.ledger().timestamp());
        Ok(record)
    }

    pub fn get_bout_information(env: Env, play_id: BytesN<32>) -> Result<BoutRecord, Error> {
        storage::require_initialized(&env)?;
        require_well_formed(&play_id)?;

        storage::find_bout(&env, &play_id).ok_or(Error::BoutNotFound)
    }

    /// Whether `player` holds any pass token.
    pub fn check_bean_pass(env: Env, player: Address) -> Result<bool, Error> {
        storage::require_initialized(&env)?;
        Ok(holds_any(&env, &storage::pass_tokens(&env), &player))
    }

    pub fn get_game_limit_settings(env: Env) -> Result<GameLimitSettings, Error> {
        storage::limit_settings(&env)
    }

    pub fn get_game_rules(env: Env) -> Result<Option<GameRules>, Error> {
        storage::require_initialized(&env)?;
        Ok(storage::game_rules(&env))
    }

    pub fn get_board(env: Env) -> Result<Vec<GridType>, Error> {
        Ok(storage::board(&env)?.cells().clone())
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        storage::admin(&env)
    }

    pub fn get_mix_strategy(env: Env) -> Result<MixStrategy, Error> {
        storage::require_initialized(&env)?;
        Ok(storage::mix_strategy(&env))
    }

    pub fn get_pass_tokens(env: Env) -> Result<Vec<Address>, Error> {
        storage::require_initialized(&env)?;
        Ok(storage::pass_tokens(&env))
    }

    pub fn get_immediate_mode(env: Env) -> Result<bool, Error> {
        storage::require_initialized(&env)?;
        Ok(storage::immediate_mode(&env))
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub fn set_game_limit_settings(
        env: Env,
        admin: Address,
        settings: GameLimitSettings,
    ) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if settings.daily_play_count_reset_hours >= 24 {
            return Err(Error::InvalidConfig);
        }

        storage::set_limit_settings(&env, &settings);
        GameLimitSettingsUpdated {
            daily_max_play_count: settings.daily_max_play_count,
            daily_play_count_reset_hours: settings.daily_play_count_reset_hours,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_game_rules(env: Env, admin: Address, rules: GameRules) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if rules.begin_time >= rules.end_time
            || rules.min_score == 0
            || rules.max_score < rules.min_score
        {
            return Err(Error::InvalidConfig);
        }

        storage::set_game_rules(&env, &rules);
        GameRulesUpdated {
            begin_time: rules.begin_time,
            end_time: rules.end_time,
            min_score: rules.min_score,
            max_score: rules.max_score,
        }
        .publish(&env);
        Ok(())
    }

    /// Drop the Gold override so the default range applies again.
    pub fn clear_game_rules(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        storage::clear_game_rules(&env);
        Ok(())
    }

    pub fn set_pass_tokens(env: Env, admin: Address, tokens: Vec<Address>) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        if tokens.is_empty() {
            return Err(Error::InvalidConfig);
        }
        storage::set_pass_tokens(&env, &tokens);
        Ok(())
    }

    /// Applies to bouts committed from now on; pending bouts keep the
    /// strategy they were committed with.
    pub fn set_mix_strategy(env: Env, admin: Address, strategy: MixStrategy) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        storage::set_mix_strategy(&env, strategy);
        Ok(())
    }

    /// Switch `play_and_bingo` on or off. Off after `init`.
    pub fn set_immediate_mode(env: Env, admin: Address, enabled: bool) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        storage::set_immediate_mode(&env, enabled);
        ImmediateModeUpdated { enabled }.publish(&env);
        Ok(())
    }

    /// Start a new board epoch. Stored positions are reduced modulo the new
    /// length when next used.
    pub fn set_board(env: Env, admin: Address, cells: Vec<GridType>) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let board = board::Board::new(cells)?;

        storage::set_board(&env, &board);
        BoardUpdated { length: board.len() }.publish(&env);
        Ok(())
    }

    pub fn change_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), Error> {
        let current = require_admin(&env, &admin)?;
        if current == new_admin {
            return Ok(());
        }

        storage::set_admin(&env, &new_admin);
        AdminChanged {
            old_admin: current,
            new_admin,
        }
        .publish(&env);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_admin(env: &Env, caller: &Address) -> Result<Address, Error> {
    let admin = storage::admin(env)?;
    caller.require_auth();
    if *caller != admin {
        return Err(Error::PermissionDenied);
    }
    Ok(admin)
}

fn require_well_formed(play_id: &BytesN<32>) -> Result<(), Error> {
    if play_id.to_array() == [0u8; 32] {
        return Err(Error::InvalidIdentifier);
    }
    Ok(())
}

fn normalize_dice_count(dice_count: u32) -> Result<u32, Error> {
    match dice_count {
        0 => Ok(1),
        n if n <= dice::MAX_DICE_COUNT => Ok(n),
        _ => Err(Error::InvalidDiceCount),
    }
}

/// `sha256(nonce_be || ledger_be || player)`; the nonce makes it unique per play.
fn next_play_id(env: &Env, player: &Address) -> BytesN<32> {
    let nonce = storage::next_play_nonce(env);
    let mut preimage = Bytes::from_array(env, &nonce.to_be_bytes());
    preimage.append(&Bytes::from_array(env, &env.ledger().sequence().to_be_bytes()));
    preimage.append(&player.to_string().to_bytes());
    env.crypto().sha256(&preimage).into()
}

fn fetch_random(env: &Env, height: u32) -> Result<BytesN<32>, Error> {
    let beacon = storage::beacon(env)?;
    match BeaconClient::new(env, &beacon).try_get_random_value(&height) {
        Ok(Ok(value)) => Ok(value),
        _ => {
            log!(env, "bingo: randomness not ready", height);
            Err(Error::RandomnessNotReady)
        }
    }
}

/// Take a play from the allowance and store a pending bout targeting `target`.
fn commit(
    env: &Env,
    player: &Address,
    dice_count: u32,
    reset_start: bool,
    target: u32,
) -> Result<BoutRecord, Error> {
    let settings = storage::limit_settings(env)?;
    let board = storage::board(env)?;
    let eligible = holds_any(env, &storage::pass_tokens(env), player);
    let now = env.ledger().timestamp();

    let mut record = storage::player_or_default(env, player);
    record.cur_grid_num = board.normalize(record.cur_grid_num);
    quota::consume_play(&settings, &mut record, eligible, reset_start, now)?;
    storage::put_player(env, &record);

    let play_id = next_play_id(env, player);
    let bout = BoutRecord {
        play_id: play_id.clone(),
        player: player.clone(),
        play_block_height: env.ledger().sequence(),
        play_time: now,
        dice_count,
        expected_block_height: target,
        mix_strategy: storage::mix_strategy(env),
        is_complete: false,
        dice_numbers: Vec::new(env),
        grid_num: 0,
        start_grid_num: 0,
        end_grid_num: 0,
        grid_type: GridType::Blue,
        score: 0,
        bingo_block_height: 0,
    };
    storage::put_bout(env, &bout);
    log!(env, "play: bout committed", play_id, target);

    Played {
        play_id,
        player: player.clone(),
        play_block_height: bout.play_block_height,
        expected_block_height: target,
    }
    .publish(env);

    Ok(bout)
}

/// Roll, move, score and persist. `bout` must be pending and owned by
/// `record.player`.
fn resolve(
    env: &Env,
    mut record: PlayerRecord,
    mut bout: BoutRecord,
    random: &BytesN<32>,
) -> Result<BoutRecord, Error> {
    let board = storage::board(env)?;

    let mixed = dice::mix(env, bout.mix_strategy, random, &bout.play_id);
    let dice_numbers = dice::roll(env, &mixed, bout.dice_count);
    let steps: u32 = dice_numbers.iter().sum();

    let start = board.normalize(record.cur_grid_num);
    let end = board.advance(start, steps);
    let grid_type = board.cell_at(end);
    let rules = storage::game_rules(env);
    let score = scoring::score(grid_type, &mixed, rules.as_ref(), env.ledger().timestamp());

    bout.dice_numbers = dice_numbers;
    bout.grid_num = steps;
    bout.start_grid_num = start;
    bout.end_grid_num = end;
    bout.grid_type = grid_type;
    bout.score = score;
    bout.bingo_block_height = env.ledger().sequence();
    bout.is_complete = true;
    storage::put_bout(env, &bout);

    record.cur_grid_num = end;
    record.sum_score = record.sum_score.saturating_add(score as u64);
    storage::put_player(env, &record);

    log!(env, "bingo: bout resolved", steps, end, score);

    Bingoed {
        play_id: bout.play_id.clone(),
        player: bout.player.clone(),
        play_block_height: bout.play_block_height,
        grid_type,
        grid_num: steps,
        end_grid_num: end,
        score,
        is_complete: true,
        bingo_block_height: bout.bingo_block_height,
    }
    .publish(env);

    Ok(bout)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
