//! Daily play allowance.
//!
//! The stored `playable_count` is only a remainder for the window in which
//! the player last played. Every read recomputes it against the ledger clock,
//! so a player who crossed a reset boundary sees a full allowance without any
//! write having happened.

use beango_shared::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

use crate::{Error, GameLimitSettings, PlayerRecord};

/// The latest reset boundary at or before `now`.
pub fn last_reset_instant(settings: &GameLimitSettings, now: u64) -> u64 {
    let day_start = now - now % SECONDS_PER_DAY;
    let today = day_start + settings.daily_play_count_reset_hours as u64 * SECONDS_PER_HOUR;
    if now >= today {
        today
    } else {
        today.saturating_sub(SECONDS_PER_DAY)
    }
}

/// Plays `player` may still start at `now`.
///
/// The allowance refills once a full day has passed since the last play, or
/// once any reset boundary lies after it. That is broader than only checking
/// today's boundary: a play just before yesterday's reset hour, read the next
/// morning before today's reset, also refills.
pub fn playable_count(
    settings: &GameLimitSettings,
    player: &PlayerRecord,
    eligible: bool,
    now: u64,
) -> u32 {
    if !eligible {
        return 0;
    }
    let refill = match player.last_play_time {
        None => true,
        Some(last) => {
            now >= last.saturating_add(SECONDS_PER_DAY)
                || last < last_reset_instant(settings, now)
        }
    };
    if refill {
        settings.daily_max_play_count
    } else {
        player.playable_count
    }
}

/// Spend one play from `player`'s allowance.
///
/// With `reset_start` the token also goes back to the origin cell.
pub fn consume_play(
    settings: &GameLimitSettings,
    player: &mut PlayerRecord,
    eligible: bool,
    reset_start: bool,
    now: u64,
) -> Result<(), Error> {
    if !eligible {
        return Err(Error::InsufficientEligibility);
    }
    let remaining = playable_count(settings, player, eligible, now);
    if remaining == 0 {
        return Err(Error::QuotaExhausted);
    }
    if reset_start {
        player.cur_grid_num = 0;
    }
    player.playable_count = remaining - 1;
    player.last_play_time = Some(now);
    Ok(())
}
