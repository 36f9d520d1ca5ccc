//! Points awarded for the cell a bout lands on.

use soroban_sdk::BytesN;

use crate::{GameRules, GridType};

pub const BLUE_GRID_SCORE: u32 = 1;
pub const RED_GRID_SCORE: u32 = 5;

/// Gold range outside any active game-rules window, inclusive on both ends.
pub const DEFAULT_GOLD_MIN_SCORE: u32 = 30;
pub const DEFAULT_GOLD_MAX_SCORE: u32 = 50;

/// Score for landing on `grid_type`, drawing Gold from `mixed`.
pub fn score(grid_type: GridType, mixed: &BytesN<32>, rules: Option<&GameRules>, now: u64) -> u32 {
    match grid_type {
        GridType::Blue => BLUE_GRID_SCORE,
        GridType::Red => RED_GRID_SCORE,
        GridType::Gold => {
            let (min, max) = gold_range(rules, now);
            draw(mixed, min, max)
        }
    }
}

/// The Gold range in force at `now`.
pub fn gold_range(rules: Option<&GameRules>, now: u64) -> (u32, u32) {
    match rules {
        Some(r) if r.begin_time <= now && now <= r.end_time => (r.min_score, r.max_score),
        _ => (DEFAULT_GOLD_MIN_SCORE, DEFAULT_GOLD_MAX_SCORE),
    }
}

/// `|first 8 bytes as i64| mod (max - min + 1) + min`. Requires `min <= max`.
fn draw(mixed: &BytesN<32>, min: u32, max: u32) -> u32 {
    let bytes = mixed.to_array();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    let magnitude = i64::from_be_bytes(head).unsigned_abs();
    let span = (max - min) as u64 + 1;
    min + (magnitude % span) as u32
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::Env;

    fn hash(env: &Env, fill: u8) -> BytesN<32> {
        BytesN::from_array(env, &[fill; 32])
    }

    fn rules(begin: u64, end: u64, min: u32, max: u32) -> GameRules {
        GameRules {
            begin_time: begin,
            end_time: end,
            min_score: min,
            max_score: max,
        }
    }

    #[test]
    fn test_blue_and_red_are_fixed() {
        let env = Env::default();
        let active = rules(0, u64::MAX, 100, 200);
        for fill in [0u8, 1, 0x7f, 0x80, 0xff] {
            let h = hash(&env, fill);
            assert_eq!(score(GridType::Blue, &h, None, 10), BLUE_GRID_SCORE);
            assert_eq!(score(GridType::Red, &h, None, 10), RED_GRID_SCORE);
            assert_eq!(score(GridType::Blue, &h, Some(&active), 10), BLUE_GRID_SCORE);
            assert_eq!(score(GridType::Red, &h, Some(&active), 10), RED_GRID_SCORE);
        }
    }

    #[test]
    fn test_gold_default_range() {
        let env = Env::default();
        for fill in 0u8..=255 {
            let s = score(GridType::Gold, &hash(&env, fill), None, 10);
            assert!((DEFAULT_GOLD_MIN_SCORE..=DEFAULT_GOLD_MAX_SCORE).contains(&s));
        }
    }

    #[test]
    fn test_gold_uses_rules_inside_window() {
        let env = Env::default();
        let r = rules(1_000, 2_000, 70, 80);
        for fill in 0u8..=255 {
            let h = hash(&env, fill);
            let inside = score(GridType::Gold, &h, Some(&r), 1_500);
            assert!((70..=80).contains(&inside));
        }
        assert_eq!(gold_range(Some(&r), 1_000), (70, 80));
        assert_eq!(gold_range(Some(&r), 2_000), (70, 80));
    }

    #[test]
    fn test_gold_ignores_rules_outside_window() {
        let env = Env::default();
        let r = rules(1_000, 2_000, 70, 80);
        assert_eq!(
            gold_range(Some(&r), 999),
            (DEFAULT_GOLD_MIN_SCORE, DEFAULT_GOLD_MAX_SCORE)
        );
        assert_eq!(
            gold_range(Some(&r), 2_001),
            (DEFAULT_GOLD_MIN_SCORE, DEFAULT_GOLD_MAX_SCORE)
        );
        let s = score(GridType::Gold, &hash(&env, 3), Some(&r), 5_000);
        assert!((DEFAULT_GOLD_MIN_SCORE..=DEFAULT_GOLD_MAX_SCORE).contains(&s));
    }

    #[test]
    fn test_gold_draw_is_exact() {
        let env = Env::default();
        // Head = 0x0000_0000_0000_0015 = 21 -> 21 % 21 + 30 = 30.
        let mut arr = [0u8; 32];
        arr[7] = 21;
        assert_eq!(score(GridType::Gold, &BytesN::from_array(&env, &arr), None, 0), 30);
        arr[7] = 20;
        assert_eq!(score(GridType::Gold, &BytesN::from_array(&env, &arr), None, 0), 50);
    }

    #[test]
    fn test_gold_negative_head_uses_magnitude() {
        let env = Env::default();
        // Head = -1 -> |-1| = 1 -> 31.
        let mut arr = [0u8; 32];
        arr[..8].copy_from_slice(&(-1i64).to_be_bytes());
        assert_eq!(score(GridType::Gold, &BytesN::from_array(&env, &arr), None, 0), 31);
        // i64::MIN has no positive counterpart but still lands in range.
        arr[..8].copy_from_slice(&i64::MIN.to_be_bytes());
        let s = score(GridType::Gold, &BytesN::from_array(&env, &arr), None, 0);
        assert!((DEFAULT_GOLD_MIN_SCORE..=DEFAULT_GOLD_MAX_SCORE).contains(&s));
    }

    #[test]
    fn test_single_value_range() {
        let env = Env::default();
        let r = rules(0, 10, 42, 42);
        assert_eq!(score(GridType::Gold, &hash(&env, 9), Some(&r), 5), 42);
    }
}
