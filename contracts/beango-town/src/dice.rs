//! Turning a beacon value into dice for one specific bout.
//!
//! The beacon publishes one value per ledger height. Mixing it with the play
//! id gives every bout targeting the same height its own digest, so one
//! height's randomness never repeats across unrelated bouts.

use soroban_sdk::{Bytes, BytesN, Env, Vec};

use crate::MixStrategy;

/// Hard cap on dice per bout. Zero is treated as one.
pub const MAX_DICE_COUNT: u32 = 3;
const FACES: u32 = 6;

/// Bout-specific digest of the height's random value and the play id.
pub fn mix(
    env: &Env,
    strategy: MixStrategy,
    random: &BytesN<32>,
    play_id: &BytesN<32>,
) -> BytesN<32> {
    let preimage = match strategy {
        MixStrategy::ConcatHash => {
            let mut buf = Bytes::from_array(env, &random.to_array());
            buf.append(&Bytes::from_array(env, &play_id.to_array()));
            buf
        }
        MixStrategy::XorHash => {
            let mut out = random.to_array();
            for (a, b) in out.iter_mut().zip(play_id.to_array().iter()) {
                *a ^= *b;
            }
            Bytes::from_array(env, &out)
        }
    };
    env.crypto().sha256(&preimage).into()
}

/// `count` die faces in 1..=6 read from the digest.
///
/// Die `i` takes the i-th group of 8 hex digits of the digest (bytes
/// `4i..4i+4`, big-endian) and maps it with `((x mod 6) + 5) mod 6 + 1`.
pub fn roll(env: &Env, mixed: &BytesN<32>, count: u32) -> Vec<u32> {
    let bytes = mixed.to_array();
    let mut faces = Vec::new(env);
    for i in 0..count.min(MAX_DICE_COUNT) as usize {
        let chunk = u32::from_be_bytes([
            bytes[4 * i],
            bytes[4 * i + 1],
            bytes[4 * i + 2],
            bytes[4 * i + 3],
        ]);
        faces.push_back(((chunk % FACES) + FACES - 1) % FACES + 1);
    }
    faces
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(env: &Env, fill: u8) -> BytesN<32> {
        BytesN::from_array(env, &[fill; 32])
    }

    #[test]
    fn test_concat_matches_manual_hash() {
        let env = Env::default();
        let random = id(&env, 1);
        let play = id(&env, 2);

        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&[1u8; 32]);
        preimage[32..].copy_from_slice(&[2u8; 32]);
        let expected: BytesN<32> = env
            .crypto()
            .sha256(&Bytes::from_slice(&env, &preimage))
            .into();

        assert_eq!(mix(&env, MixStrategy::ConcatHash, &random, &play), expected);
    }

    #[test]
    fn test_xor_matches_manual_hash() {
        let env = Env::default();
        let random = id(&env, 0b1010);
        let play = id(&env, 0b0110);

        let expected: BytesN<32> = env
            .crypto()
            .sha256(&Bytes::from_array(&env, &[0b1100u8; 32]))
            .into();

        assert_eq!(mix(&env, MixStrategy::XorHash, &random, &play), expected);
    }

    #[test]
    fn test_strategies_disagree() {
        let env = Env::default();
        let random = id(&env, 3);
        let play = id(&env, 4);
        assert_ne!(
            mix(&env, MixStrategy::ConcatHash, &random, &play),
            mix(&env, MixStrategy::XorHash, &random, &play)
        );
    }

    #[test]
    fn test_mix_is_bound_to_play_id() {
        let env = Env::default();
        let random = id(&env, 5);
        for strategy in [MixStrategy::ConcatHash, MixStrategy::XorHash] {
            assert_ne!(
                mix(&env, strategy, &random, &id(&env, 6)),
                mix(&env, strategy, &random, &id(&env, 7))
            );
            assert_eq!(
                mix(&env, strategy, &random, &id(&env, 6)),
                mix(&env, strategy, &random, &id(&env, 6))
            );
        }
    }

    #[test]
    fn test_face_mapping() {
        let env = Env::default();
        let mut arr = [0u8; 32];
        // chunk 0 = 0 -> 6, chunk 1 = 1 -> 1, chunk 2 = 11 -> 5
        arr[7] = 1;
        arr[11] = 11;
        let faces = roll(&env, &BytesN::from_array(&env, &arr), 3);
        assert_eq!(faces.len(), 3);
        assert_eq!(faces.get_unchecked(0), 6);
        assert_eq!(faces.get_unchecked(1), 1);
        assert_eq!(faces.get_unchecked(2), 5);
    }

    #[test]
    fn test_max_chunk_maps_in_range() {
        let env = Env::default();
        // u32::MAX % 6 == 3 -> ((3 + 5) % 6) + 1 == 3
        let faces = roll(&env, &id(&env, 0xff), 1);
        assert_eq!(faces.get_unchecked(0), 3);
    }

    #[test]
    fn test_faces_always_in_range() {
        let env = Env::default();
        for fill in 0u8..=255 {
            let digest = mix(&env, MixStrategy::ConcatHash, &id(&env, fill), &id(&env, 1));
            for face in roll(&env, &digest, 3).iter() {
                assert!((1..=6).contains(&face));
            }
        }
    }

    #[test]
    fn test_roll_respects_count() {
        let env = Env::default();
        let digest = id(&env, 9);
        assert_eq!(roll(&env, &digest, 1).len(), 1);
        assert_eq!(roll(&env, &digest, 2).len(), 2);
        assert_eq!(roll(&env, &digest, 3).len(), 3);
    }
}
