//! Seeded randomness shared by every generation stage.
//!
//! Each stage draws from its own ChaCha stream derived from the run seed, so
//! toggling one stage (continuity, for instance) does not shift the values
//! produced by the others.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream labels used to derive per-stage generators.
pub const CONTINUITY_STREAM: &str = "continuity";
pub const TIMELINE_STREAM: &str = "timeline";
pub const SALES_STREAM: &str = "sales";

/// Random source for one stage of a run.
pub fn stage_rng(seed: u64, stage: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, stage))
}

/// FNV-1a over `key`, folded into `seed`.
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Version 4 UUID built from the given random source.
pub fn random_uuid(rng: &mut dyn RngCore) -> uuid::Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes)
}
