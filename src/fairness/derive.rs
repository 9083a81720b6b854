//! Deterministic outcome derivation.
//!
//! Every draw is `SHA256(commitment_hash + decimal(index))`; the first 32 bits
//! of that digest (the first 8 hex characters) divided by `0xFFFFFFFF` give a
//! unit value, which is scaled into the requested range. Any change to the
//! hash, the concatenation order or the rounding rule breaks verification of
//! past rounds and must bump [`DERIVATION_VERSION`].

use super::seed::Seed;
use sha2::{Digest, Sha256};

/// Version of the derivation rules below
pub const DERIVATION_VERSION: u32 = 1;

const UNIT_DIVISOR: f64 = 0xFFFF_FFFF_u32 as f64;

fn draw_digest(commitment_hash: &str, index: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(commitment_hash.as_bytes());
    hasher.update(index.to_string().as_bytes());
    hasher.finalize().into()
}

/// Draw `index` normalized into `[0, 1]`.
///
/// The upper bound is reachable (first word `ffffffff`), so range mapping
/// clamps it.
pub fn derive_unit(commitment_hash: &str, index: u64) -> f64 {
    let digest = draw_digest(commitment_hash, index);
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word as f64 / UNIT_DIVISOR
}

/// Integer in `[min, max]` inclusive for draw `index`.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn derive_uniform_from_hash(commitment_hash: &str, index: u64, min: i64, max: i64) -> i64 {
    assert!(min <= max, "derive_uniform called with min {} > max {}", min, max);

    let span = (max as i128 - min as i128 + 1) as f64;
    let offset = (derive_unit(commitment_hash, index) * span).floor() as i128;
    let value = (min as i128 + offset).min(max as i128) as i64;

    tracing::trace!(index, min, max, value, "Derived uniform draw");
    value
}

/// Integer in `[min, max]` inclusive for draw `index` of `seed`'s stream.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn derive_uniform(seed: &Seed, index: u64, min: i64, max: i64) -> i64 {
    derive_uniform_from_hash(seed.commitment_hash(), index, min, max)
}

/// `derive_uniform` for non-negative ranges used as array positions.
pub(crate) fn derive_index(seed: &Seed, index: u64, len: usize) -> usize {
    debug_assert!(len > 0);
    derive_uniform(seed, index, 0, len as i64 - 1) as usize
}
