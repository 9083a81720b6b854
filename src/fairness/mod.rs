//! Provably fair engine.
//!
//! Commit to a seed, derive outcomes from its commitment hash, reveal the seed
//! when the round ends, and let anyone verify. Stateless apart from the OS
//! random source and the nonce clock consulted when a seed is created.

pub mod derive;
pub mod generators;
pub mod seed;
pub mod verify;

pub use derive::{derive_uniform, derive_unit, DERIVATION_VERSION};
pub use generators::{
    card_sequence, chicken_crash_step, coin_side, crash_point, mine_layout, shuffled_deck,
    slot_symbols, tower_layout, Card, CoinSide, Rank, SlotSymbol, Suit,
};
pub use seed::{commitment_hash, create_seed, RevealedSeed, Seed};
pub use verify::{parse_nonce, verify, verify_parts, verify_seed};
