//! Per-game outcome generators built on [`derive_uniform`].
//!
//! Index assignment (frozen, part of the verification contract):
//!
//! | Generator | Indices | Range |
//! |---|---|---|
//! | coin side | 0 | `[0, 1]` |
//! | crash point | 0 | unit value |
//! | chicken crash step | 0 | unit value |
//! | slot symbols | 0..=8 | `[0, 7]`, row-major |
//! | card sequence | k for the k-th card | `[0, 51]` |
//! | shuffled deck | 10_000 + i for swap i | `[0, i]` |
//! | mine layout | 100 + attempt | `[0, board_size - 1]` |
//! | tower layout | 1_000 + row * 1_000 + attempt | `[0, columns - 1]` |
//!
//! Reordering [`SlotSymbol::ALPHABET`], [`Rank::ALL`] or [`Suit::ALL`]
//! changes every historical recomputed result.

use super::derive::{derive_index, derive_uniform, derive_unit};
use super::seed::Seed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const COINFLIP_INDEX: u64 = 0;
pub const CRASH_INDEX: u64 = 0;
pub const CHICKEN_INDEX: u64 = 0;
pub const SLOTS_FIRST_INDEX: u64 = 0;
pub const SHUFFLE_BASE_INDEX: u64 = 10_000;
pub const MINES_BASE_INDEX: u64 = 100;
pub const TOWERS_BASE_INDEX: u64 = 1_000;
pub const TOWERS_ROW_STRIDE: u64 = 1_000;

pub const SLOT_CELLS: usize = 9;
pub const DECK_SIZE: usize = 52;

pub const CRASH_MIN: f64 = 1.01;
pub const CRASH_MAX: f64 = 1000.0;

/// Largest tower a round can be played (and replayed) with
pub const MAX_TOWERS_ROWS: u8 = 64;
/// Largest Chicken Run step cap a round can be played (and replayed) with
pub const MAX_CHICKEN_STEPS: u32 = 1_000;

/// Default crash house edge (1%)
pub const DEFAULT_CRASH_HOUSE_EDGE: f64 = 0.01;

/// Round down to two decimal places
pub fn floor_cents(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

pub fn coin_side(seed: &Seed) -> CoinSide {
    if derive_uniform(seed, COINFLIP_INDEX, 0, 1) == 0 {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Blackjack value with aces counted as 1
    pub fn hard_value(self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            other => other as u8 + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// Card for a deck position in `[0, 52)`: rank = v mod 13, suit = v div 13.
    pub fn from_index(v: usize) -> Self {
        Card {
            rank: Rank::ALL[v % 13],
            suit: Suit::ALL[(v / 13) % 4],
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            Rank::Ace => "A".to_string(),
            Rank::Jack => "J".to_string(),
            Rank::Queen => "Q".to_string(),
            Rank::King => "K".to_string(),
            other => (other as u8 + 1).to_string(),
        };
        let suit = match self.suit {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        };
        write!(f, "{}{}", rank, suit)
    }
}

/// The `position`-th card dealt in a round. Draws are independent, so the
/// same card can appear twice in one round.
pub fn card_at(seed: &Seed, position: u64) -> Card {
    Card::from_index(derive_index(seed, position, DECK_SIZE))
}

/// The first `count` cards of the round, independent draws.
pub fn card_sequence(seed: &Seed, count: usize) -> Vec<Card> {
    (0..count as u64).map(|k| card_at(seed, k)).collect()
}

/// Full 52-card deck shuffled with Fisher–Yates over the same derivation.
pub fn shuffled_deck(seed: &Seed) -> Vec<Card> {
    let mut deck: Vec<Card> = (0..DECK_SIZE).map(Card::from_index).collect();
    for i in (1..DECK_SIZE).rev() {
        let j = derive_uniform(seed, SHUFFLE_BASE_INDEX + i as u64, 0, i as i64) as usize;
        deck.swap(i, j);
    }
    deck
}

/// `count` distinct positions in `[0, board_size)` by reject-and-retry,
/// starting at `base_index` and consuming one index per attempt.
///
/// # Panics
///
/// Panics if `count >= board_size` or if the attempts would run past
/// `max_attempts`.
fn distinct_positions(
    seed: &Seed,
    base_index: u64,
    count: usize,
    board_size: usize,
    max_attempts: u64,
) -> Vec<u8> {
    assert!(
        count < board_size,
        "cannot place {} mines on a board of {} cells",
        count,
        board_size
    );
    assert!(board_size <= u8::MAX as usize + 1, "board of {} cells too large", board_size);

    let mut used = BTreeSet::new();
    let mut attempt = 0u64;
    while used.len() < count {
        assert!(
            attempt < max_attempts,
            "mine layout exhausted {} attempts from index {}",
            max_attempts,
            base_index
        );
        let position = derive_index(seed, base_index + attempt, board_size) as u8;
        attempt += 1;
        used.insert(position);
    }

    // BTreeSet iteration is already ascending
    used.into_iter().collect()
}

/// Mine positions for a Mines board, sorted ascending.
///
/// # Panics
///
/// Panics if `mine_count >= board_size`; callers validate first.
pub fn mine_layout(seed: &Seed, mine_count: usize, board_size: usize) -> Vec<u8> {
    distinct_positions(seed, MINES_BASE_INDEX, mine_count, board_size, u64::MAX - MINES_BASE_INDEX)
}

/// Bomb columns for each tower row, each row sorted ascending.
///
/// # Panics
///
/// Panics if `bombs_per_row >= columns`.
pub fn tower_layout(seed: &Seed, rows: usize, columns: usize, bombs_per_row: usize) -> Vec<Vec<u8>> {
    (0..rows as u64)
        .map(|row| {
            distinct_positions(
                seed,
                TOWERS_BASE_INDEX + row * TOWERS_ROW_STRIDE,
                bombs_per_row,
                columns,
                TOWERS_ROW_STRIDE,
            )
        })
        .collect()
}

/// Crash multiplier in `[1.01, 1000]` for the given house edge.
pub fn crash_point(seed: &Seed, house_edge: f64) -> f64 {
    let r = derive_unit(seed.commitment_hash(), CRASH_INDEX);
    let raw = 1.0 / (1.0 - r * (1.0 - house_edge));
    floor_cents(raw).clamp(CRASH_MIN, CRASH_MAX)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Bell,
    Star,
    Diamond,
    Seven,
}

impl SlotSymbol {
    pub const ALPHABET: [SlotSymbol; 8] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Orange,
        SlotSymbol::Grape,
        SlotSymbol::Bell,
        SlotSymbol::Star,
        SlotSymbol::Diamond,
        SlotSymbol::Seven,
    ];
}

/// Nine symbols filling a 3x3 grid row-major.
pub fn slot_symbols(seed: &Seed) -> Vec<SlotSymbol> {
    (0..SLOT_CELLS as u64)
        .map(|i| SlotSymbol::ALPHABET[derive_index(seed, SLOTS_FIRST_INDEX + i, SlotSymbol::ALPHABET.len())])
        .collect()
}

/// Number of steps the chicken survives: `floor(ln r / ln p)`, capped at
/// `max_steps`. Surviving k steps has probability `p^k`.
pub fn chicken_crash_step(seed: &Seed, survival_probability: f64, max_steps: u32) -> u32 {
    assert!(
        survival_probability > 0.0 && survival_probability < 1.0,
        "survival probability {} outside (0, 1)",
        survival_probability
    );

    let r = derive_unit(seed.commitment_hash(), CHICKEN_INDEX);
    if r <= 0.0 {
        return max_steps;
    }
    let steps = (r.ln() / survival_probability.ln()).floor();
    if steps >= max_steps as f64 {
        max_steps
    } else {
        steps.max(0.0) as u32
    }
}

/// Progressive Chicken Run multiplier after `step` successful steps.
pub fn chicken_multiplier(step: u32, survival_probability: f64, house_edge: f64) -> f64 {
    if step == 0 {
        return 1.0;
    }
    floor_cents((1.0 - house_edge) / survival_probability.powi(step as i32))
}
