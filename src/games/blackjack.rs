//! Blackjack against a dealer who stands on all 17s.
//!
//! Cards come from the outcome stream in deal order: player, dealer, player,
//! dealer, then player hits, then dealer draws. In `IndependentDraws` mode the
//! k-th card dealt is draw k; in `Shuffled` mode it is position k of the
//! shuffled deck.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::config::DeckMode;
use crate::errors::GameError;
use crate::fairness::generators::card_at;
use crate::fairness::{shuffled_deck, Card, Rank, Seed};
use serde::{Deserialize, Serialize};

pub const NATURAL_MULTIPLIER: f64 = 2.5;
pub const WIN_MULTIPLIER: f64 = 2.0;
pub const PUSH_MULTIPLIER: f64 = 1.0;

/// Best total and whether an ace is counted as 11
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let hard: u8 = cards.iter().map(|c| c.rank.hard_value()).sum();
    let has_ace = cards.iter().any(|c| c.rank == Rank::Ace);
    if has_ace && hard + 10 <= 21 {
        (hard + 10, true)
    } else {
        (hard, false)
    }
}

pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == 21
}

/// Source of dealt cards for one round
#[derive(Debug)]
struct Shoe {
    mode: DeckMode,
    deck: Vec<Card>,
    dealt: u64,
}

impl Shoe {
    fn new(seed: &Seed, mode: DeckMode) -> Self {
        let deck = match mode {
            DeckMode::IndependentDraws => Vec::new(),
            DeckMode::Shuffled => shuffled_deck(seed),
        };
        Self { mode, deck, dealt: 0 }
    }

    fn draw(&mut self, seed: &Seed) -> Card {
        let position = self.dealt;
        self.dealt += 1;
        match self.mode {
            DeckMode::IndependentDraws => card_at(seed, position),
            // A hand never gets near 52 cards; wrap keeps this total anyway
            DeckMode::Shuffled => self.deck[position as usize % self.deck.len()],
        }
    }
}

/// Every card the round deals, in deal order, for replay.
pub fn dealt_cards(seed: &Seed, mode: DeckMode, count: usize) -> Vec<Card> {
    let mut shoe = Shoe::new(seed, mode);
    (0..count).map(|_| shoe.draw(seed)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackjackView {
    pub round_id: String,
    pub commitment_hash: String,
    pub bet: f64,
    pub player: Vec<Card>,
    pub player_total: u8,
    /// Dealer's face-up card only
    pub dealer_up: Card,
    pub can_double: bool,
}

#[derive(Debug, Clone)]
pub enum BlackjackStep {
    InPlay(BlackjackView),
    Finished(RoundSettlement),
}

#[derive(Debug)]
pub struct BlackjackRound {
    meta: RoundMeta,
    seed: Seed,
    shoe: Shoe,
    player: Vec<Card>,
    dealer: Vec<Card>,
    doubled: bool,
}

impl BlackjackRound {
    /// Deal the opening hands. A natural on either side settles immediately.
    pub fn start(seed: Seed, meta: RoundMeta, mode: DeckMode) -> (Self, BlackjackStep) {
        let mut shoe = Shoe::new(&seed, mode);
        let p1 = shoe.draw(&seed);
        let d1 = shoe.draw(&seed);
        let p2 = shoe.draw(&seed);
        let d2 = shoe.draw(&seed);

        let round = Self {
            meta,
            seed,
            shoe,
            player: vec![p1, p2],
            dealer: vec![d1, d2],
            doubled: false,
        };

        let step = if is_natural(&round.player) || is_natural(&round.dealer) {
            BlackjackStep::Finished(round.resolve())
        } else {
            BlackjackStep::InPlay(round.view())
        };
        (round, step)
    }

    pub fn meta(&self) -> &RoundMeta {
        &self.meta
    }

    pub fn view(&self) -> BlackjackView {
        BlackjackView {
            round_id: self.meta.round_id.clone(),
            commitment_hash: self.seed.commitment_hash().to_string(),
            bet: self.meta.bet,
            player: self.player.clone(),
            player_total: hand_value(&self.player).0,
            dealer_up: self.dealer[0],
            can_double: self.player.len() == 2 && !self.doubled,
        }
    }

    pub fn hit(&mut self) -> BlackjackStep {
        let card = self.shoe.draw(&self.seed);
        self.player.push(card);

        let (total, _) = hand_value(&self.player);
        if total > 21 {
            BlackjackStep::Finished(self.resolve())
        } else if total == 21 {
            self.stand()
        } else {
            BlackjackStep::InPlay(self.view())
        }
    }

    pub fn stand(&mut self) -> BlackjackStep {
        while hand_value(&self.dealer).0 < 17 {
            let card = self.shoe.draw(&self.seed);
            self.dealer.push(card);
        }
        BlackjackStep::Finished(self.resolve())
    }

    /// Double the bet, take exactly one card, then stand.
    pub fn double(&mut self) -> Result<BlackjackStep, GameError> {
        if self.player.len() != 2 || self.doubled {
            return Err(GameError::ActionNotAllowed(
                "double is only allowed on the first two cards".to_string(),
            ));
        }
        self.doubled = true;
        self.meta.bet *= 2.0;

        let card = self.shoe.draw(&self.seed);
        self.player.push(card);
        if hand_value(&self.player).0 > 21 {
            return Ok(BlackjackStep::Finished(self.resolve()));
        }
        Ok(self.stand())
    }

    fn resolve(&self) -> RoundSettlement {
        let (player_total, _) = hand_value(&self.player);
        let (dealer_total, _) = hand_value(&self.dealer);
        let player_natural = is_natural(&self.player);
        let dealer_natural = is_natural(&self.dealer);

        let (outcome, multiplier) = if player_total > 21 {
            (GameOutcome::Loss, 0.0)
        } else if player_natural && dealer_natural {
            (GameOutcome::Push, PUSH_MULTIPLIER)
        } else if player_natural {
            (GameOutcome::Win, NATURAL_MULTIPLIER)
        } else if dealer_natural {
            (GameOutcome::Loss, 0.0)
        } else if dealer_total > 21 || player_total > dealer_total {
            (GameOutcome::Win, WIN_MULTIPLIER)
        } else if player_total == dealer_total {
            (GameOutcome::Push, PUSH_MULTIPLIER)
        } else {
            (GameOutcome::Loss, 0.0)
        };

        settle(
            &self.meta,
            GameType::Blackjack,
            outcome,
            multiplier,
            self.seed.reveal(),
            GameDetail::Blackjack {
                player: self.player.clone(),
                dealer: self.dealer.clone(),
                player_total,
                dealer_total,
                doubled: self.doubled,
            },
        )
    }
}
