//! Recompute a finished round's outcome from its revealed seed.
//!
//! A player who kept the commitment hash shown at round start and the seed
//! disclosed at settlement can rebuild everything the round derived and compare
//! it with what was displayed.

use super::blackjack::dealt_cards;
use super::types::{ChickenDifficulty, GameDetail, TowersDifficulty};
use crate::config::DeckMode;
use crate::errors::GameError;
use crate::fairness::generators::{DECK_SIZE, MAX_CHICKEN_STEPS, MAX_TOWERS_ROWS};
use crate::fairness::{
    chicken_crash_step, coin_side, crash_point, mine_layout, slot_symbols, tower_layout, verify_seed,
    Card, CoinSide, RevealedSeed, SlotSymbol,
};
use serde::{Deserialize, Serialize};

/// Game and the parameters the round was played with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum ReplayRequest {
    CoinFlip,
    Slots,
    Crash {
        house_edge: f64,
    },
    Mines {
        mine_count: u8,
        board_size: u8,
    },
    Towers {
        difficulty: TowersDifficulty,
        rows: u8,
    },
    Blackjack {
        cards: usize,
        #[serde(default)]
        deck_mode: DeckMode,
    },
    Chicken {
        difficulty: ChickenDifficulty,
        max_steps: u32,
    },
}

/// Everything the seed decided for one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum ReplayOutcome {
    CoinFlip { result: CoinSide },
    Slots { grid: Vec<SlotSymbol> },
    Crash { crash_point: f64 },
    Mines { mines: Vec<u8> },
    Towers { layout: Vec<Vec<u8>> },
    Blackjack { cards: Vec<Card> },
    Chicken { crash_step: u32 },
}

impl From<&GameDetail> for ReplayOutcome {
    fn from(detail: &GameDetail) -> Self {
        match detail {
            GameDetail::CoinFlip { result, .. } => ReplayOutcome::CoinFlip { result: *result },
            GameDetail::Slots { grid, .. } => ReplayOutcome::Slots { grid: grid.clone() },
            GameDetail::Crash { crash_point, .. } => ReplayOutcome::Crash {
                crash_point: *crash_point,
            },
            GameDetail::Mines { mines, .. } => ReplayOutcome::Mines { mines: mines.clone() },
            GameDetail::Towers { layout, .. } => ReplayOutcome::Towers { layout: layout.clone() },
            GameDetail::Blackjack { player, dealer, .. } => {
                // opening deal alternates, then player hits, then dealer draws
                let mut cards = vec![player[0], dealer[0], player[1], dealer[1]];
                cards.extend_from_slice(&player[2..]);
                cards.extend_from_slice(&dealer[2..]);
                ReplayOutcome::Blackjack { cards }
            }
            GameDetail::Chicken { crash_step, .. } => ReplayOutcome::Chicken {
                crash_step: *crash_step,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplayReport {
    pub commitment_valid: bool,
    pub outcome: ReplayOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ReplayVerdict {
    Verified,
    CommitmentMismatch,
    OutcomeMismatch { expected: ReplayOutcome },
}

impl ReplayReport {
    /// Compare an outcome the player was shown against the recomputed one.
    pub fn check(&self, claimed: &ReplayOutcome) -> ReplayVerdict {
        if !self.commitment_valid {
            ReplayVerdict::CommitmentMismatch
        } else if *claimed != self.outcome {
            ReplayVerdict::OutcomeMismatch {
                expected: self.outcome.clone(),
            }
        } else {
            ReplayVerdict::Verified
        }
    }
}

fn validate(request: &ReplayRequest) -> Result<(), GameError> {
    match *request {
        ReplayRequest::Crash { house_edge } if !(0.0..1.0).contains(&house_edge) => {
            Err(GameError::invalid("house_edge", "must be in [0, 1)"))
        }
        ReplayRequest::Mines {
            mine_count,
            board_size,
        } if mine_count == 0 || mine_count >= board_size => Err(GameError::invalid(
            "mine_count",
            format!("must be in [1, {}]", board_size.saturating_sub(1)),
        )),
        ReplayRequest::Towers { rows, .. } if rows == 0 || rows > MAX_TOWERS_ROWS => Err(
            GameError::invalid("rows", format!("must be in [1, {}]", MAX_TOWERS_ROWS)),
        ),
        ReplayRequest::Blackjack { cards, .. } if cards < 4 || cards > DECK_SIZE => Err(
            GameError::invalid("cards", format!("must be in [4, {}]", DECK_SIZE)),
        ),
        ReplayRequest::Chicken { max_steps, .. } if max_steps == 0 || max_steps > MAX_CHICKEN_STEPS => Err(
            GameError::invalid("max_steps", format!("must be in [1, {}]", MAX_CHICKEN_STEPS)),
        ),
        _ => Ok(()),
    }
}

/// Rebuild the seed from its disclosed parts and recompute the outcome.
pub fn replay(revealed: &RevealedSeed, request: &ReplayRequest) -> Result<ReplayReport, GameError> {
    validate(request)?;

    let commitment_valid = verify_seed(revealed);
    let seed = revealed.to_seed();

    let outcome = match *request {
        ReplayRequest::CoinFlip => ReplayOutcome::CoinFlip {
            result: coin_side(&seed),
        },
        ReplayRequest::Slots => ReplayOutcome::Slots {
            grid: slot_symbols(&seed),
        },
        ReplayRequest::Crash { house_edge } => ReplayOutcome::Crash {
            crash_point: crash_point(&seed, house_edge),
        },
        ReplayRequest::Mines {
            mine_count,
            board_size,
        } => ReplayOutcome::Mines {
            mines: mine_layout(&seed, mine_count as usize, board_size as usize),
        },
        ReplayRequest::Towers { difficulty, rows } => ReplayOutcome::Towers {
            layout: tower_layout(
                &seed,
                rows as usize,
                difficulty.columns() as usize,
                difficulty.bombs() as usize,
            ),
        },
        ReplayRequest::Blackjack { cards, deck_mode } => ReplayOutcome::Blackjack {
            cards: dealt_cards(&seed, deck_mode, cards),
        },
        ReplayRequest::Chicken {
            difficulty,
            max_steps,
        } => ReplayOutcome::Chicken {
            crash_step: chicken_crash_step(&seed, difficulty.survival_probability(), max_steps),
        },
    };

    tracing::debug!(
        nonce = revealed.nonce,
        commitment_valid,
        "replayed round"
    );

    Ok(ReplayReport {
        commitment_valid,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::Seed;
    use crate::games::types::RoundMeta;
    use crate::games::{mines::MinesRound, slots, BlackjackRound, BlackjackStep};

    fn revealed() -> RevealedSeed {
        Seed::from_parts("a".repeat(64), "b".repeat(32), 1_700_000_000_000).reveal()
    }

    #[test]
    fn test_replay_matches_played_slots_round() {
        let seed = Seed::from_parts("c".repeat(64), "d".repeat(32), 9);
        let settlement = slots::play(seed, &RoundMeta::new("p", 1.0));

        let report = replay(&settlement.seed, &ReplayRequest::Slots).unwrap();
        assert!(report.commitment_valid);
        assert_eq!(report.check(&ReplayOutcome::from(&settlement.detail)), ReplayVerdict::Verified);
    }

    #[test]
    fn test_replay_matches_mines_cash_out() {
        let seed = Seed::from_parts("c".repeat(64), "d".repeat(32), 10);
        let mut round = MinesRound::start(seed.clone(), RoundMeta::new("p", 1.0), 5, 25, 0.02).unwrap();
        let tile = (0..25u8).find(|t| !mine_layout(&seed, 5, 25).contains(t)).unwrap();
        round.reveal(tile).unwrap();
        let settlement = round.cash_out().unwrap();

        let request = ReplayRequest::Mines {
            mine_count: 5,
            board_size: 25,
        };
        let report = replay(&settlement.seed, &request).unwrap();
        assert_eq!(report.check(&ReplayOutcome::from(&settlement.detail)), ReplayVerdict::Verified);
    }

    #[test]
    fn test_replay_matches_blackjack_deal() {
        let seed = Seed::from_parts("e".repeat(64), "f".repeat(32), 11);
        let (mut round, step) = BlackjackRound::start(seed, RoundMeta::new("p", 1.0), DeckMode::Shuffled);
        let settlement = match step {
            BlackjackStep::Finished(s) => s,
            BlackjackStep::InPlay(_) => match round.stand() {
                BlackjackStep::Finished(s) => s,
                BlackjackStep::InPlay(_) => unreachable!(),
            },
        };

        let claimed = ReplayOutcome::from(&settlement.detail);
        let dealt = match &claimed {
            ReplayOutcome::Blackjack { cards } => cards.len(),
            _ => unreachable!(),
        };
        let request = ReplayRequest::Blackjack {
            cards: dealt,
            deck_mode: DeckMode::Shuffled,
        };
        let report = replay(&settlement.seed, &request).unwrap();
        assert_eq!(report.check(&claimed), ReplayVerdict::Verified);
    }

    #[test]
    fn test_tampered_seed_is_commitment_mismatch() {
        let mut seed = revealed();
        seed.server_seed.replace_range(0..1, "b");
        let report = replay(&seed, &ReplayRequest::CoinFlip).unwrap();
        assert!(!report.commitment_valid);
        assert_eq!(report.check(&report.outcome), ReplayVerdict::CommitmentMismatch);
    }

    #[test]
    fn test_wrong_claim_is_outcome_mismatch() {
        let report = replay(&revealed(), &ReplayRequest::Chicken {
            difficulty: ChickenDifficulty::Medium,
            max_steps: 20,
        })
        .unwrap();
        let actual = match report.outcome {
            ReplayOutcome::Chicken { crash_step } => crash_step,
            _ => unreachable!(),
        };
        let claimed = ReplayOutcome::Chicken {
            crash_step: actual + 1,
        };
        assert!(matches!(report.check(&claimed), ReplayVerdict::OutcomeMismatch { .. }));
    }

    #[test]
    fn test_infeasible_parameters_rejected() {
        let request = ReplayRequest::Mines {
            mine_count: 25,
            board_size: 25,
        };
        assert!(replay(&revealed(), &request).is_err());

        let request = ReplayRequest::Blackjack {
            cards: 60,
            deck_mode: DeckMode::IndependentDraws,
        };
        assert!(replay(&revealed(), &request).is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let request: ReplayRequest =
            serde_json::from_str(r#"{"game":"towers","difficulty":"expert","rows":8}"#).unwrap();
        assert_eq!(
            request,
            ReplayRequest::Towers {
                difficulty: TowersDifficulty::Expert,
                rows: 8
            }
        );
    }
}
