use crate::errors::GameError;
use crate::fairness::{Card, CoinSide, RevealedSeed, SlotSymbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    CoinFlip,
    Slots,
    Crash,
    Mines,
    Towers,
    Blackjack,
    Chicken,
}

impl GameType {
    pub const ALL: [GameType; 7] = [
        GameType::CoinFlip,
        GameType::Slots,
        GameType::Crash,
        GameType::Mines,
        GameType::Towers,
        GameType::Blackjack,
        GameType::Chicken,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameType::CoinFlip => "coinflip",
            GameType::Slots => "slots",
            GameType::Crash => "crash",
            GameType::Mines => "mines",
            GameType::Towers => "towers",
            GameType::Blackjack => "blackjack",
            GameType::Chicken => "chicken",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Push,
}

impl GameOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Push => "push",
        }
    }
}

/// Towers difficulty: columns per row and bombs per row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TowersDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl TowersDifficulty {
    pub fn columns(self) -> u8 {
        match self {
            TowersDifficulty::Easy => 4,
            TowersDifficulty::Medium => 3,
            TowersDifficulty::Hard => 2,
            TowersDifficulty::Expert => 3,
        }
    }

    pub fn bombs(self) -> u8 {
        match self {
            TowersDifficulty::Expert => 2,
            _ => 1,
        }
    }
}

/// Chicken Run difficulty: per-step survival probability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChickenDifficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl ChickenDifficulty {
    pub fn survival_probability(self) -> f64 {
        match self {
            ChickenDifficulty::Easy => 0.96,
            ChickenDifficulty::Medium => 0.88,
            ChickenDifficulty::Hard => 0.80,
            ChickenDifficulty::Extreme => 0.64,
        }
    }
}

/// Game-specific settlement data (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum GameDetail {
    CoinFlip {
        choice: CoinSide,
        result: CoinSide,
    },
    Slots {
        grid: Vec<SlotSymbol>,
        winning_lines: Vec<usize>,
    },
    Crash {
        target: f64,
        crash_point: f64,
    },
    Mines {
        mine_count: u8,
        board_size: u8,
        mines: Vec<u8>,
        revealed: Vec<u8>,
    },
    Towers {
        difficulty: TowersDifficulty,
        layout: Vec<Vec<u8>>,
        picks: Vec<u8>,
    },
    Blackjack {
        player: Vec<Card>,
        dealer: Vec<Card>,
        player_total: u8,
        dealer_total: u8,
        doubled: bool,
    },
    Chicken {
        difficulty: ChickenDifficulty,
        steps: u32,
        crash_step: u32,
    },
}

/// Final, revealed record of a finished round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundSettlement {
    pub round_id: String,
    pub game_type: GameType,
    pub user_id: String,
    pub outcome: GameOutcome,
    pub bet: f64,
    pub payout: f64,
    pub multiplier: f64,
    pub seed: RevealedSeed,
    pub timestamp: i64,
    pub detail: GameDetail,
}

/// Common fields every round carries until it settles
#[derive(Debug, Clone)]
pub struct RoundMeta {
    pub round_id: String,
    pub user_id: String,
    pub bet: f64,
}

impl RoundMeta {
    pub fn new(user_id: impl Into<String>, bet: f64) -> Self {
        Self {
            round_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            bet,
        }
    }
}

/// Build the settlement for a round; payout is `bet * multiplier`.
pub(crate) fn settle(
    meta: &RoundMeta,
    game_type: GameType,
    outcome: GameOutcome,
    multiplier: f64,
    seed: RevealedSeed,
    detail: GameDetail,
) -> RoundSettlement {
    RoundSettlement {
        round_id: meta.round_id.clone(),
        game_type,
        user_id: meta.user_id.clone(),
        outcome,
        bet: meta.bet,
        payout: meta.bet * multiplier,
        multiplier,
        seed,
        timestamp: chrono::Utc::now().timestamp_millis(),
        detail,
    }
}

/// Reject non-finite bets and bets outside the configured limits.
pub fn validate_bet(bet: f64, min: f64, max: f64) -> Result<(), GameError> {
    if !bet.is_finite() || bet < min || bet > max {
        return Err(GameError::BetOutOfRange { bet, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_serde_matches_display() {
        for game in GameType::ALL {
            let json = serde_json::to_string(&game).unwrap();
            assert_eq!(json, format!("\"{}\"", game));
        }
    }

    #[test]
    fn test_validate_bet() {
        assert!(validate_bet(5.0, 1.0, 10.0).is_ok());
        assert!(validate_bet(0.5, 1.0, 10.0).is_err());
        assert!(validate_bet(11.0, 1.0, 10.0).is_err());
        assert!(validate_bet(f64::NAN, 1.0, 10.0).is_err());
    }

    #[test]
    fn test_towers_difficulty_is_feasible() {
        for d in [
            TowersDifficulty::Easy,
            TowersDifficulty::Medium,
            TowersDifficulty::Hard,
            TowersDifficulty::Expert,
        ] {
            assert!(d.bombs() < d.columns());
        }
    }

    #[test]
    fn test_detail_is_tagged() {
        let detail = GameDetail::Crash {
            target: 2.0,
            crash_point: 3.5,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["game"], "crash");
    }
}
