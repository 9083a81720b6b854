pub mod blackjack;
pub mod chicken;
pub mod coinflip;
pub mod crash;
pub mod mines;
pub mod replay;
pub mod slots;
pub mod towers;
pub mod types;

pub use blackjack::{BlackjackRound, BlackjackStep, BlackjackView};
pub use chicken::{ChickenRound, ChickenStep, ChickenView};
pub use mines::{MinesRound, MinesStep, MinesView};
pub use replay::{replay, ReplayOutcome, ReplayReport, ReplayRequest, ReplayVerdict};
pub use towers::{TowersRound, TowersStep, TowersView};
pub use types::*;

/// A multi-step round waiting for the player's next action
#[derive(Debug)]
pub enum ActiveRound {
    Mines(MinesRound),
    Towers(TowersRound),
    Blackjack(BlackjackRound),
    Chicken(ChickenRound),
}

impl ActiveRound {
    pub fn game_type(&self) -> GameType {
        match self {
            ActiveRound::Mines(_) => GameType::Mines,
            ActiveRound::Towers(_) => GameType::Towers,
            ActiveRound::Blackjack(_) => GameType::Blackjack,
            ActiveRound::Chicken(_) => GameType::Chicken,
        }
    }

    pub fn meta(&self) -> &RoundMeta {
        match self {
            ActiveRound::Mines(r) => r.meta(),
            ActiveRound::Towers(r) => r.meta(),
            ActiveRound::Blackjack(r) => r.meta(),
            ActiveRound::Chicken(r) => r.meta(),
        }
    }
}
