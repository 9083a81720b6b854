//! Towers: climb row by row, picking one column per row; bombs per row and
//! row width depend on difficulty.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement, TowersDifficulty};
use crate::errors::GameError;
use crate::fairness::generators::floor_cents;
use crate::fairness::{tower_layout, Seed};
use serde::{Deserialize, Serialize};

/// Multiplier after clearing `rows` rows: `(1 - edge) * (c / (c - b))^rows`.
pub fn multiplier(difficulty: TowersDifficulty, rows: u32, house_edge: f64) -> f64 {
    if rows == 0 {
        return 1.0;
    }
    let c = difficulty.columns() as f64;
    let b = difficulty.bombs() as f64;
    floor_cents((c / (c - b)).powi(rows as i32) * (1.0 - house_edge))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowersView {
    pub round_id: String,
    pub commitment_hash: String,
    pub bet: f64,
    pub difficulty: TowersDifficulty,
    pub rows: u8,
    pub columns: u8,
    pub picks: Vec<u8>,
    pub multiplier: f64,
    pub next_multiplier: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum TowersStep {
    Climbed(TowersView),
    Finished(RoundSettlement),
}

#[derive(Debug)]
pub struct TowersRound {
    meta: RoundMeta,
    seed: Seed,
    difficulty: TowersDifficulty,
    house_edge: f64,
    layout: Vec<Vec<u8>>,
    picks: Vec<u8>,
}

impl TowersRound {
    pub fn start(
        seed: Seed,
        meta: RoundMeta,
        difficulty: TowersDifficulty,
        rows: u8,
        house_edge: f64,
    ) -> Result<Self, GameError> {
        if rows == 0 {
            return Err(GameError::invalid("rows", "must be > 0"));
        }
        let layout = tower_layout(
            &seed,
            rows as usize,
            difficulty.columns() as usize,
            difficulty.bombs() as usize,
        );
        Ok(Self {
            meta,
            seed,
            difficulty,
            house_edge,
            layout,
            picks: Vec::new(),
        })
    }

    pub fn meta(&self) -> &RoundMeta {
        &self.meta
    }

    fn rows(&self) -> usize {
        self.layout.len()
    }

    fn current_multiplier(&self) -> f64 {
        multiplier(self.difficulty, self.picks.len() as u32, self.house_edge)
    }

    pub fn view(&self) -> TowersView {
        let next = (self.picks.len() < self.rows())
            .then(|| multiplier(self.difficulty, self.picks.len() as u32 + 1, self.house_edge));
        TowersView {
            round_id: self.meta.round_id.clone(),
            commitment_hash: self.seed.commitment_hash().to_string(),
            bet: self.meta.bet,
            difficulty: self.difficulty,
            rows: self.rows() as u8,
            columns: self.difficulty.columns(),
            picks: self.picks.clone(),
            multiplier: self.current_multiplier(),
            next_multiplier: next,
        }
    }

    /// Pick `column` on the next row.
    pub fn climb(&mut self, column: u8) -> Result<TowersStep, GameError> {
        let columns = self.difficulty.columns();
        if column >= columns {
            return Err(GameError::invalid("column", format!("must be in [0, {}]", columns - 1)));
        }

        let row = self.picks.len();
        self.picks.push(column);
        if self.layout[row].contains(&column) {
            return Ok(TowersStep::Finished(self.finish(GameOutcome::Loss, 0.0)));
        }
        if self.picks.len() == self.rows() {
            let multiplier = self.current_multiplier();
            return Ok(TowersStep::Finished(self.finish(GameOutcome::Win, multiplier)));
        }
        Ok(TowersStep::Climbed(self.view()))
    }

    pub fn cash_out(&self) -> Result<RoundSettlement, GameError> {
        if self.picks.is_empty() {
            return Err(GameError::ActionNotAllowed(
                "clear at least one row before cashing out".to_string(),
            ));
        }
        Ok(self.finish(GameOutcome::Win, self.current_multiplier()))
    }

    fn finish(&self, outcome: GameOutcome, multiplier: f64) -> RoundSettlement {
        settle(
            &self.meta,
            GameType::Towers,
            outcome,
            multiplier,
            self.seed.reveal(),
            GameDetail::Towers {
                difficulty: self.difficulty,
                layout: self.layout.clone(),
                picks: self.picks.clone(),
            },
        )
    }
}
