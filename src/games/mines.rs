//! Mines: pick tiles on a board hiding `mine_count` mines, cash out any time
//! after the first safe tile.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::errors::GameError;
use crate::fairness::generators::floor_cents;
use crate::fairness::{mine_layout, Seed};
use serde::{Deserialize, Serialize};

/// Cash-out multiplier after `safe_reveals` safe tiles:
/// `(1 - edge) * prod_{i < k} (N - i) / (N - m - i)`, floored to cents.
pub fn multiplier(board_size: u8, mine_count: u8, safe_reveals: u32, house_edge: f64) -> f64 {
    if safe_reveals == 0 {
        return 1.0;
    }
    let n = board_size as f64;
    let m = mine_count as f64;
    let fair = (0..safe_reveals).fold(1.0, |acc, i| {
        let i = i as f64;
        acc * (n - i) / (n - m - i)
    });
    floor_cents(fair * (1.0 - house_edge))
}

/// Public view of a round in progress (mine positions stay hidden)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesView {
    pub round_id: String,
    pub commitment_hash: String,
    pub bet: f64,
    pub board_size: u8,
    pub mine_count: u8,
    pub revealed: Vec<u8>,
    pub multiplier: f64,
    pub next_multiplier: Option<f64>,
}

/// Result of revealing one tile
#[derive(Debug, Clone)]
pub enum MinesStep {
    Safe(MinesView),
    Finished(RoundSettlement),
}

#[derive(Debug)]
pub struct MinesRound {
    meta: RoundMeta,
    seed: Seed,
    board_size: u8,
    mine_count: u8,
    house_edge: f64,
    mines: Vec<u8>,
    revealed: Vec<u8>,
}

impl MinesRound {
    pub fn start(
        seed: Seed,
        meta: RoundMeta,
        mine_count: u8,
        board_size: u8,
        house_edge: f64,
    ) -> Result<Self, GameError> {
        if mine_count == 0 || mine_count >= board_size {
            return Err(GameError::invalid(
                "mine_count",
                format!("must be in [1, {}]", board_size.saturating_sub(1)),
            ));
        }

        let mines = mine_layout(&seed, mine_count as usize, board_size as usize);
        Ok(Self {
            meta,
            seed,
            board_size,
            mine_count,
            house_edge,
            mines,
            revealed: Vec::new(),
        })
    }

    pub fn meta(&self) -> &RoundMeta {
        &self.meta
    }

    fn safe_tiles(&self) -> usize {
        (self.board_size - self.mine_count) as usize
    }

    fn current_multiplier(&self) -> f64 {
        multiplier(self.board_size, self.mine_count, self.revealed.len() as u32, self.house_edge)
    }

    pub fn view(&self) -> MinesView {
        let next = (self.revealed.len() < self.safe_tiles()).then(|| {
            multiplier(
                self.board_size,
                self.mine_count,
                self.revealed.len() as u32 + 1,
                self.house_edge,
            )
        });
        MinesView {
            round_id: self.meta.round_id.clone(),
            commitment_hash: self.seed.commitment_hash().to_string(),
            bet: self.meta.bet,
            board_size: self.board_size,
            mine_count: self.mine_count,
            revealed: self.revealed.clone(),
            multiplier: self.current_multiplier(),
            next_multiplier: next,
        }
    }

    /// Reveal `tile`. Hitting a mine, or uncovering the last safe tile,
    /// finishes the round.
    pub fn reveal(&mut self, tile: u8) -> Result<MinesStep, GameError> {
        if tile >= self.board_size {
            return Err(GameError::invalid(
                "tile",
                format!("must be in [0, {}]", self.board_size - 1),
            ));
        }
        if self.revealed.contains(&tile) {
            return Err(GameError::TileAlreadyRevealed { tile });
        }

        if self.mines.binary_search(&tile).is_ok() {
            self.revealed.push(tile);
            return Ok(MinesStep::Finished(self.finish(GameOutcome::Loss, 0.0)));
        }

        self.revealed.push(tile);
        if self.revealed.len() == self.safe_tiles() {
            let multiplier = self.current_multiplier();
            return Ok(MinesStep::Finished(self.finish(GameOutcome::Win, multiplier)));
        }
        Ok(MinesStep::Safe(self.view()))
    }

    pub fn cash_out(&self) -> Result<RoundSettlement, GameError> {
        if self.revealed.is_empty() {
            return Err(GameError::ActionNotAllowed(
                "reveal at least one tile before cashing out".to_string(),
            ));
        }
        Ok(self.finish(GameOutcome::Win, self.current_multiplier()))
    }

    fn finish(&self, outcome: GameOutcome, multiplier: f64) -> RoundSettlement {
        settle(
            &self.meta,
            GameType::Mines,
            outcome,
            multiplier,
            self.seed.reveal(),
            GameDetail::Mines {
                mine_count: self.mine_count,
                board_size: self.board_size,
                mines: self.mines.clone(),
                revealed: self.revealed.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(mines: u8) -> MinesRound {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 1_700_000_000_000);
        MinesRound::start(seed, RoundMeta::new("p", 10.0), mines, 25, 0.02).unwrap()
    }

    fn safe_tile(round: &MinesRound) -> u8 {
        (0..25).find(|t| !round.mines.contains(t) && !round.revealed.contains(t)).unwrap()
    }

    #[test]
    fn test_multiplier_formula() {
        assert_eq!(multiplier(25, 1, 0, 0.02), 1.0);
        // 25/24 * 0.98 = 1.0208..
        assert_eq!(multiplier(25, 1, 1, 0.02), 1.02);
        // 25/22 * 24/21 * 0.98 = 1.2727..
        assert_eq!(multiplier(25, 3, 2, 0.02), 1.27);
    }

    #[test]
    fn test_rejects_infeasible_mine_count() {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 1);
        assert!(MinesRound::start(seed.clone(), RoundMeta::new("p", 1.0), 25, 25, 0.02).is_err());
        assert!(MinesRound::start(seed, RoundMeta::new("p", 1.0), 0, 25, 0.02).is_err());
    }

    #[test]
    fn test_hitting_mine_loses() {
        let mut r = round(5);
        let mine = r.mines[0];
        match r.reveal(mine).unwrap() {
            MinesStep::Finished(s) => {
                assert_eq!(s.outcome, GameOutcome::Loss);
                assert_eq!(s.payout, 0.0);
            }
            MinesStep::Safe(_) => panic!("mine should finish the round"),
        }
    }

    #[test]
    fn test_safe_reveal_then_cash_out() {
        let mut r = round(3);
        assert!(r.cash_out().is_err());

        let tile = safe_tile(&r);
        let view = match r.reveal(tile).unwrap() {
            MinesStep::Safe(v) => v,
            MinesStep::Finished(_) => panic!("safe tile should not finish"),
        };
        assert_eq!(view.revealed, vec![tile]);
        assert!(matches!(r.reveal(tile), Err(GameError::TileAlreadyRevealed { .. })));

        let settlement = r.cash_out().unwrap();
        assert_eq!(settlement.outcome, GameOutcome::Win);
        assert_eq!(settlement.multiplier, multiplier(25, 3, 1, 0.02));
    }

    #[test]
    fn test_clearing_board_auto_cashes() {
        let mut r = round(24);
        let tile = safe_tile(&r);
        match r.reveal(tile).unwrap() {
            MinesStep::Finished(s) => assert_eq!(s.outcome, GameOutcome::Win),
            MinesStep::Safe(_) => panic!("only safe tile should finish the round"),
        }
    }

    #[test]
    fn test_view_hides_mines() {
        let r = round(3);
        let json = serde_json::to_value(r.view()).unwrap();
        assert!(json.get("mines").is_none());
    }

    #[test]
    fn test_out_of_range_tile() {
        let mut r = round(3);
        assert!(r.reveal(25).is_err());
    }
}
