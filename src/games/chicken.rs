//! Chicken Run: cross lane after lane, cash out before the chicken gets hit.
//! The step it gets hit on is fixed by the seed when the round starts.

use super::types::{settle, ChickenDifficulty, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::errors::GameError;
use crate::fairness::generators::chicken_multiplier;
use crate::fairness::{chicken_crash_step, Seed};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChickenView {
    pub round_id: String,
    pub commitment_hash: String,
    pub bet: f64,
    pub difficulty: ChickenDifficulty,
    pub max_steps: u32,
    pub steps: u32,
    pub multiplier: f64,
    pub next_multiplier: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum ChickenStep {
    Advanced(ChickenView),
    Finished(RoundSettlement),
}

#[derive(Debug)]
pub struct ChickenRound {
    meta: RoundMeta,
    seed: Seed,
    difficulty: ChickenDifficulty,
    max_steps: u32,
    house_edge: f64,
    crash_step: u32,
    steps: u32,
}

impl ChickenRound {
    pub fn start(
        seed: Seed,
        meta: RoundMeta,
        difficulty: ChickenDifficulty,
        max_steps: u32,
        house_edge: f64,
    ) -> Result<Self, GameError> {
        if max_steps == 0 {
            return Err(GameError::invalid("max_steps", "must be > 0"));
        }
        let crash_step = chicken_crash_step(&seed, difficulty.survival_probability(), max_steps);
        tracing::trace!(round_id = %meta.round_id, crash_step, "chicken threshold derived");

        Ok(Self {
            meta,
            seed,
            difficulty,
            max_steps,
            house_edge,
            crash_step,
            steps: 0,
        })
    }

    pub fn meta(&self) -> &RoundMeta {
        &self.meta
    }

    fn multiplier_at(&self, step: u32) -> f64 {
        chicken_multiplier(step, self.difficulty.survival_probability(), self.house_edge)
    }

    pub fn view(&self) -> ChickenView {
        ChickenView {
            round_id: self.meta.round_id.clone(),
            commitment_hash: self.seed.commitment_hash().to_string(),
            bet: self.meta.bet,
            difficulty: self.difficulty,
            max_steps: self.max_steps,
            steps: self.steps,
            multiplier: self.multiplier_at(self.steps),
            next_multiplier: (self.steps < self.max_steps).then(|| self.multiplier_at(self.steps + 1)),
        }
    }

    /// Take one more step. The step succeeds iff it does not pass the crash
    /// step; the final step cashes out automatically.
    pub fn step(&mut self) -> ChickenStep {
        let next = self.steps + 1;
        if next > self.crash_step {
            self.steps = next;
            return ChickenStep::Finished(self.finish(GameOutcome::Loss, 0.0));
        }

        self.steps = next;
        if self.steps == self.max_steps {
            let multiplier = self.multiplier_at(self.steps);
            return ChickenStep::Finished(self.finish(GameOutcome::Win, multiplier));
        }
        ChickenStep::Advanced(self.view())
    }

    pub fn cash_out(&self) -> Result<RoundSettlement, GameError> {
        if self.steps == 0 {
            return Err(GameError::ActionNotAllowed(
                "take at least one step before cashing out".to_string(),
            ));
        }
        Ok(self.finish(GameOutcome::Win, self.multiplier_at(self.steps)))
    }

    fn finish(&self, outcome: GameOutcome, multiplier: f64) -> RoundSettlement {
        settle(
            &self.meta,
            GameType::Chicken,
            outcome,
            multiplier,
            self.seed.reveal(),
            GameDetail::Chicken {
                difficulty: self.difficulty,
                steps: self.steps,
                crash_step: self.crash_step,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(n: u64, difficulty: ChickenDifficulty) -> ChickenRound {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), n);
        ChickenRound::start(seed, RoundMeta::new("p", 10.0), difficulty, 20, 0.02).unwrap()
    }

    #[test]
    fn test_walks_until_crash_step() {
        for n in 0..200u64 {
            let mut r = round(n, ChickenDifficulty::Hard);
            let crash_step = r.crash_step;
            loop {
                match r.step() {
                    ChickenStep::Advanced(view) => assert!(view.steps <= crash_step),
                    ChickenStep::Finished(s) => {
                        if crash_step >= 20 {
                            assert_eq!(s.outcome, GameOutcome::Win);
                            assert_eq!(r.steps, 20);
                        } else {
                            assert_eq!(s.outcome, GameOutcome::Loss);
                            assert_eq!(r.steps, crash_step + 1);
                        }
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn test_cash_out_after_safe_step() {
        let n = (0..500u64)
            .find(|n| round(*n, ChickenDifficulty::Easy).crash_step >= 2)
            .expect("a round that survives two steps");
        let mut r = round(n, ChickenDifficulty::Easy);
        assert!(r.cash_out().is_err());

        assert!(matches!(r.step(), ChickenStep::Advanced(_)));
        let settlement = r.cash_out().unwrap();
        assert_eq!(settlement.outcome, GameOutcome::Win);
        assert_eq!(settlement.multiplier, chicken_multiplier(1, 0.96, 0.02));
        assert_eq!(settlement.payout, 10.0 * settlement.multiplier);
    }

    #[test]
    fn test_view_progression() {
        let r = round(1, ChickenDifficulty::Medium);
        let view = r.view();
        assert_eq!(view.steps, 0);
        assert_eq!(view.multiplier, 1.0);
        assert_eq!(view.next_multiplier, Some(chicken_multiplier(1, 0.88, 0.02)));
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 1);
        assert!(ChickenRound::start(seed, RoundMeta::new("p", 1.0), ChickenDifficulty::Easy, 0, 0.02).is_err());
    }
}
