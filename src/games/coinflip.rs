//! Coinflip: one draw, pays `bet * payout` on a correct call.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::fairness::{coin_side, CoinSide, Seed};

pub fn play(seed: Seed, meta: &RoundMeta, choice: CoinSide, payout: f64) -> RoundSettlement {
    let result = coin_side(&seed);
    let (outcome, multiplier) = if result == choice {
        (GameOutcome::Win, payout)
    } else {
        (GameOutcome::Loss, 0.0)
    };

    settle(
        meta,
        GameType::CoinFlip,
        outcome,
        multiplier,
        seed.reveal(),
        GameDetail::CoinFlip { choice, result },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_matches_outcome() {
        for n in 0..20u64 {
            let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), n);
            let meta = RoundMeta::new("player", 10.0);
            let settlement = play(seed.clone(), &meta, CoinSide::Heads, 1.98);

            match settlement.outcome {
                GameOutcome::Win => {
                    assert_eq!(coin_side(&seed), CoinSide::Heads);
                    assert!((settlement.payout - 19.8).abs() < 1e-9);
                }
                GameOutcome::Loss => assert_eq!(settlement.payout, 0.0),
                GameOutcome::Push => panic!("coinflip never pushes"),
            }
            assert_eq!(settlement.seed, seed.reveal());
        }
    }

    #[test]
    fn test_both_sides_occur() {
        let sides: std::collections::HashSet<CoinSide> = (0..64u64)
            .map(|n| coin_side(&Seed::from_parts("c".repeat(64), "d".repeat(32), n)))
            .collect();
        assert_eq!(sides.len(), 2);
    }
}
