//! Crash with an auto cash-out target: win `bet * target` if the round's
//! crash point reaches the target.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::errors::GameError;
use crate::fairness::generators::{CRASH_MAX, CRASH_MIN};
use crate::fairness::{crash_point, Seed};

pub fn validate_target(target: f64) -> Result<(), GameError> {
    if !target.is_finite() || !(CRASH_MIN..=CRASH_MAX).contains(&target) {
        return Err(GameError::invalid(
            "target",
            format!("must be in [{}, {}]", CRASH_MIN, CRASH_MAX),
        ));
    }
    Ok(())
}

pub fn play(seed: Seed, meta: &RoundMeta, target: f64, house_edge: f64) -> Result<RoundSettlement, GameError> {
    validate_target(target)?;

    let point = crash_point(&seed, house_edge);
    let (outcome, multiplier) = if point >= target {
        (GameOutcome::Win, target)
    } else {
        (GameOutcome::Loss, 0.0)
    };

    Ok(settle(
        meta,
        GameType::Crash,
        outcome,
        multiplier,
        seed.reveal(),
        GameDetail::Crash {
            target,
            crash_point: point,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bounds() {
        assert!(validate_target(1.0).is_err());
        assert!(validate_target(1.01).is_ok());
        assert!(validate_target(1000.0).is_ok());
        assert!(validate_target(1000.5).is_err());
        assert!(validate_target(f64::INFINITY).is_err());
    }

    #[test]
    fn test_win_iff_crash_point_reaches_target() {
        for n in 0..100u64 {
            let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), n);
            let point = crash_point(&seed, 0.01);
            let settlement = play(seed, &RoundMeta::new("p", 2.0), 1.5, 0.01).unwrap();

            if point >= 1.5 {
                assert_eq!(settlement.outcome, GameOutcome::Win);
                assert_eq!(settlement.payout, 3.0);
            } else {
                assert_eq!(settlement.outcome, GameOutcome::Loss);
                assert_eq!(settlement.payout, 0.0);
            }
        }
    }

    #[test]
    fn test_minimum_target_wins_most_rounds() {
        let wins = (0..1_000u64)
            .filter(|n| {
                let seed = Seed::from_parts("x".repeat(64), "y".repeat(32), *n);
                crash_point(&seed, 0.01) >= 1.01
            })
            .count();
        assert_eq!(wins, 1_000);
    }
}
