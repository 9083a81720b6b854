//! Slots: 3x3 grid, five paylines, three of a kind pays per line.

use super::types::{settle, GameDetail, GameOutcome, GameType, RoundMeta, RoundSettlement};
use crate::fairness::{slot_symbols, Seed, SlotSymbol};

/// Grid cells of each payline: three rows then both diagonals
pub const PAYLINES: [[usize; 3]; 5] = [[0, 1, 2], [3, 4, 5], [6, 7, 8], [0, 4, 8], [2, 4, 6]];

/// Line multiplier for three of a kind
pub fn symbol_multiplier(symbol: SlotSymbol) -> f64 {
    match symbol {
        SlotSymbol::Cherry => 2.0,
        SlotSymbol::Lemon => 3.0,
        SlotSymbol::Orange => 4.0,
        SlotSymbol::Grape => 5.0,
        SlotSymbol::Bell => 10.0,
        SlotSymbol::Star => 12.0,
        SlotSymbol::Diamond => 20.0,
        SlotSymbol::Seven => 40.0,
    }
}

/// Indices into [`PAYLINES`] that hit, and the summed multiplier.
pub fn evaluate(grid: &[SlotSymbol]) -> (Vec<usize>, f64) {
    let mut lines = Vec::new();
    let mut total = 0.0;
    for (i, [a, b, c]) in PAYLINES.iter().enumerate() {
        if grid[*a] == grid[*b] && grid[*b] == grid[*c] {
            lines.push(i);
            total += symbol_multiplier(grid[*a]);
        }
    }
    (lines, total)
}

pub fn play(seed: Seed, meta: &RoundMeta) -> RoundSettlement {
    let grid = slot_symbols(&seed);
    let (winning_lines, multiplier) = evaluate(&grid);
    let outcome = if multiplier > 0.0 {
        GameOutcome::Win
    } else {
        GameOutcome::Loss
    };

    settle(
        meta,
        GameType::Slots,
        outcome,
        multiplier,
        seed.reveal(),
        GameDetail::Slots {
            grid,
            winning_lines,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use SlotSymbol::*;

    #[test]
    fn test_evaluate_rows_and_diagonals() {
        let grid = [Seven, Lemon, Cherry, Grape, Seven, Grape, Bell, Bell, Seven];
        let (lines, total) = evaluate(&grid);
        assert_eq!(lines, vec![3]);
        assert_eq!(total, 40.0);

        let grid = [Cherry, Cherry, Cherry, Lemon, Cherry, Star, Cherry, Bell, Bell];
        let (lines, total) = evaluate(&grid);
        assert_eq!(lines, vec![0, 4]);
        assert_eq!(total, 4.0);
    }

    #[test]
    fn test_losing_grid() {
        let grid = [Cherry, Lemon, Orange, Grape, Bell, Star, Diamond, Seven, Cherry];
        assert_eq!(evaluate(&grid), (vec![], 0.0));
    }

    #[test]
    fn test_rtp_simulation_smoke() {
        let mut total_bet = 0.0;
        let mut total_payout = 0.0;
        for n in 0..5_000u64 {
            let seed = Seed::from_parts("s".repeat(64), "c".repeat(32), n);
            let settlement = play(seed, &RoundMeta::new("p", 1.0));
            total_bet += 1.0;
            total_payout += settlement.payout;
        }
        let rtp = total_payout / total_bet;
        // theoretical 0.9375; loose bounds for 5k spins
        assert!(rtp > 0.5 && rtp < 1.5, "rtp {}", rtp);
    }
}
