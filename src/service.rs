//! Game service: the one place that creates seeds, validates bets, drives the
//! round store and reports settlements to the log and metrics.

use crate::config::CasinoConfig;
use crate::errors::{CasinoError, CasinoResult, EntropyError, GameError, SessionError};
use crate::fairness::{self, CoinSide, RevealedSeed, Seed};
use crate::game_log::GameLog;
use crate::games::{
    blackjack::BlackjackStep, chicken::ChickenStep, coinflip, crash, mines::MinesStep, replay, slots,
    towers::TowersStep, ActiveRound, BlackjackRound, BlackjackView, ChickenDifficulty, ChickenRound,
    ChickenView, GameType, MinesRound, MinesView, ReplayOutcome, ReplayReport, ReplayRequest,
    ReplayVerdict, RoundMeta, RoundSettlement, TowersDifficulty, TowersRound, TowersView,
};
use crate::metrics::CasinoMetrics;
use crate::session::{Progress, RoundStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Produces committed seeds; the OS random source unless a test swaps it.
pub type SeedSource = Arc<dyn Fn() -> Result<Seed, EntropyError> + Send + Sync>;

/// State of a multi-step round after an action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "round", rename_all = "snake_case")]
pub enum RoundUpdate<V> {
    InProgress(V),
    Settled(RoundSettlement),
}

pub struct GameService {
    config: CasinoConfig,
    store: RoundStore,
    log: Arc<dyn GameLog>,
    metrics: CasinoMetrics,
    seed_source: SeedSource,
}

fn mismatched(game: GameType) -> CasinoError {
    GameError::ActionNotAllowed(format!("active round is not a {} round", game)).into()
}

impl GameService {
    pub fn new(config: CasinoConfig, log: Arc<dyn GameLog>, metrics: CasinoMetrics) -> Self {
        Self {
            config,
            store: RoundStore::new(),
            log,
            metrics,
            seed_source: Arc::new(fairness::create_seed),
        }
    }

    pub fn with_seed_source(mut self, source: SeedSource) -> Self {
        self.seed_source = source;
        self
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    pub fn store(&self) -> &RoundStore {
        &self.store
    }

    pub fn metrics(&self) -> &CasinoMetrics {
        &self.metrics
    }

    /// Sweep idle rounds in the background at the configured interval.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        self.store
            .spawn_reaper(self.config.reaper_interval(), self.config.round_ttl())
    }

    fn new_round(&self, user_id: &str, bet: f64, game: GameType) -> CasinoResult<(Seed, RoundMeta)> {
        crate::games::validate_bet(bet, self.config.games.min_bet, self.config.games.max_bet)?;

        let seed = (self.seed_source)().map_err(|e| {
            tracing::warn!(game = %game, error = %e, "Refusing round: no entropy");
            e
        })?;
        let meta = RoundMeta::new(user_id, bet);

        tracing::info!(
            user_id = %user_id,
            game = %game,
            round_id = %meta.round_id,
            bet,
            commitment = %seed.commitment_hash(),
            "Round started"
        );
        self.metrics.round_started(game);
        Ok((seed, meta))
    }

    /// Early reject before spending entropy; `begin` still enforces it.
    fn ensure_idle(&self, user_id: &str, game: GameType) -> CasinoResult<()> {
        if self.store.contains(user_id, game) {
            return Err(SessionError::RoundInProgress {
                user_id: user_id.to_string(),
                game,
            }
            .into());
        }
        Ok(())
    }

    fn begin(&self, user_id: &str, round: ActiveRound) -> CasinoResult<()> {
        self.store.begin(user_id, round)?;
        self.metrics.set_active_rounds(self.store.active_count());
        Ok(())
    }

    fn on_settled(&self, settlement: &RoundSettlement) {
        tracing::info!(
            user_id = %settlement.user_id,
            game = %settlement.game_type,
            round_id = %settlement.round_id,
            outcome = settlement.outcome.as_str(),
            payout = settlement.payout,
            "Round settled"
        );
        self.metrics.round_settled(
            settlement.game_type,
            settlement.outcome,
            settlement.bet,
            settlement.payout,
        );
        self.metrics.set_active_rounds(self.store.active_count());
        self.log.record(settlement);
    }

    fn act<V, F>(&self, user_id: &str, game: GameType, action: F) -> CasinoResult<RoundUpdate<V>>
    where
        F: FnOnce(&mut ActiveRound) -> CasinoResult<Progress<RoundUpdate<V>>>,
    {
        let update = self.store.with_round(user_id, game, action)?.into_inner();
        if let RoundUpdate::Settled(ref settlement) = update {
            self.on_settled(settlement);
        }
        Ok(update)
    }

    fn cash_out<F>(&self, user_id: &str, game: GameType, action: F) -> CasinoResult<RoundSettlement>
    where
        F: FnOnce(&mut ActiveRound) -> CasinoResult<RoundSettlement>,
    {
        let settlement = self
            .store
            .with_round(user_id, game, |round| action(round).map(Progress::Finished))?
            .into_inner();
        self.on_settled(&settlement);
        Ok(settlement)
    }

    // Single-shot games

    pub fn play_coinflip(&self, user_id: &str, bet: f64, choice: CoinSide) -> CasinoResult<RoundSettlement> {
        let (seed, meta) = self.new_round(user_id, bet, GameType::CoinFlip)?;
        let settlement = coinflip::play(seed, &meta, choice, self.config.fairness.coinflip_payout);
        self.on_settled(&settlement);
        Ok(settlement)
    }

    pub fn play_slots(&self, user_id: &str, bet: f64) -> CasinoResult<RoundSettlement> {
        let (seed, meta) = self.new_round(user_id, bet, GameType::Slots)?;
        let settlement = slots::play(seed, &meta);
        self.on_settled(&settlement);
        Ok(settlement)
    }

    pub fn play_crash(&self, user_id: &str, bet: f64, target: f64) -> CasinoResult<RoundSettlement> {
        crash::validate_target(target)?;
        let (seed, meta) = self.new_round(user_id, bet, GameType::Crash)?;
        let settlement = crash::play(seed, &meta, target, self.config.fairness.crash_house_edge)?;
        self.on_settled(&settlement);
        Ok(settlement)
    }

    // Mines

    pub fn start_mines(&self, user_id: &str, bet: f64, mine_count: u8) -> CasinoResult<MinesView> {
        self.ensure_idle(user_id, GameType::Mines)?;
        let board = self.config.games.mines_board_size;
        if mine_count == 0 || mine_count >= board {
            return Err(GameError::invalid("mine_count", format!("must be in [1, {}]", board - 1)).into());
        }

        let (seed, meta) = self.new_round(user_id, bet, GameType::Mines)?;
        let round = MinesRound::start(seed, meta, mine_count, board, self.config.fairness.mines_house_edge)?;
        let view = round.view();
        self.begin(user_id, ActiveRound::Mines(round))?;
        Ok(view)
    }

    pub fn reveal_mine_tile(&self, user_id: &str, tile: u8) -> CasinoResult<RoundUpdate<MinesView>> {
        self.act(user_id, GameType::Mines, |round| match round {
            ActiveRound::Mines(r) => Ok(match r.reveal(tile)? {
                MinesStep::Safe(view) => Progress::Continue(RoundUpdate::InProgress(view)),
                MinesStep::Finished(s) => Progress::Finished(RoundUpdate::Settled(s)),
            }),
            _ => Err(mismatched(GameType::Mines)),
        })
    }

    pub fn cash_out_mines(&self, user_id: &str) -> CasinoResult<RoundSettlement> {
        self.cash_out(user_id, GameType::Mines, |round| match round {
            ActiveRound::Mines(r) => Ok(r.cash_out()?),
            _ => Err(mismatched(GameType::Mines)),
        })
    }

    // Towers

    pub fn start_towers(&self, user_id: &str, bet: f64, difficulty: TowersDifficulty) -> CasinoResult<TowersView> {
        self.ensure_idle(user_id, GameType::Towers)?;
        let (seed, meta) = self.new_round(user_id, bet, GameType::Towers)?;
        let round = TowersRound::start(
            seed,
            meta,
            difficulty,
            self.config.games.towers_rows,
            self.config.fairness.towers_house_edge,
        )?;
        let view = round.view();
        self.begin(user_id, ActiveRound::Towers(round))?;
        Ok(view)
    }

    pub fn climb_tower(&self, user_id: &str, column: u8) -> CasinoResult<RoundUpdate<TowersView>> {
        self.act(user_id, GameType::Towers, |round| match round {
            ActiveRound::Towers(r) => Ok(match r.climb(column)? {
                TowersStep::Climbed(view) => Progress::Continue(RoundUpdate::InProgress(view)),
                TowersStep::Finished(s) => Progress::Finished(RoundUpdate::Settled(s)),
            }),
            _ => Err(mismatched(GameType::Towers)),
        })
    }

    pub fn cash_out_towers(&self, user_id: &str) -> CasinoResult<RoundSettlement> {
        self.cash_out(user_id, GameType::Towers, |round| match round {
            ActiveRound::Towers(r) => Ok(r.cash_out()?),
            _ => Err(mismatched(GameType::Towers)),
        })
    }

    // Blackjack

    /// Deal a hand. Naturals settle on the deal and never enter the store.
    pub fn start_blackjack(&self, user_id: &str, bet: f64) -> CasinoResult<RoundUpdate<BlackjackView>> {
        self.ensure_idle(user_id, GameType::Blackjack)?;
        let (seed, meta) = self.new_round(user_id, bet, GameType::Blackjack)?;
        let (round, step) = BlackjackRound::start(seed, meta, self.config.fairness.blackjack_deck);
        match step {
            BlackjackStep::Finished(settlement) => {
                self.on_settled(&settlement);
                Ok(RoundUpdate::Settled(settlement))
            }
            BlackjackStep::InPlay(view) => {
                self.begin(user_id, ActiveRound::Blackjack(round))?;
                Ok(RoundUpdate::InProgress(view))
            }
        }
    }

    fn blackjack_action<F>(&self, user_id: &str, action: F) -> CasinoResult<RoundUpdate<BlackjackView>>
    where
        F: FnOnce(&mut BlackjackRound) -> CasinoResult<BlackjackStep>,
    {
        self.act(user_id, GameType::Blackjack, |round| match round {
            ActiveRound::Blackjack(r) => Ok(match action(r)? {
                BlackjackStep::InPlay(view) => Progress::Continue(RoundUpdate::InProgress(view)),
                BlackjackStep::Finished(s) => Progress::Finished(RoundUpdate::Settled(s)),
            }),
            _ => Err(mismatched(GameType::Blackjack)),
        })
    }

    pub fn blackjack_hit(&self, user_id: &str) -> CasinoResult<RoundUpdate<BlackjackView>> {
        self.blackjack_action(user_id, |r| Ok(r.hit()))
    }

    pub fn blackjack_stand(&self, user_id: &str) -> CasinoResult<RoundUpdate<BlackjackView>> {
        self.blackjack_action(user_id, |r| Ok(r.stand()))
    }

    /// Doubling stakes the original bet again, so the doubled amount must
    /// still fit the bet limit.
    pub fn blackjack_double(&self, user_id: &str) -> CasinoResult<RoundUpdate<BlackjackView>> {
        let (min, max) = (self.config.games.min_bet, self.config.games.max_bet);
        self.blackjack_action(user_id, |r| {
            crate::games::validate_bet(r.meta().bet * 2.0, min, max)?;
            Ok(r.double()?)
        })
    }

    // Chicken Run

    pub fn start_chicken(&self, user_id: &str, bet: f64, difficulty: ChickenDifficulty) -> CasinoResult<ChickenView> {
        self.ensure_idle(user_id, GameType::Chicken)?;
        let (seed, meta) = self.new_round(user_id, bet, GameType::Chicken)?;
        let round = ChickenRound::start(
            seed,
            meta,
            difficulty,
            self.config.games.chicken_max_steps,
            self.config.fairness.chicken_house_edge,
        )?;
        let view = round.view();
        self.begin(user_id, ActiveRound::Chicken(round))?;
        Ok(view)
    }

    pub fn chicken_step(&self, user_id: &str) -> CasinoResult<RoundUpdate<ChickenView>> {
        self.act(user_id, GameType::Chicken, |round| match round {
            ActiveRound::Chicken(r) => Ok(match r.step() {
                ChickenStep::Advanced(view) => Progress::Continue(RoundUpdate::InProgress(view)),
                ChickenStep::Finished(s) => Progress::Finished(RoundUpdate::Settled(s)),
            }),
            _ => Err(mismatched(GameType::Chicken)),
        })
    }

    pub fn cash_out_chicken(&self, user_id: &str) -> CasinoResult<RoundSettlement> {
        self.cash_out(user_id, GameType::Chicken, |round| match round {
            ActiveRound::Chicken(r) => Ok(r.cash_out()?),
            _ => Err(mismatched(GameType::Chicken)),
        })
    }

    // Verification

    pub fn verify(&self, server_seed: &str, client_seed: &str, nonce: &str, expected_hash: &str) -> bool {
        let valid = fairness::verify(server_seed, client_seed, nonce, expected_hash);
        tracing::debug!(valid, "Commitment verification");
        self.metrics.verification("commitment", valid);
        valid
    }

    /// Replay a revealed round; with a claimed outcome, also return the verdict.
    pub fn replay(
        &self,
        seed: &RevealedSeed,
        request: &ReplayRequest,
        claimed: Option<&ReplayOutcome>,
    ) -> CasinoResult<(ReplayReport, Option<ReplayVerdict>)> {
        let report = replay(seed, request)?;
        let verdict = claimed.map(|c| report.check(c));
        let passed = match verdict {
            Some(ref v) => *v == ReplayVerdict::Verified,
            None => report.commitment_valid,
        };
        self.metrics.verification("replay", passed);
        Ok((report, verdict))
    }

    pub fn recent_rounds(&self, limit: usize) -> Vec<RoundSettlement> {
        self.log.recent(limit)
    }

    pub fn render_metrics(&self) -> CasinoResult<String> {
        self.metrics.set_active_rounds(self.store.active_count());
        self.metrics.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::generators::chicken_multiplier;
    use crate::game_log::MemoryGameLog;
    use crate::games::GameOutcome;

    fn service() -> GameService {
        let config = CasinoConfig::testing();
        let log = Arc::new(MemoryGameLog::new(config.api.recent_rounds_capacity));
        GameService::new(config, log, CasinoMetrics::new().unwrap())
    }

    #[test]
    fn test_single_shot_rounds_are_logged() {
        let svc = service();
        let s = svc.play_coinflip("alice", 10.0, CoinSide::Tails).unwrap();
        assert!(fairness::verify_seed(&s.seed));
        svc.play_slots("alice", 5.0).unwrap();
        svc.play_crash("bob", 5.0, 2.0).unwrap();

        let recent = svc.recent_rounds(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].game_type, GameType::Crash);
    }

    #[test]
    fn test_bet_limits_enforced() {
        let svc = service();
        let err = svc.play_slots("alice", 0.5).unwrap_err();
        assert!(matches!(err, CasinoError::Game(GameError::BetOutOfRange { .. })));
    }

    #[test]
    fn test_entropy_failure_refuses_round() {
        let svc = service().with_seed_source(Arc::new(|| Err(EntropyError("no device".into()))));
        let err = svc.start_mines("alice", 10.0, 3).unwrap_err();
        assert!(matches!(err, CasinoError::Entropy(_)));
        assert_eq!(svc.store().active_count(), 0);
    }

    #[test]
    fn test_mines_round_lifecycle() {
        let svc = service();
        let view = svc.start_mines("alice", 10.0, 24).unwrap();
        assert_eq!(view.mine_count, 24);
        assert!(matches!(
            svc.start_mines("alice", 10.0, 3),
            Err(CasinoError::Session(SessionError::RoundInProgress { .. }))
        ));

        // with 24 mines the first reveal settles either way
        let settled = match svc.reveal_mine_tile("alice", 0).unwrap() {
            RoundUpdate::Settled(s) => s,
            RoundUpdate::InProgress(_) => panic!("24-mine board settles on first reveal"),
        };
        assert_eq!(settled.user_id, "alice");
        assert!(!svc.store().contains("alice", GameType::Mines));
        assert!(matches!(
            svc.cash_out_mines("alice"),
            Err(CasinoError::Session(SessionError::NoActiveRound { .. }))
        ));
    }

    #[test]
    fn test_chicken_cash_out_pays_multiplier() {
        let n = (0..500u64)
            .find(|n| {
                let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), *n);
                fairness::chicken_crash_step(&seed, 0.96, 20) >= 1
            })
            .unwrap();
        let svc = service().with_seed_source(Arc::new(move || {
            Ok(Seed::from_parts("a".repeat(64), "b".repeat(32), n))
        }));

        svc.start_chicken("alice", 10.0, ChickenDifficulty::Easy).unwrap();
        assert!(matches!(svc.chicken_step("alice").unwrap(), RoundUpdate::InProgress(_)));
        let settlement = svc.cash_out_chicken("alice").unwrap();
        assert_eq!(settlement.outcome, GameOutcome::Win);
        assert_eq!(settlement.multiplier, chicken_multiplier(1, 0.96, 0.02));
    }

    #[test]
    fn test_blackjack_stand_settles() {
        let svc = service();
        for _ in 0..20 {
            match svc.start_blackjack("alice", 10.0).unwrap() {
                RoundUpdate::Settled(_) => continue,
                RoundUpdate::InProgress(_) => {
                    let update = svc.blackjack_stand("alice").unwrap();
                    assert!(matches!(update, RoundUpdate::Settled(_)));
                    assert!(!svc.store().contains("alice", GameType::Blackjack));
                    return;
                }
            }
        }
    }

    #[test]
    fn test_replay_of_served_round_verifies() {
        let svc = service();
        let s = svc.play_slots("alice", 1.0).unwrap();
        let claimed = ReplayOutcome::from(&s.detail);
        let (report, verdict) = svc.replay(&s.seed, &ReplayRequest::Slots, Some(&claimed)).unwrap();
        assert!(report.commitment_valid);
        assert_eq!(verdict, Some(ReplayVerdict::Verified));
    }

    #[test]
    fn test_metrics_reflect_activity() {
        let svc = service();
        svc.start_towers("alice", 10.0, TowersDifficulty::Easy).unwrap();
        assert!(!svc.verify("aa", "bb", "1", "00"));
        let text = svc.render_metrics().unwrap();
        assert!(text.contains("fairplay_active_rounds 1"));
        assert!(text.contains("fairplay_rounds_started_total{game=\"towers\"} 1"));
        assert!(text.contains("kind=\"commitment\",result=\"fail\""));
    }

    #[test]
    fn test_rounds_at_configured_limits_replay() {
        use crate::fairness::generators::{MAX_CHICKEN_STEPS, MAX_TOWERS_ROWS};

        let mut config = CasinoConfig::testing();
        config.games.towers_rows = MAX_TOWERS_ROWS;
        config.games.chicken_max_steps = MAX_CHICKEN_STEPS;
        config.validate().unwrap();
        let svc = GameService::new(config, Arc::new(MemoryGameLog::new(10)), CasinoMetrics::new().unwrap());

        svc.start_towers("alice", 1.0, TowersDifficulty::Expert).unwrap();
        let towers = (0..=MAX_TOWERS_ROWS)
            .find_map(|_| match svc.climb_tower("alice", 0).unwrap() {
                RoundUpdate::Settled(s) => Some(s),
                RoundUpdate::InProgress(_) => None,
            })
            .unwrap();
        let request = ReplayRequest::Towers {
            difficulty: TowersDifficulty::Expert,
            rows: MAX_TOWERS_ROWS,
        };
        let claimed = ReplayOutcome::from(&towers.detail);
        let (_, verdict) = svc.replay(&towers.seed, &request, Some(&claimed)).unwrap();
        assert_eq!(verdict, Some(ReplayVerdict::Verified));

        svc.start_chicken("alice", 1.0, ChickenDifficulty::Extreme).unwrap();
        let chicken = (0..=MAX_CHICKEN_STEPS)
            .find_map(|_| match svc.chicken_step("alice").unwrap() {
                RoundUpdate::Settled(s) => Some(s),
                RoundUpdate::InProgress(_) => None,
            })
            .unwrap();
        let request = ReplayRequest::Chicken {
            difficulty: ChickenDifficulty::Extreme,
            max_steps: MAX_CHICKEN_STEPS,
        };
        let claimed = ReplayOutcome::from(&chicken.detail);
        let (_, verdict) = svc.replay(&chicken.seed, &request, Some(&claimed)).unwrap();
        assert_eq!(verdict, Some(ReplayVerdict::Verified));
    }
}
