//! Prometheus metrics for rounds, credits and verification

use crate::errors::{CasinoResult, MonitoringError};
use crate::games::{GameOutcome, GameType};
use prometheus::{CounterVec, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct CasinoMetrics {
    registry: Registry,
    rounds_started: IntCounterVec,
    rounds_settled: IntCounterVec,
    active_rounds: IntGauge,
    verifications: IntCounterVec,
    wagered: CounterVec,
    paid_out: CounterVec,
}

impl CasinoMetrics {
    pub fn new() -> CasinoResult<Self> {
        let registry = Registry::new_custom(Some("fairplay".to_string()), None)?;

        let rounds_started = IntCounterVec::new(
            Opts::new("rounds_started_total", "Rounds started per game"),
            &["game"],
        )?;
        let rounds_settled = IntCounterVec::new(
            Opts::new("rounds_settled_total", "Rounds settled per game and outcome"),
            &["game", "outcome"],
        )?;
        let active_rounds = IntGauge::new("active_rounds", "Multi-step rounds awaiting an action")?;
        let verifications = IntCounterVec::new(
            Opts::new("verifications_total", "Verification requests by result"),
            &["kind", "result"],
        )?;
        let wagered = CounterVec::new(Opts::new("wagered_credits_total", "Credits wagered"), &["game"])?;
        let paid_out = CounterVec::new(Opts::new("paid_credits_total", "Credits paid out"), &["game"])?;

        registry.register(Box::new(rounds_started.clone()))?;
        registry.register(Box::new(rounds_settled.clone()))?;
        registry.register(Box::new(active_rounds.clone()))?;
        registry.register(Box::new(verifications.clone()))?;
        registry.register(Box::new(wagered.clone()))?;
        registry.register(Box::new(paid_out.clone()))?;

        Ok(Self {
            registry,
            rounds_started,
            rounds_settled,
            active_rounds,
            verifications,
            wagered,
            paid_out,
        })
    }

    pub fn round_started(&self, game: GameType) {
        self.rounds_started.with_label_values(&[game.as_str()]).inc();
    }

    pub fn round_settled(&self, game: GameType, outcome: GameOutcome, bet: f64, payout: f64) {
        self.rounds_settled
            .with_label_values(&[game.as_str(), outcome.as_str()])
            .inc();
        self.wagered.with_label_values(&[game.as_str()]).inc_by(bet);
        self.paid_out.with_label_values(&[game.as_str()]).inc_by(payout);
    }

    pub fn set_active_rounds(&self, count: usize) {
        self.active_rounds.set(count as i64);
    }

    /// `kind` is "commitment" or "replay"
    pub fn verification(&self, kind: &str, passed: bool) {
        let result = if passed { "pass" } else { "fail" };
        self.verifications.with_label_values(&[kind, result]).inc();
    }

    /// Text exposition format
    pub fn render(&self) -> CasinoResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MonitoringError::EncodingFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MonitoringError::EncodingFailed(e.to_string()).into())
    }
}
