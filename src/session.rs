//! In-progress multi-step rounds, one per (user, game).
//!
//! The fairness engine never holds per-user state; this store does. An entry
//! lives from round start until the round settles or sits idle past the TTL.
//! Expired rounds are dropped without revealing their seed.

use crate::errors::{CasinoError, CasinoResult, SessionError};
use crate::games::{ActiveRound, GameType};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

type RoundKey = (String, GameType);

struct StoredRound {
    round: ActiveRound,
    last_active: Instant,
}

/// What an action did to the round it touched
#[derive(Debug)]
pub enum Progress<T> {
    /// Round stays open
    Continue(T),
    /// Round settled and was removed from the store
    Finished(T),
}

impl<T> Progress<T> {
    pub fn into_inner(self) -> T {
        match self {
            Progress::Continue(v) | Progress::Finished(v) => v,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Progress::Finished(_))
    }
}

/// Thread-safe map of active rounds keyed by user and game
#[derive(Clone)]
pub struct RoundStore {
    rounds: Arc<DashMap<RoundKey, StoredRound>>,
}

impl RoundStore {
    pub fn new() -> Self {
        Self {
            rounds: Arc::new(DashMap::new()),
        }
    }

    /// Register a freshly started round. Fails if the user already has an
    /// unfinished round of the same game.
    pub fn begin(&self, user_id: &str, round: ActiveRound) -> Result<(), SessionError> {
        let game = round.game_type();
        match self.rounds.entry((user_id.to_string(), game)) {
            Entry::Occupied(_) => Err(SessionError::RoundInProgress {
                user_id: user_id.to_string(),
                game,
            }),
            Entry::Vacant(slot) => {
                slot.insert(StoredRound {
                    round,
                    last_active: Instant::now(),
                });
                Ok(())
            }
        }
    }

    /// Run `action` against the user's active round, holding only that
    /// entry's lock. A `Finished` result removes the round.
    pub fn with_round<T, F>(&self, user_id: &str, game: GameType, action: F) -> CasinoResult<Progress<T>>
    where
        F: FnOnce(&mut ActiveRound) -> CasinoResult<Progress<T>>,
    {
        match self.rounds.entry((user_id.to_string(), game)) {
            Entry::Vacant(_) => Err(CasinoError::Session(SessionError::NoActiveRound {
                user_id: user_id.to_string(),
                game,
            })),
            Entry::Occupied(mut slot) => {
                let stored = slot.get_mut();
                stored.last_active = Instant::now();
                let progress = action(&mut stored.round)?;
                if progress.is_finished() {
                    slot.remove();
                }
                Ok(progress)
            }
        }
    }

    pub fn contains(&self, user_id: &str, game: GameType) -> bool {
        self.rounds.contains_key(&(user_id.to_string(), game))
    }

    pub fn active_count(&self) -> usize {
        self.rounds.len()
    }

    /// Remove rounds idle for longer than `ttl`; returns how many went.
    pub fn expire_stale(&self, ttl: Duration) -> usize {
        let before = self.rounds.len();
        self.rounds.retain(|(user_id, game), stored| {
            let keep = stored.last_active.elapsed() < ttl;
            if !keep {
                tracing::warn!(
                    user_id = %user_id,
                    game = %game,
                    round_id = %stored.round.meta().round_id,
                    "Expiring idle round"
                );
            }
            keep
        });
        before.saturating_sub(self.rounds.len())
    }

    /// Background task sweeping idle rounds every `interval`.
    pub fn spawn_reaper(&self, interval: Duration, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let expired = store.expire_stale(ttl);
                if expired > 0 {
                    tracing::info!(expired, active = store.active_count(), "Reaped idle rounds");
                }
            }
        })
    }
}

impl Default for RoundStore {
    fn default() -> Self {
        Self::new()
    }
}
