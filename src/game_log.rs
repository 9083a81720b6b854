//! Record of settled rounds.
//!
//! Persistent storage is someone else's job; the service only needs somewhere
//! to push settlements and read back the latest ones for the recent-rounds feed.

use crate::games::RoundSettlement;
use std::collections::VecDeque;
use std::sync::RwLock;

pub trait GameLog: Send + Sync {
    fn record(&self, settlement: &RoundSettlement);

    /// Newest first, at most `limit` entries
    fn recent(&self, limit: usize) -> Vec<RoundSettlement>;
}

/// Bounded in-memory log; the oldest settlement is dropped once full.
pub struct MemoryGameLog {
    capacity: usize,
    entries: RwLock<VecDeque<RoundSettlement>>,
}

impl MemoryGameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(4_096))),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameLog for MemoryGameLog {
    fn record(&self, settlement: &RoundSettlement) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(settlement.clone());
    }

    fn recent(&self, limit: usize) -> Vec<RoundSettlement> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }
}
