#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ActorId, UnixTimeMs};

/// Number of ladder rungs. Counts above this saturate on the last rung.
pub const STRIKE_TIER_COUNT: u32 = 3;
pub const STRIKE_DECAY_WINDOW_MS: u64 = 30 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeEntry {
    pub timestamp_ms: UnixTimeMs,
    pub reason: String,
}

/// Durable per-actor strike state. `strikes` is the live count of unexpired violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeRecord {
    pub strikes: u32,
    #[serde(default)]
    pub violations: Vec<StrikeEntry>,
}

impl StrikeRecord {
    /// Drops entries at or before `cutoff` and recounts. Returns how many were dropped.
    pub fn prune_through(&mut self, cutoff: UnixTimeMs) -> usize {
        let before = self.violations.len();
        self.violations.retain(|v| v.timestamp_ms > cutoff);
        self.strikes = self.violations.len() as u32;
        before - self.violations.len()
    }

    pub fn state(&self) -> StrikeState {
        StrikeState::from_count(self.strikes)
    }

    pub fn last_violation(&self) -> Option<&StrikeEntry> {
        self.violations.iter().max_by_key(|v| v.timestamp_ms)
    }
}

pub type StrikeBook = BTreeMap<ActorId, StrikeRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrikeState {
    Clean,
    Strike1,
    Strike2,
    /// Terminal rung; further violations stay here.
    Strike3,
}

impl StrikeState {
    pub fn from_count(strikes: u32) -> Self {
        match strikes {
            0 => StrikeState::Clean,
            1 => StrikeState::Strike1,
            2 => StrikeState::Strike2,
            _ => StrikeState::Strike3,
        }
    }

    /// Ladder rung, 0 for a clean actor.
    pub fn tier(self) -> u32 {
        match self {
            StrikeState::Clean => 0,
            StrikeState::Strike1 => 1,
            StrikeState::Strike2 => 2,
            StrikeState::Strike3 => STRIKE_TIER_COUNT,
        }
    }
}
