#![forbid(unsafe_code)]

use automod_kernel_contracts::config::{ModerationAction, StrikePolicy};
use automod_kernel_contracts::strike::{
    StrikeBook, StrikeEntry, StrikeRecord, StrikeState, STRIKE_DECAY_WINDOW_MS,
};
use automod_kernel_contracts::{ActorId, UnixTimeMs};

pub mod reason_codes {
    use automod_kernel_contracts::ReasonCodeId;

    // Strike ladder reason-code namespace.
    pub const AUTOMOD_STRIKE_TIER_RESOLVED: ReasonCodeId = ReasonCodeId(0x414D_0501);
    pub const AUTOMOD_STRIKE_LADDER_EMPTY: ReasonCodeId = ReasonCodeId(0x414D_05F1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeLadderConfig {
    pub decay_window_ms: u64,
    pub max_tracked_actors: usize,
}

impl StrikeLadderConfig {
    pub fn mvp_v1() -> Self {
        Self {
            decay_window_ms: STRIKE_DECAY_WINDOW_MS,
            max_tracked_actors: 1_000,
        }
    }
}

/// The rung an actor landed on and what it costs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierResolution {
    pub tier: u32,
    pub action: ModerationAction,
    pub duration_ms: Option<u64>,
}

/// Pure strike bookkeeping over a [`StrikeBook`]. Persistence is the caller's job.
#[derive(Debug, Clone)]
pub struct StrikeLadderRuntime {
    config: StrikeLadderConfig,
}

impl StrikeLadderRuntime {
    pub fn new(config: StrikeLadderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> StrikeLadderConfig {
        self.config
    }

    fn cutoff(&self, now: UnixTimeMs) -> UnixTimeMs {
        now.minus_ms(self.config.decay_window_ms)
    }

    /// Appends one violation, prunes expired ones and returns the updated record.
    pub fn record(
        &self,
        book: &mut StrikeBook,
        actor: &ActorId,
        reason: &str,
        now: UnixTimeMs,
    ) -> StrikeRecord {
        let cutoff = self.cutoff(now);
        let record = book.entry(actor.clone()).or_default();
        record.violations.push(StrikeEntry {
            timestamp_ms: now,
            reason: reason.to_string(),
        });
        record.prune_through(cutoff);
        let current = record.clone();

        if book.len() > self.config.max_tracked_actors {
            self.evict_empty(book, now);
        }
        current
    }

    /// Current standing with expired entries pruned. Unknown actors read as clean
    /// and are not inserted.
    pub fn read(&self, book: &mut StrikeBook, actor: &ActorId, now: UnixTimeMs) -> StrikeRecord {
        let cutoff = self.cutoff(now);
        match book.get_mut(actor) {
            Some(record) => {
                record.prune_through(cutoff);
                record.clone()
            }
            None => StrikeRecord::default(),
        }
    }

    /// Prunes every record and drops those left without violations. Returns how
    /// many actors were dropped.
    pub fn evict_empty(&self, book: &mut StrikeBook, now: UnixTimeMs) -> usize {
        let cutoff = self.cutoff(now);
        let before = book.len();
        book.retain(|_, record| {
            record.prune_through(cutoff);
            !record.violations.is_empty()
        });
        let evicted = before - book.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = book.len(), "evicted clean strike records");
        }
        evicted
    }

    /// Maps a live strike count to its rung. Rungs beyond the configured tiers
    /// reuse the last tier; an empty ladder resolves to nothing.
    pub fn resolve_tier(&self, policy: &StrikePolicy, strikes: u32) -> Option<TierResolution> {
        let tier = StrikeState::from_count(strikes).tier();
        if tier == 0 {
            return None;
        }
        let idx = (tier as usize).min(policy.tiers.len()).checked_sub(1)?;
        let rung = &policy.tiers[idx];
        Some(TierResolution {
            tier,
            action: rung.action,
            duration_ms: rung.duration_ms,
        })
    }
}

impl Default for StrikeLadderRuntime {
    fn default() -> Self {
        Self::new(StrikeLadderConfig::mvp_v1())
    }
}
