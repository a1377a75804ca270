#![forbid(unsafe_code)]

use std::collections::{HashMap, VecDeque};

use automod_kernel_contracts::{ActorId, UnixTimeMs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityConfig {
    /// Collection kicks in once more than this many actors are tracked.
    pub max_tracked_actors: usize,
    pub stale_after_ms: u64,
}

impl ActivityConfig {
    pub fn mvp_v1() -> Self {
        Self {
            max_tracked_actors: 1_000,
            stale_after_ms: 60_000,
        }
    }
}

/// Sliding-window record of recent message times per actor. Process-local, never persisted.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    config: ActivityConfig,
    recent: HashMap<ActorId, VecDeque<UnixTimeMs>>,
}

impl ActivityTracker {
    pub fn new(config: ActivityConfig) -> Self {
        Self {
            config,
            recent: HashMap::new(),
        }
    }

    /// Records one message at `now` and returns how many of the actor's messages,
    /// this one included, fall strictly inside `window_ms`.
    pub fn touch(&mut self, actor: &ActorId, now: UnixTimeMs, window_ms: u64) -> usize {
        let stamps = self.recent.entry(actor.clone()).or_default();
        stamps.retain(|t| now.millis_since(*t) < window_ms);
        stamps.push_back(now);
        let count = stamps.len();

        if self.recent.len() > self.config.max_tracked_actors {
            self.collect(now);
        }
        count
    }

    /// Count inside the window without recording anything.
    pub fn count_within(&self, actor: &ActorId, now: UnixTimeMs, window_ms: u64) -> usize {
        self.recent
            .get(actor)
            .map(|stamps| {
                stamps
                    .iter()
                    .filter(|t| now.millis_since(**t) < window_ms)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn tracked_actors(&self) -> usize {
        self.recent.len()
    }

    fn collect(&mut self, now: UnixTimeMs) {
        let stale_after_ms = self.config.stale_after_ms;
        let before = self.recent.len();
        self.recent.retain(|_, stamps| match stamps.back() {
            Some(last) => now.millis_since(*last) <= stale_after_ms,
            None => false,
        });
        tracing::debug!(
            before,
            after = self.recent.len(),
            "collected idle actors from activity tracker"
        );
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(ActivityConfig::mvp_v1())
    }
}
