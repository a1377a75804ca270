#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use automod_engines::strikes::{StrikeLadderConfig, StrikeLadderRuntime};
use automod_kernel_contracts::strike::StrikeRecord;
use automod_kernel_contracts::{ActorId, UnixTimeMs};
use automod_storage::document::DocumentStore;
use automod_storage::documents::StrikeDocument;

/// Durable strike book. The in-memory copy is authoritative; every mutation is
/// written through to the store and a failed write only logs.
#[derive(Debug)]
pub struct StrikeLedger<S>
where
    S: DocumentStore<StrikeDocument>,
{
    store: S,
    runtime: StrikeLadderRuntime,
    doc: StrikeDocument,
}

impl<S> StrikeLedger<S>
where
    S: DocumentStore<StrikeDocument>,
{
    pub fn open(store: S, config: StrikeLadderConfig) -> Self {
        let doc = store.load_or_default();
        Self {
            store,
            runtime: StrikeLadderRuntime::new(config),
            doc,
        }
    }

    pub fn runtime(&self) -> &StrikeLadderRuntime {
        &self.runtime
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_violation(
        &mut self,
        actor: &ActorId,
        reason: &str,
        now: UnixTimeMs,
    ) -> StrikeRecord {
        let record = self.runtime.record(&mut self.doc.strikes, actor, reason, now);
        self.persist();
        record
    }

    /// Expired violations are pruned in memory; nothing is written.
    pub fn get(&mut self, actor: &ActorId, now: UnixTimeMs) -> StrikeRecord {
        self.runtime.read(&mut self.doc.strikes, actor, now)
    }

    pub fn clear(&mut self, actor: &ActorId) -> bool {
        let removed = self.doc.strikes.remove(actor).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        let count = self.doc.strikes.len();
        if count > 0 {
            self.doc.strikes.clear();
            self.persist();
        }
        count
    }

    pub fn tracked_actors(&self) -> usize {
        self.doc.strikes.len()
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.doc) {
            tracing::warn!(%err, "strike ledger write failed; keeping in-memory state");
        }
    }
}

/// One ledger handle shared by the message pipeline and the admin surface, so
/// both read and write the same in-memory book.
#[derive(Debug)]
pub struct SharedLedger<S>
where
    S: DocumentStore<StrikeDocument>,
{
    inner: Arc<Mutex<StrikeLedger<S>>>,
}

impl<S> SharedLedger<S>
where
    S: DocumentStore<StrikeDocument>,
{
    pub fn new(ledger: StrikeLedger<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn open(store: S, config: StrikeLadderConfig) -> Self {
        Self::new(StrikeLedger::open(store, config))
    }

    /// Never held across an await. Poisoning is ignored: every mutation leaves
    /// the book consistent.
    pub fn lock(&self) -> MutexGuard<'_, StrikeLedger<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Clone for SharedLedger<S>
where
    S: DocumentStore<StrikeDocument>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
