#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use automod_kernel_contracts::message::{InboundMessage, MemberSnapshot};
use automod_kernel_contracts::{ActorId, ChannelId, GuildId, MessageId, UnixTimeMs};
use automod_os::dispatch::{AutomodEngine, AutomodEngineConfig};
use automod_os::enforcement::{DirectNotice, ModerationReport};
use automod_os::platform::{ChatPlatform, PlatformError};
use automod_storage::document::MemoryStore;
use automod_storage::documents::StrikeDocument;

pub const T0: u64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(MessageId),
    Timeout(ActorId, u64, String),
    Kick(ActorId, String),
    Ban(ActorId, u32, String),
    Notice(ActorId, DirectNotice),
    Report(ChannelId, ModerationReport),
}

/// Records every call; `fail` makes the named operation return an error and
/// `gate_timeouts` holds every timeout until the gate is notified.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    failures: HashMap<&'static str, PlatformError>,
    timeout_gate: Option<Arc<Notify>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, op: &'static str, err: PlatformError) -> Self {
        self.failures.insert(op, err);
        self
    }

    pub fn gate_timeouts(mut self, gate: Arc<Notify>) -> Self {
        self.timeout_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: Call) -> Result<(), PlatformError> {
        if let Some(err) = self.failures.get(op) {
            return Err(err.clone());
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl ChatPlatform for RecordingPlatform {
    async fn delete_message(
        &self,
        _channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PlatformError> {
        self.record("delete", Call::Delete(message.clone()))
    }

    async fn timeout_member(
        &self,
        _guild: &GuildId,
        actor: &ActorId,
        duration_ms: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        if let Some(gate) = &self.timeout_gate {
            gate.notified().await;
        }
        self.record(
            "timeout",
            Call::Timeout(actor.clone(), duration_ms, reason.to_string()),
        )
    }

    async fn kick_member(
        &self,
        _guild: &GuildId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record("kick", Call::Kick(actor.clone(), reason.to_string()))
    }

    async fn ban_member(
        &self,
        _guild: &GuildId,
        actor: &ActorId,
        delete_message_seconds: u32,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            "ban",
            Call::Ban(actor.clone(), delete_message_seconds, reason.to_string()),
        )
    }

    async fn send_direct_notice(
        &self,
        actor: &ActorId,
        notice: &DirectNotice,
    ) -> Result<(), PlatformError> {
        self.record("notice", Call::Notice(actor.clone(), notice.clone()))
    }

    async fn post_report(
        &self,
        channel: &ChannelId,
        report: &ModerationReport,
    ) -> Result<(), PlatformError> {
        self.record("report", Call::Report(channel.clone(), report.clone()))
    }
}

pub type TestEngine = AutomodEngine<MemoryStore<StrikeDocument>>;

pub fn engine() -> TestEngine {
    AutomodEngine::new(AutomodEngineConfig::mvp_v1(), MemoryStore::new())
}

pub fn other_author() -> ActorId {
    ActorId::new("737373").unwrap()
}

pub fn author() -> ActorId {
    ActorId::new("424242").unwrap()
}

pub fn log_channel() -> ChannelId {
    ChannelId::new("modlog").unwrap()
}

pub fn message(seq: u64, content: &str, offset_ms: u64) -> InboundMessage {
    InboundMessage {
        message_id: MessageId::new(format!("msg_{seq}")).unwrap(),
        guild_id: Some(GuildId::new("guild_1").unwrap()),
        guild_name: "Test Guild".to_string(),
        channel_id: ChannelId::new("general").unwrap(),
        author_id: author(),
        author_tag: "tester#0001".to_string(),
        author_is_bot: false,
        content: content.to_string(),
        member: Some(MemberSnapshot {
            roles: BTreeSet::new(),
            is_administrator: false,
        }),
        received_at: UnixTimeMs(T0 + offset_ms),
    }
}
