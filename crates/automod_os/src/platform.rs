#![forbid(unsafe_code)]

//! Boundary to the hosting chat platform. Every call may fail; callers in this
//! crate turn failures into step outcomes and never propagate them.

use std::collections::BTreeSet;

use thiserror::Error;

use automod_kernel_contracts::{ActorId, ChannelId, GuildId, MessageId};

use crate::enforcement::{DirectNotice, ModerationReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("not found")]
    NotFound,
    #[error("rate limited (retry after {retry_after_ms} ms)")]
    RateLimited { retry_after_ms: u64 },
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

#[allow(async_fn_in_trait)]
pub trait ChatPlatform {
    async fn delete_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PlatformError>;

    async fn timeout_member(
        &self,
        guild: &GuildId,
        actor: &ActorId,
        duration_ms: u64,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn kick_member(
        &self,
        guild: &GuildId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn ban_member(
        &self,
        guild: &GuildId,
        actor: &ActorId,
        delete_message_seconds: u32,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn send_direct_notice(
        &self,
        actor: &ActorId,
        notice: &DirectNotice,
    ) -> Result<(), PlatformError>;

    async fn post_report(
        &self,
        channel: &ChannelId,
        report: &ModerationReport,
    ) -> Result<(), PlatformError>;
}

/// Answers whether a channel is currently an open support ticket.
pub trait TicketDirectory {
    fn is_open_ticket(&self, channel: &ChannelId) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTickets;

impl TicketDirectory for NoTickets {
    fn is_open_ticket(&self, _channel: &ChannelId) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpenTicketSet {
    channels: BTreeSet<ChannelId>,
}

impl OpenTicketSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, channel: ChannelId) {
        self.channels.insert(channel);
    }

    pub fn close(&mut self, channel: &ChannelId) -> bool {
        self.channels.remove(channel)
    }
}

impl TicketDirectory for OpenTicketSet {
    fn is_open_ticket(&self, channel: &ChannelId) -> bool {
        self.channels.contains(channel)
    }
}
