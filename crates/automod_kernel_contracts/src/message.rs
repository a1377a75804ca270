#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use crate::{ActorId, ChannelId, ContractViolation, GuildId, MessageId, RoleId, UnixTimeMs, Validate};

/// Author's membership as seen by the platform when the message arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub roles: BTreeSet<RoleId>,
    pub is_administrator: bool,
}

impl MemberSnapshot {
    pub fn has_any_role(&self, roles: &BTreeSet<RoleId>) -> bool {
        !self.roles.is_disjoint(roles)
    }
}

/// Inbound "message received" event from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: MessageId,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub guild_name: String,
    pub channel_id: ChannelId,
    pub author_id: ActorId,
    pub author_tag: String,
    pub author_is_bot: bool,
    pub content: String,
    /// `None` once the author has left the guild.
    pub member: Option<MemberSnapshot>,
    pub received_at: UnixTimeMs,
}

impl InboundMessage {
    pub fn author_has_any_role(&self, roles: &BTreeSet<RoleId>) -> bool {
        self.member
            .as_ref()
            .map(|m| m.has_any_role(roles))
            .unwrap_or(false)
    }

    pub fn author_is_administrator(&self) -> bool {
        self.member
            .as_ref()
            .map(|m| m.is_administrator)
            .unwrap_or(false)
    }
}

impl Validate for InboundMessage {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.message_id.validate()?;
        if let Some(guild_id) = &self.guild_id {
            guild_id.validate()?;
        }
        self.channel_id.validate()?;
        self.author_id.validate()?;
        if self.received_at.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "inbound_message.received_at",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}
