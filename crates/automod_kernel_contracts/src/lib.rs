#![forbid(unsafe_code)]

pub mod common;
pub mod config;
pub mod enforcement;
pub mod message;
pub mod strike;
pub mod violation;

pub use common::{
    ActorId, ChannelId, ContractViolation, GuildId, MessageId, ReasonCodeId, RoleId, UnixTimeMs,
    Validate,
};
