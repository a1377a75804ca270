#![forbid(unsafe_code)]

use crate::config::ModerationAction;

/// Messages from the last 7 days are purged when a strike ladder bans.
pub const STRIKE_BAN_DELETE_MESSAGE_SECONDS: u32 = 604_800;
/// Messages from the last day are purged when a rule action bans directly.
pub const RULE_BAN_DELETE_MESSAGE_SECONDS: u32 = 86_400;

/// Member-level sanction resolved for one violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sanction {
    DeleteOnly,
    Timeout { duration_ms: u64 },
    Kick,
    Ban { delete_message_seconds: u32 },
}

impl Sanction {
    pub fn action(self) -> ModerationAction {
        match self {
            Sanction::DeleteOnly => ModerationAction::Delete,
            Sanction::Timeout { .. } => ModerationAction::Timeout,
            Sanction::Kick => ModerationAction::Kick,
            Sanction::Ban { .. } => ModerationAction::Ban,
        }
    }

    pub fn touches_member(self) -> bool {
        !matches!(self, Sanction::DeleteOnly)
    }
}

/// Where the actor sits on the ladder after the current violation was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrikeStanding {
    pub strikes: u32,
    pub tier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped(&'static str),
    Failed(String),
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// Per-step result of one enforcement sequence. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementOutcome {
    pub message_deleted: StepOutcome,
    pub member_sanctioned: StepOutcome,
    pub user_notified: StepOutcome,
    pub logged: StepOutcome,
}

impl EnforcementOutcome {
    pub fn message_deleted(&self) -> bool {
        self.message_deleted.is_done()
    }

    pub fn member_sanctioned(&self) -> bool {
        self.member_sanctioned.is_done()
    }

    pub fn user_notified(&self) -> bool {
        self.user_notified.is_done()
    }

    pub fn logged(&self) -> bool {
        self.logged.is_done()
    }

    pub fn failed_steps(&self) -> usize {
        [
            &self.message_deleted,
            &self.member_sanctioned,
            &self.user_notified,
            &self.logged,
        ]
        .into_iter()
        .filter(|s| s.is_failed())
        .count()
    }
}
