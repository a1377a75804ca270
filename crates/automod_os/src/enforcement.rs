#![forbid(unsafe_code)]

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use automod_kernel_contracts::config::{ModerationAction, StrikePolicy, StrikeTier};
use automod_kernel_contracts::enforcement::{
    EnforcementOutcome, Sanction, StepOutcome, StrikeStanding,
};
use automod_kernel_contracts::message::InboundMessage;
use automod_kernel_contracts::strike::STRIKE_TIER_COUNT;
use automod_kernel_contracts::violation::{Violation, ViolationKind};
use automod_kernel_contracts::{ActorId, ChannelId, UnixTimeMs};

use crate::platform::{ChatPlatform, PlatformError};

pub const MODERATOR_CONTEXT: &str = "automated system";
pub const STRIKE_RESET_FOOTER: &str = "Strikes reset after 30 days";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnforcementConfig {
    /// Upper bound for any single platform call.
    pub call_timeout_ms: u64,
}

impl EnforcementConfig {
    pub fn mvp_v1() -> Self {
        Self {
            call_timeout_ms: 10_000,
        }
    }
}

/// Everything the executor needs, decided before any platform call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementPlan {
    pub violation: Violation,
    pub sanction: Sanction,
    /// Present when the violation was routed through the strike ladder.
    pub strike: Option<StrikeStanding>,
    pub ladder: Vec<String>,
    /// Redacted and truncated copy of the message for the log report.
    pub log_content: String,
}

impl EnforcementPlan {
    /// Reason attached to the platform-side sanction (audit log entry).
    pub fn audit_reason(&self) -> String {
        match self.strike {
            Some(standing) => format!(
                "Automod Strike {}: {}",
                standing.strikes, self.violation.reason
            ),
            None => format!("Automod: {}", self.violation.reason),
        }
    }

    pub fn action_summary(&self) -> String {
        let sanction = describe_sanction(self.sanction);
        match self.strike {
            Some(standing) if standing.tier <= 1 => format!("WARNING - {sanction}"),
            Some(standing) => format!("STRIKE {} - {sanction}", standing.tier),
            None => sanction,
        }
    }

    /// Strike-routed violations and member sanctions are both announced to the actor.
    pub fn notifies_actor(&self) -> bool {
        self.strike.is_some() || self.sanction.touches_member()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectNotice {
    pub guild_name: String,
    pub violation: ViolationKind,
    pub reason: String,
    pub action: String,
    /// `"n/3"` for strike-routed notices.
    pub strike_count: Option<String>,
    pub ladder: Vec<String>,
    pub footer: Option<&'static str>,
}

impl DirectNotice {
    pub fn from_plan(plan: &EnforcementPlan, guild_name: &str) -> Self {
        Self {
            guild_name: guild_name.to_string(),
            violation: plan.violation.kind,
            reason: plan.violation.reason.clone(),
            action: plan.action_summary(),
            strike_count: plan
                .strike
                .map(|s| format!("{}/{}", s.strikes.min(STRIKE_TIER_COUNT), STRIKE_TIER_COUNT)),
            ladder: plan.ladder.clone(),
            footer: plan.strike.map(|_| STRIKE_RESET_FOOTER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationReport {
    pub actor_id: ActorId,
    pub actor_tag: String,
    pub channel_id: ChannelId,
    pub violation: ViolationKind,
    pub reason: String,
    pub action: ModerationAction,
    pub action_summary: String,
    pub strike: Option<ReportStrike>,
    pub content: Option<String>,
    pub moderator: &'static str,
    pub at: UnixTimeMs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportStrike {
    pub strikes: u32,
    pub tier: u32,
}

impl ModerationReport {
    pub fn from_plan(plan: &EnforcementPlan, message: &InboundMessage) -> Self {
        Self {
            actor_id: message.author_id.clone(),
            actor_tag: message.author_tag.clone(),
            channel_id: message.channel_id.clone(),
            violation: plan.violation.kind,
            reason: plan.violation.reason.clone(),
            action: plan.sanction.action(),
            action_summary: plan.action_summary(),
            strike: plan.strike.map(|s| ReportStrike {
                strikes: s.strikes,
                tier: s.tier,
            }),
            content: (!plan.log_content.is_empty()).then(|| plan.log_content.clone()),
            moderator: MODERATOR_CONTEXT,
            at: message.received_at,
        }
    }
}

/// Runs delete, sanction, notice and report in that order. No step can stop
/// the ones after it.
#[derive(Debug, Clone)]
pub struct EnforcementExecutor {
    config: EnforcementConfig,
}

impl EnforcementExecutor {
    pub fn new(config: EnforcementConfig) -> Self {
        Self { config }
    }

    pub async fn execute<P>(
        &self,
        platform: &P,
        message: &InboundMessage,
        plan: &EnforcementPlan,
        log_channel: Option<&ChannelId>,
    ) -> EnforcementOutcome
    where
        P: ChatPlatform,
    {
        let message_deleted = self.delete(platform, message).await;
        let member_sanctioned = self.sanction(platform, message, plan).await;
        let user_notified = self.notify(platform, message, plan).await;
        let logged = self.report(platform, message, plan, log_channel).await;

        let outcome = EnforcementOutcome {
            message_deleted,
            member_sanctioned,
            user_notified,
            logged,
        };
        tracing::info!(
            actor = %message.author_id,
            violation = %plan.violation.kind,
            action = %plan.sanction.action(),
            failed_steps = outcome.failed_steps(),
            "automod enforcement finished"
        );
        outcome
    }

    async fn call<F>(&self, fut: F) -> Result<(), PlatformError>
    where
        F: Future<Output = Result<(), PlatformError>>,
    {
        match tokio::time::timeout(Duration::from_millis(self.config.call_timeout_ms), fut).await {
            Ok(result) => result,
            Err(_) => Err(PlatformError::Unavailable(format!(
                "no response within {} ms",
                self.config.call_timeout_ms
            ))),
        }
    }

    async fn delete<P: ChatPlatform>(&self, platform: &P, message: &InboundMessage) -> StepOutcome {
        match self
            .call(platform.delete_message(&message.channel_id, &message.message_id))
            .await
        {
            Ok(()) | Err(PlatformError::NotFound) => StepOutcome::Done,
            Err(err) => {
                tracing::warn!(message = %message.message_id, %err, "automod could not delete message");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    async fn sanction<P: ChatPlatform>(
        &self,
        platform: &P,
        message: &InboundMessage,
        plan: &EnforcementPlan,
    ) -> StepOutcome {
        if !plan.sanction.touches_member() {
            return StepOutcome::Skipped("no member sanction for this action");
        }
        let guild = match (&message.guild_id, &message.member) {
            (Some(guild), Some(_)) => guild,
            _ => return StepOutcome::Skipped("author is no longer a member"),
        };
        let reason = plan.audit_reason();
        let actor = &message.author_id;
        let result = match plan.sanction {
            Sanction::Timeout { duration_ms } => {
                self.call(platform.timeout_member(guild, actor, duration_ms, &reason))
                    .await
            }
            Sanction::Kick => self.call(platform.kick_member(guild, actor, &reason)).await,
            Sanction::Ban {
                delete_message_seconds,
            } => {
                self.call(platform.ban_member(guild, actor, delete_message_seconds, &reason))
                    .await
            }
            Sanction::DeleteOnly => return StepOutcome::Skipped("no member sanction for this action"),
        };
        match result {
            Ok(()) => StepOutcome::Done,
            Err(PlatformError::NotFound) => StepOutcome::Skipped("author is no longer a member"),
            Err(err) => {
                tracing::warn!(%actor, action = %plan.sanction.action(), %err, "automod sanction failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    async fn notify<P: ChatPlatform>(
        &self,
        platform: &P,
        message: &InboundMessage,
        plan: &EnforcementPlan,
    ) -> StepOutcome {
        if !plan.notifies_actor() {
            return StepOutcome::Skipped("delete-only actions are not announced");
        }
        let notice = DirectNotice::from_plan(plan, &message.guild_name);
        match self
            .call(platform.send_direct_notice(&message.author_id, &notice))
            .await
        {
            Ok(()) => StepOutcome::Done,
            Err(err) => {
                tracing::debug!(actor = %message.author_id, %err, "automod notice undeliverable");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    async fn report<P: ChatPlatform>(
        &self,
        platform: &P,
        message: &InboundMessage,
        plan: &EnforcementPlan,
        log_channel: Option<&ChannelId>,
    ) -> StepOutcome {
        let Some(channel) = log_channel else {
            return StepOutcome::Skipped("no log channel configured");
        };
        let report = ModerationReport::from_plan(plan, message);
        match self.call(platform.post_report(channel, &report)).await {
            Ok(()) => StepOutcome::Done,
            Err(err) => {
                tracing::warn!(%channel, %err, "automod log report failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }
}

impl Default for EnforcementExecutor {
    fn default() -> Self {
        Self::new(EnforcementConfig::mvp_v1())
    }
}

pub fn describe_sanction(sanction: Sanction) -> String {
    match sanction {
        Sanction::DeleteOnly => "Message deleted".to_string(),
        Sanction::Timeout { duration_ms } => format!("{} timeout", format_duration(duration_ms)),
        Sanction::Kick => "Kick".to_string(),
        Sanction::Ban { .. } => "Permanent ban".to_string(),
    }
}

fn describe_tier(tier: &StrikeTier) -> String {
    match tier.action {
        ModerationAction::Timeout => match tier.duration_ms {
            Some(ms) => format!("{} timeout", format_duration(ms)),
            None => "Timeout".to_string(),
        },
        ModerationAction::Kick => "Kick".to_string(),
        ModerationAction::Ban => "Permanent ban".to_string(),
        ModerationAction::Delete | ModerationAction::Strike => "Message deleted".to_string(),
    }
}

/// One line per rung, e.g. `Strike 2: 24 hour timeout`. Rungs past the
/// configured tiers repeat the last one.
pub fn render_ladder(policy: &StrikePolicy) -> Vec<String> {
    let Some(last) = policy.tiers.last() else {
        return Vec::new();
    };
    (1..=STRIKE_TIER_COUNT as usize)
        .map(|rung| {
            let tier = policy.tiers.get(rung - 1).unwrap_or(last);
            let text = describe_tier(tier);
            if rung == 1 {
                format!("Strike {rung}: Warning + {text}")
            } else {
                format!("Strike {rung}: {text}")
            }
        })
        .collect()
}

/// Largest whole unit: `5 minute`, `24 hour`, `7 day`.
pub fn format_duration(ms: u64) -> String {
    const SECOND: u64 = 1_000;
    const MINUTE: u64 = 60 * SECOND;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    if ms >= 2 * DAY && ms % DAY == 0 {
        format!("{} day", ms / DAY)
    } else if ms >= HOUR && ms % HOUR == 0 {
        format!("{} hour", ms / HOUR)
    } else if ms >= MINUTE && ms % MINUTE == 0 {
        format!("{} minute", ms / MINUTE)
    } else {
        format!("{} second", ms.div_ceil(SECOND))
    }
}
