#![forbid(unsafe_code)]

use std::sync::{Arc, MutexGuard};

use tokio::sync::Mutex;

use automod_engines::activity::{ActivityConfig, ActivityTracker};
use automod_engines::badwords::{censor, evaluate_badwords, truncate_for_log, BadwordMatcher};
use automod_engines::caps::evaluate_caps;
use automod_engines::links::evaluate_links;
use automod_engines::spam::evaluate_spam;
use automod_engines::strikes::{reason_codes as strike_codes, StrikeLadderConfig};
use automod_kernel_contracts::config::{AutomodConfig, ModerationAction, RuleKind};
use automod_kernel_contracts::enforcement::{
    EnforcementOutcome, Sanction, StrikeStanding, RULE_BAN_DELETE_MESSAGE_SECONDS,
    STRIKE_BAN_DELETE_MESSAGE_SECONDS,
};
use automod_kernel_contracts::message::InboundMessage;
use automod_kernel_contracts::violation::Violation;
use automod_kernel_contracts::Validate;
use automod_storage::document::DocumentStore;
use automod_storage::documents::StrikeDocument;

use crate::enforcement::{render_ladder, EnforcementConfig, EnforcementExecutor, EnforcementPlan};
use crate::ledger::{SharedLedger, StrikeLedger};
use crate::platform::{ChatPlatform, TicketDirectory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomodEngineConfig {
    pub activity: ActivityConfig,
    pub strikes: StrikeLadderConfig,
    pub enforcement: EnforcementConfig,
}

impl AutomodEngineConfig {
    pub fn mvp_v1() -> Self {
        Self {
            activity: ActivityConfig::mvp_v1(),
            strikes: StrikeLadderConfig::mvp_v1(),
            enforcement: EnforcementConfig::mvp_v1(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationOutcome {
    pub plan: EnforcementPlan,
    pub enforcement: EnforcementOutcome,
}

/// Owns all mutable moderation state. One instance per community; tests build
/// their own.
#[derive(Debug)]
pub struct AutomodEngine<S>
where
    S: DocumentStore<StrikeDocument>,
{
    activity: ActivityTracker,
    ledger: SharedLedger<S>,
    matcher: BadwordMatcher,
    executor: EnforcementExecutor,
}

pub type SharedEngine<S> = Arc<Mutex<AutomodEngine<S>>>;

impl<S> AutomodEngine<S>
where
    S: DocumentStore<StrikeDocument>,
{
    pub fn new(config: AutomodEngineConfig, strike_store: S) -> Self {
        Self::with_ledger(config, SharedLedger::open(strike_store, config.strikes))
    }

    /// Builds the engine over a ledger handle that other surfaces (the admin
    /// surface) may hold too.
    pub fn with_ledger(config: AutomodEngineConfig, ledger: SharedLedger<S>) -> Self {
        Self {
            activity: ActivityTracker::new(config.activity),
            ledger,
            matcher: BadwordMatcher::default(),
            executor: EnforcementExecutor::new(config.enforcement),
        }
    }

    pub fn shared(self) -> SharedEngine<S> {
        Arc::new(Mutex::new(self))
    }

    pub fn ledger(&self) -> MutexGuard<'_, StrikeLedger<S>> {
        self.ledger.lock()
    }

    pub fn shared_ledger(&self) -> SharedLedger<S> {
        self.ledger.clone()
    }

    pub fn executor(&self) -> &EnforcementExecutor {
        &self.executor
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Decides what, if anything, happens to `message`. Mutates the activity
    /// window and, for strike-routed violations, the ledger. Makes no platform calls.
    pub fn plan<T>(
        &mut self,
        message: &InboundMessage,
        config: &AutomodConfig,
        tickets: &T,
    ) -> Option<EnforcementPlan>
    where
        T: TicketDirectory + ?Sized,
    {
        if let Err(err) = message.validate() {
            tracing::warn!(message = %message.message_id, %err, "dropping malformed inbound message");
            return None;
        }
        if !config.enabled || message.author_is_bot || message.guild_id.is_none() {
            return None;
        }
        if message.author_is_administrator() || message.author_has_any_role(&config.immune_roles) {
            return None;
        }

        let violation = self.first_violation(message, config, tickets)?;
        let rule = violation.kind.rule();
        let (sanction, strike) = self.resolve_action(message, config, rule, &violation);

        let ladder = if strike.is_some() {
            render_ladder(&config.strikes)
        } else {
            Vec::new()
        };
        let log_content = match &violation.matched_text {
            Some(word) => truncate_for_log(&censor(&message.content, word)),
            None => truncate_for_log(&message.content),
        };

        tracing::info!(
            actor = %message.author_id,
            channel = %message.channel_id,
            violation = %violation.kind,
            reason_code = violation.reason_code.0,
            action = %sanction.action(),
            strikes = strike.map(|s| s.strikes),
            "automod violation"
        );
        Some(EnforcementPlan {
            violation,
            sanction,
            strike,
            ladder,
            log_content,
        })
    }

    /// Plans and then carries out enforcement for one inbound message.
    pub async fn process<P, T>(
        &mut self,
        platform: &P,
        message: &InboundMessage,
        config: &AutomodConfig,
        tickets: &T,
    ) -> Option<ModerationOutcome>
    where
        P: ChatPlatform,
        T: TicketDirectory + ?Sized,
    {
        let plan = self.plan(message, config, tickets)?;
        let enforcement = self
            .executor
            .execute(platform, message, &plan, config.log_channel_id.as_ref())
            .await;
        Some(ModerationOutcome { plan, enforcement })
    }

    fn first_violation<T>(
        &mut self,
        message: &InboundMessage,
        config: &AutomodConfig,
        tickets: &T,
    ) -> Option<Violation>
    where
        T: TicketDirectory + ?Sized,
    {
        let in_ticket = tickets.is_open_ticket(&message.channel_id);
        for rule in RuleKind::PRIORITY {
            if in_ticket && !rule.applies_in_tickets() {
                continue;
            }
            if !config.rule_enabled(rule) {
                continue;
            }
            let Some(violation) = self.evaluate(rule, message, config) else {
                continue;
            };
            if message.author_has_any_role(config.ignore_roles(rule)) {
                tracing::debug!(
                    actor = %message.author_id,
                    rule = rule.as_str(),
                    "violation suppressed by ignore_roles"
                );
                continue;
            }
            return Some(violation);
        }
        None
    }

    fn evaluate(
        &mut self,
        rule: RuleKind,
        message: &InboundMessage,
        config: &AutomodConfig,
    ) -> Option<Violation> {
        match rule {
            RuleKind::Spam => evaluate_spam(message, &config.spam, &mut self.activity),
            RuleKind::Caps => evaluate_caps(&message.content, &config.caps),
            RuleKind::Links => evaluate_links(&message.content, &config.links),
            RuleKind::Badwords => {
                if !self.matcher.is_compiled_for(&config.badwords.words) {
                    self.matcher = BadwordMatcher::compile(&config.badwords.words);
                    tracing::debug!(words = self.matcher.len(), "recompiled blocked-word matcher");
                }
                evaluate_badwords(&message.content, &config.badwords, &self.matcher)
            }
        }
    }

    fn resolve_action(
        &mut self,
        message: &InboundMessage,
        config: &AutomodConfig,
        rule: RuleKind,
        violation: &Violation,
    ) -> (Sanction, Option<StrikeStanding>) {
        let rule_timeout_ms = config.timeout_duration_ms(rule);
        match violation.action {
            ModerationAction::Strike => {
                if !config.strikes_permitted(rule) || message.member.is_none() {
                    return (Sanction::DeleteOnly, None);
                }
                let (record, resolved) = {
                    let mut ledger = self.ledger.lock();
                    let record = ledger.record_violation(
                        &message.author_id,
                        &violation.reason,
                        message.received_at,
                    );
                    let resolved = ledger.runtime().resolve_tier(&config.strikes, record.strikes);
                    (record, resolved)
                };
                let Some(resolved) = resolved else {
                    tracing::warn!(
                        reason_code = strike_codes::AUTOMOD_STRIKE_LADDER_EMPTY.0,
                        "strike ladder has no tiers; deleting only"
                    );
                    return (Sanction::DeleteOnly, None);
                };
                tracing::debug!(
                    reason_code = strike_codes::AUTOMOD_STRIKE_TIER_RESOLVED.0,
                    tier = resolved.tier,
                    strikes = record.strikes,
                    "strike tier resolved"
                );
                let sanction = match resolved.action {
                    ModerationAction::Timeout => Sanction::Timeout {
                        duration_ms: resolved.duration_ms.unwrap_or(rule_timeout_ms),
                    },
                    ModerationAction::Kick => Sanction::Kick,
                    ModerationAction::Ban => Sanction::Ban {
                        delete_message_seconds: STRIKE_BAN_DELETE_MESSAGE_SECONDS,
                    },
                    ModerationAction::Delete | ModerationAction::Strike => Sanction::DeleteOnly,
                };
                let standing = StrikeStanding {
                    strikes: record.strikes,
                    tier: resolved.tier,
                };
                (sanction, Some(standing))
            }
            ModerationAction::Delete => (Sanction::DeleteOnly, None),
            ModerationAction::Timeout => (
                Sanction::Timeout {
                    duration_ms: rule_timeout_ms,
                },
                None,
            ),
            ModerationAction::Kick => (Sanction::Kick, None),
            ModerationAction::Ban => (
                Sanction::Ban {
                    delete_message_seconds: RULE_BAN_DELETE_MESSAGE_SECONDS,
                },
                None,
            ),
        }
    }
}

/// Entry point for hosts that receive messages on several tasks. Planning is
/// serialized on the engine lock; enforcement runs after the lock is released,
/// so a slow platform call never holds up other messages.
pub async fn process_shared<S, P, T>(
    engine: &SharedEngine<S>,
    platform: &P,
    message: &InboundMessage,
    config: &AutomodConfig,
    tickets: &T,
) -> Option<ModerationOutcome>
where
    S: DocumentStore<StrikeDocument>,
    P: ChatPlatform,
    T: TicketDirectory + ?Sized,
{
    let (plan, executor) = {
        let mut engine = engine.lock().await;
        let plan = engine.plan(message, config, tickets)?;
        (plan, engine.executor.clone())
    };
    let enforcement = executor
        .execute(platform, message, &plan, config.log_channel_id.as_ref())
        .await;
    Some(ModerationOutcome { plan, enforcement })
}
