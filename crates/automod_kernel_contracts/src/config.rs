#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{validate_range, validate_text};
use crate::{ChannelId, ContractViolation, RoleId, Validate};

pub const DEFAULT_TIMEOUT_DURATION_MS: u64 = 300_000;
pub const MAX_TIMEOUT_DURATION_MS: u64 = 28 * 24 * 60 * 60 * 1000;
pub const MAX_BADWORD_LEN: usize = 100;

/// Severe slurs and cheating/hacking terms blocked out of the box.
pub const DEFAULT_BLOCKED_WORDS: &[&str] = &[
    "nigger", "nigga", "n1gger", "n1gga", "nigg3r", "nigg4", "n!gger", "n!gga", "nig", "niqqer",
    "niqqa", "nibba", "negr0", "n3gr0", "ngr", "chink", "ch1nk", "gook", "g00k", "kike", "k1ke",
    "coon", "c00n", "spoofer", "sp00fer", "spo0fer", "sp0ofer", "hwid spoof", "cheat", "che4t",
    "ch3at", "cheats", "cheater", "che4ter", "hack", "h4ck", "hacks", "hacker", "h4cker", "hax",
    "haxxor", "aimbot", "a1mbot", "wallhack", "wall hack", "esp hack", "radar hack",
    "triggerbot", "bhop hack", "no recoil", "norecoil", "inject", "1nject", "injector",
    "dll inject", "external cheat", "undetected", "ud cheat", "private cheat", "sellix",
    "cracked",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Delete,
    Timeout,
    Kick,
    Ban,
    /// Route through the strike ladder instead of a fixed sanction.
    Strike,
}

impl ModerationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationAction::Delete => "delete",
            ModerationAction::Timeout => "timeout",
            ModerationAction::Kick => "kick",
            ModerationAction::Ban => "ban",
            ModerationAction::Strike => "strike",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "delete" => Some(ModerationAction::Delete),
            "timeout" => Some(ModerationAction::Timeout),
            "kick" => Some(ModerationAction::Kick),
            "ban" => Some(ModerationAction::Ban),
            "strike" => Some(ModerationAction::Strike),
            _ => None,
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule identity, in arbitration priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    Spam,
    Caps,
    Links,
    Badwords,
}

impl RuleKind {
    pub const PRIORITY: [RuleKind; 4] = [
        RuleKind::Spam,
        RuleKind::Caps,
        RuleKind::Links,
        RuleKind::Badwords,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Spam => "spam",
            RuleKind::Caps => "caps",
            RuleKind::Links => "links",
            RuleKind::Badwords => "badwords",
        }
    }

    /// Rules that stay active inside open ticket channels.
    pub fn applies_in_tickets(self) -> bool {
        matches!(self, RuleKind::Spam | RuleKind::Badwords)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamRuleConfig {
    pub enabled: bool,
    pub message_limit: u32,
    pub time_window_ms: u64,
    pub action: ModerationAction,
    pub timeout_duration_ms: u64,
    pub ignore_roles: BTreeSet<RoleId>,
}

impl Default for SpamRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message_limit: 5,
            time_window_ms: 10_000,
            action: ModerationAction::Timeout,
            timeout_duration_ms: DEFAULT_TIMEOUT_DURATION_MS,
            ignore_roles: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsRuleConfig {
    pub enabled: bool,
    pub percentage: u8,
    pub min_length: u32,
    pub action: ModerationAction,
    pub timeout_duration_ms: u64,
    pub ignore_roles: BTreeSet<RoleId>,
}

impl Default for CapsRuleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            percentage: 70,
            min_length: 10,
            action: ModerationAction::Delete,
            timeout_duration_ms: DEFAULT_TIMEOUT_DURATION_MS,
            ignore_roles: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksRuleConfig {
    pub enabled: bool,
    pub block_invites: bool,
    pub whitelist: Vec<String>,
    pub action: ModerationAction,
    pub timeout_duration_ms: u64,
    pub ignore_roles: BTreeSet<RoleId>,
}

impl Default for LinksRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_invites: true,
            whitelist: Vec::new(),
            action: ModerationAction::Delete,
            timeout_duration_ms: DEFAULT_TIMEOUT_DURATION_MS,
            ignore_roles: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadwordsRuleConfig {
    pub enabled: bool,
    pub words: Vec<String>,
    pub action: ModerationAction,
    pub use_strike_system: bool,
    pub timeout_duration_ms: u64,
    pub ignore_roles: BTreeSet<RoleId>,
}

impl Default for BadwordsRuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            words: DEFAULT_BLOCKED_WORDS.iter().map(|w| w.to_string()).collect(),
            action: ModerationAction::Strike,
            use_strike_system: true,
            timeout_duration_ms: DEFAULT_TIMEOUT_DURATION_MS,
            ignore_roles: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeTier {
    pub action: ModerationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl StrikeTier {
    pub fn timeout(duration_ms: u64) -> Self {
        Self {
            action: ModerationAction::Timeout,
            duration_ms: Some(duration_ms),
        }
    }

    pub fn ban() -> Self {
        Self {
            action: ModerationAction::Ban,
            duration_ms: None,
        }
    }
}

impl Validate for StrikeTier {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.action == ModerationAction::Strike {
            return Err(ContractViolation::InvalidValue {
                field: "strike_tier.action",
                reason: "must be a sanction, not strike",
            });
        }
        match (self.action, self.duration_ms) {
            (ModerationAction::Timeout, None) => Err(ContractViolation::InvalidValue {
                field: "strike_tier.duration_ms",
                reason: "must be present when action=timeout",
            }),
            (ModerationAction::Timeout, Some(ms)) => {
                validate_range("strike_tier.duration_ms", ms, 1_000, MAX_TIMEOUT_DURATION_MS)
            }
            _ => Ok(()),
        }
    }
}

/// Ordered escalation ladder; rung `n` applies to an actor holding `n` active strikes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikePolicy {
    pub tiers: Vec<StrikeTier>,
}

impl Default for StrikePolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                StrikeTier::timeout(300_000),
                StrikeTier::timeout(86_400_000),
                StrikeTier::ban(),
            ],
        }
    }
}

impl Validate for StrikePolicy {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.tiers.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "strike_policy.tiers",
                reason: "must not be empty",
            });
        }
        for tier in &self.tiers {
            tier.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomodConfig {
    pub enabled: bool,
    pub spam: SpamRuleConfig,
    pub caps: CapsRuleConfig,
    pub links: LinksRuleConfig,
    pub badwords: BadwordsRuleConfig,
    pub strikes: StrikePolicy,
    pub log_channel_id: Option<ChannelId>,
    pub immune_roles: BTreeSet<RoleId>,
}

impl Default for AutomodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spam: SpamRuleConfig::default(),
            caps: CapsRuleConfig::default(),
            links: LinksRuleConfig::default(),
            badwords: BadwordsRuleConfig::default(),
            strikes: StrikePolicy::default(),
            log_channel_id: None,
            immune_roles: BTreeSet::new(),
        }
    }
}

impl AutomodConfig {
    pub fn rule_enabled(&self, rule: RuleKind) -> bool {
        match rule {
            RuleKind::Spam => self.spam.enabled,
            RuleKind::Caps => self.caps.enabled,
            RuleKind::Links => self.links.enabled,
            RuleKind::Badwords => self.badwords.enabled,
        }
    }

    pub fn ignore_roles(&self, rule: RuleKind) -> &BTreeSet<RoleId> {
        match rule {
            RuleKind::Spam => &self.spam.ignore_roles,
            RuleKind::Caps => &self.caps.ignore_roles,
            RuleKind::Links => &self.links.ignore_roles,
            RuleKind::Badwords => &self.badwords.ignore_roles,
        }
    }

    pub fn timeout_duration_ms(&self, rule: RuleKind) -> u64 {
        match rule {
            RuleKind::Spam => self.spam.timeout_duration_ms,
            RuleKind::Caps => self.caps.timeout_duration_ms,
            RuleKind::Links => self.links.timeout_duration_ms,
            RuleKind::Badwords => self.badwords.timeout_duration_ms,
        }
    }

    /// Whether a `strike` response from `rule` may enter the strike ladder.
    pub fn strikes_permitted(&self, rule: RuleKind) -> bool {
        match rule {
            RuleKind::Badwords => self.badwords.use_strike_system,
            RuleKind::Spam | RuleKind::Caps | RuleKind::Links => true,
        }
    }
}

impl Validate for AutomodConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_range(
            "automod_config.spam.message_limit",
            u64::from(self.spam.message_limit),
            1,
            1_000,
        )?;
        validate_range(
            "automod_config.spam.time_window_ms",
            self.spam.time_window_ms,
            1,
            3_600_000,
        )?;
        validate_range(
            "automod_config.caps.percentage",
            u64::from(self.caps.percentage),
            1,
            100,
        )?;
        for (field, ms) in [
            ("automod_config.spam.timeout_duration_ms", self.spam.timeout_duration_ms),
            ("automod_config.caps.timeout_duration_ms", self.caps.timeout_duration_ms),
            ("automod_config.links.timeout_duration_ms", self.links.timeout_duration_ms),
            (
                "automod_config.badwords.timeout_duration_ms",
                self.badwords.timeout_duration_ms,
            ),
        ] {
            validate_range(field, ms, 1_000, MAX_TIMEOUT_DURATION_MS)?;
        }
        for domain in &self.links.whitelist {
            validate_text("automod_config.links.whitelist", domain, 253)?;
        }
        for word in &self.badwords.words {
            validate_text("automod_config.badwords.words", word, MAX_BADWORD_LEN)?;
        }
        self.strikes.validate()?;
        if let Some(channel) = &self.log_channel_id {
            channel.validate()?;
        }
        Ok(())
    }
}
