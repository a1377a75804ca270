#![forbid(unsafe_code)]

//! Administrative surface: rule configuration, status and strike management.

use std::fmt;

use thiserror::Error;

use automod_engines::strikes::StrikeLadderConfig;
use automod_kernel_contracts::config::{AutomodConfig, ModerationAction, MAX_BADWORD_LEN};
use automod_kernel_contracts::strike::StrikeRecord;
use automod_kernel_contracts::{ActorId, ChannelId, ContractViolation, RoleId, UnixTimeMs, Validate};
use automod_storage::document::{DocumentStore, StoreError};
use automod_storage::documents::{ConfigDocument, StrikeDocument};

use crate::ledger::SharedLedger;

pub const SPAM_MESSAGES_MIN: u32 = 3;
pub const SPAM_MESSAGES_MAX: u32 = 20;
pub const SPAM_SECONDS_MIN: u32 = 2;
pub const SPAM_SECONDS_MAX: u32 = 30;
pub const CAPS_PERCENT_MIN: u8 = 50;
pub const CAPS_PERCENT_MAX: u8 = 100;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid automod setting: {0}")]
    Invalid(#[from] ContractViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One administrative edit. `None` fields keep their current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleUpdate {
    SetEnabled(bool),
    Spam {
        enabled: Option<bool>,
        message_limit: Option<u32>,
        window_seconds: Option<u32>,
        action: Option<ModerationAction>,
    },
    Caps {
        enabled: Option<bool>,
        percentage: Option<u8>,
        action: Option<ModerationAction>,
    },
    Links {
        enabled: Option<bool>,
        block_invites: Option<bool>,
        action: Option<ModerationAction>,
    },
    AddBadword(String),
    RemoveBadword(String),
    AddWhitelistDomain(String),
    RemoveWhitelistDomain(String),
    SetLogChannel(Option<ChannelId>),
    AddImmuneRole(RoleId),
    RemoveImmuneRole(RoleId),
}

fn check_range<T>(field: &'static str, got: T, min: T, max: T) -> Result<(), ContractViolation>
where
    T: PartialOrd + Into<f64> + Copy,
{
    if got < min || got > max {
        return Err(ContractViolation::InvalidRange {
            field,
            min: min.into(),
            max: max.into(),
            got: got.into(),
        });
    }
    Ok(())
}

fn list_entry(field: &'static str, raw: &str) -> Result<String, ContractViolation> {
    let entry = raw.trim().to_lowercase();
    if entry.is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must not be empty",
        });
    }
    if entry.chars().count() > MAX_BADWORD_LEN {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "too long",
        });
    }
    Ok(entry)
}

/// Applies `update` to `config`. Returns whether anything changed.
pub fn apply_update(config: &mut AutomodConfig, update: RuleUpdate) -> Result<bool, ContractViolation> {
    let before = config.clone();
    match update {
        RuleUpdate::SetEnabled(enabled) => config.enabled = enabled,
        RuleUpdate::Spam {
            enabled,
            message_limit,
            window_seconds,
            action,
        } => {
            if let Some(limit) = message_limit {
                check_range("automod.spam.messages", limit, SPAM_MESSAGES_MIN, SPAM_MESSAGES_MAX)?;
                config.spam.message_limit = limit;
            }
            if let Some(seconds) = window_seconds {
                check_range("automod.spam.seconds", seconds, SPAM_SECONDS_MIN, SPAM_SECONDS_MAX)?;
                config.spam.time_window_ms = u64::from(seconds) * 1_000;
            }
            if let Some(enabled) = enabled {
                config.spam.enabled = enabled;
            }
            if let Some(action) = action {
                config.spam.action = action;
            }
        }
        RuleUpdate::Caps {
            enabled,
            percentage,
            action,
        } => {
            if let Some(pct) = percentage {
                check_range("automod.caps.percentage", pct, CAPS_PERCENT_MIN, CAPS_PERCENT_MAX)?;
                config.caps.percentage = pct;
            }
            if let Some(enabled) = enabled {
                config.caps.enabled = enabled;
            }
            if let Some(action) = action {
                config.caps.action = action;
            }
        }
        RuleUpdate::Links {
            enabled,
            block_invites,
            action,
        } => {
            if let Some(enabled) = enabled {
                config.links.enabled = enabled;
            }
            if let Some(block) = block_invites {
                config.links.block_invites = block;
            }
            if let Some(action) = action {
                config.links.action = action;
            }
        }
        RuleUpdate::AddBadword(raw) => {
            let word = list_entry("automod.badwords.word", &raw)?;
            if !config.badwords.words.iter().any(|w| w.to_lowercase() == word) {
                config.badwords.words.push(word);
            }
            config.badwords.enabled = true;
        }
        RuleUpdate::RemoveBadword(raw) => {
            let word = list_entry("automod.badwords.word", &raw)?;
            config.badwords.words.retain(|w| w.to_lowercase() != word);
        }
        RuleUpdate::AddWhitelistDomain(raw) => {
            let domain = list_entry("automod.links.whitelist", &raw)?;
            if !config.links.whitelist.iter().any(|d| d.to_lowercase() == domain) {
                config.links.whitelist.push(domain);
            }
        }
        RuleUpdate::RemoveWhitelistDomain(raw) => {
            let domain = list_entry("automod.links.whitelist", &raw)?;
            config.links.whitelist.retain(|d| d.to_lowercase() != domain);
        }
        RuleUpdate::SetLogChannel(channel) => config.log_channel_id = channel,
        RuleUpdate::AddImmuneRole(role) => {
            config.immune_roles.insert(role);
        }
        RuleUpdate::RemoveImmuneRole(role) => {
            config.immune_roles.remove(&role);
        }
    }
    config.validate()?;
    Ok(*config != before)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomodStatus {
    pub enabled: bool,
    pub spam_enabled: bool,
    pub spam_limit: u32,
    pub spam_window_ms: u64,
    pub spam_action: ModerationAction,
    pub caps_enabled: bool,
    pub caps_percentage: u8,
    pub caps_action: ModerationAction,
    pub links_enabled: bool,
    pub links_block_invites: bool,
    pub links_action: ModerationAction,
    pub whitelist: Vec<String>,
    pub badwords_enabled: bool,
    pub badword_count: usize,
    pub badwords_action: ModerationAction,
    pub log_channel: Option<ChannelId>,
    pub immune_roles: Vec<RoleId>,
    pub tracked_strike_actors: usize,
}

impl AutomodStatus {
    pub fn of(config: &AutomodConfig, tracked_strike_actors: usize) -> Self {
        Self {
            enabled: config.enabled,
            spam_enabled: config.spam.enabled,
            spam_limit: config.spam.message_limit,
            spam_window_ms: config.spam.time_window_ms,
            spam_action: config.spam.action,
            caps_enabled: config.caps.enabled,
            caps_percentage: config.caps.percentage,
            caps_action: config.caps.action,
            links_enabled: config.links.enabled,
            links_block_invites: config.links.block_invites,
            links_action: config.links.action,
            whitelist: config.links.whitelist.clone(),
            badwords_enabled: config.badwords.enabled,
            badword_count: config.badwords.words.len(),
            badwords_action: config.badwords.action,
            log_channel: config.log_channel_id.clone(),
            immune_roles: config.immune_roles.iter().cloned().collect(),
            tracked_strike_actors,
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on "
    } else {
        "off"
    }
}

impl fmt::Display for AutomodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "automod: {}",
            if self.enabled { "enabled" } else { "disabled" }
        )?;
        writeln!(
            f,
            "  spam     [{}] {} msgs/{}s -> {}",
            on_off(self.spam_enabled),
            self.spam_limit,
            self.spam_window_ms as f64 / 1_000.0,
            self.spam_action
        )?;
        writeln!(
            f,
            "  caps     [{}] {}% -> {}",
            on_off(self.caps_enabled),
            self.caps_percentage,
            self.caps_action
        )?;
        writeln!(
            f,
            "  links    [{}] {} -> {}",
            on_off(self.links_enabled),
            if self.links_block_invites {
                "block invites"
            } else {
                "allow invites"
            },
            self.links_action
        )?;
        writeln!(
            f,
            "  badwords [{}] {} words -> {}",
            on_off(self.badwords_enabled),
            self.badword_count,
            self.badwords_action
        )?;
        match &self.log_channel {
            Some(channel) => writeln!(f, "  log channel: {channel}")?,
            None => writeln!(f, "  log channel: not set")?,
        }
        if self.immune_roles.is_empty() {
            writeln!(f, "  immune roles: none")?;
        } else {
            let roles: Vec<&str> = self.immune_roles.iter().map(RoleId::as_str).collect();
            writeln!(f, "  immune roles: {}", roles.join(", "))?;
        }
        if !self.whitelist.is_empty() {
            writeln!(f, "  whitelisted domains: {}", self.whitelist.join(", "))?;
        }
        write!(f, "  actors with strikes: {}", self.tracked_strike_actors)
    }
}

/// Configuration document plus strike ledger, for surfaces that manage
/// automod outside the message pipeline. Built with [`AutomodAdmin::with_ledger`]
/// it shares the running engine's ledger, so clears take effect immediately.
#[derive(Debug)]
pub struct AutomodAdmin<C, S>
where
    C: DocumentStore<ConfigDocument>,
    S: DocumentStore<StrikeDocument>,
{
    config_store: C,
    doc: ConfigDocument,
    ledger: SharedLedger<S>,
}

impl<C, S> AutomodAdmin<C, S>
where
    C: DocumentStore<ConfigDocument>,
    S: DocumentStore<StrikeDocument>,
{
    pub fn open(config_store: C, strike_store: S) -> Self {
        Self::with_ledger(
            config_store,
            SharedLedger::open(strike_store, StrikeLadderConfig::mvp_v1()),
        )
    }

    pub fn with_ledger(config_store: C, ledger: SharedLedger<S>) -> Self {
        let doc = config_store.load_or_default();
        Self {
            config_store,
            doc,
            ledger,
        }
    }

    pub fn config(&self) -> &AutomodConfig {
        &self.doc.automod
    }

    /// Validates and persists one edit. A rejected edit leaves the document untouched.
    pub fn configure(&mut self, update: RuleUpdate) -> Result<bool, AdminError> {
        let mut next = self.doc.automod.clone();
        let changed = apply_update(&mut next, update)?;
        if changed {
            let mut doc = self.doc.clone();
            doc.automod = next;
            self.config_store.save(&doc)?;
            self.doc = doc;
        }
        Ok(changed)
    }

    pub fn status(&self) -> AutomodStatus {
        AutomodStatus::of(&self.doc.automod, self.ledger.lock().tracked_actors())
    }

    pub fn strikes(&mut self, actor: &ActorId, now: UnixTimeMs) -> StrikeRecord {
        self.ledger.lock().get(actor, now)
    }

    pub fn clear_strikes(&mut self, actor: &ActorId) -> bool {
        self.ledger.lock().clear(actor)
    }

    pub fn clear_all_strikes(&mut self) -> usize {
        self.ledger.lock().clear_all()
    }

    pub fn ledger(&self) -> &SharedLedger<S> {
        &self.ledger
    }
}
