#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

use crate::common::validate_text;
use crate::config::{ModerationAction, RuleKind};
use crate::{ContractViolation, ReasonCodeId, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViolationKind {
    Spam,
    Caps,
    Links,
    Badword,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Spam => "SPAM",
            ViolationKind::Caps => "CAPS",
            ViolationKind::Links => "LINKS",
            ViolationKind::Badword => "BADWORD",
        }
    }

    pub fn rule(self) -> RuleKind {
        match self {
            ViolationKind::Spam => RuleKind::Spam,
            ViolationKind::Caps => RuleKind::Caps,
            ViolationKind::Links => RuleKind::Links,
            ViolationKind::Badword => RuleKind::Badwords,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkFinding {
    Invite,
    NotWhitelisted,
    LinksBlocked,
}

/// One rule's verdict for one message. Consumed by dispatch in the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub reason_code: ReasonCodeId,
    pub reason: String,
    pub action: ModerationAction,
    /// Canonical configured word, never the obfuscated surface form.
    pub matched_text: Option<String>,
    pub link_finding: Option<LinkFinding>,
}

impl Violation {
    pub fn v1(
        kind: ViolationKind,
        reason_code: ReasonCodeId,
        reason: String,
        action: ModerationAction,
        matched_text: Option<String>,
        link_finding: Option<LinkFinding>,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            kind,
            reason_code,
            reason,
            action,
            matched_text,
            link_finding,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for Violation {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_text("violation.reason", &self.reason, 256)?;
        if let Some(matched) = &self.matched_text {
            validate_text("violation.matched_text", matched, 256)?;
        }
        match (self.kind, self.link_finding) {
            (ViolationKind::Links, None) => Err(ContractViolation::InvalidValue {
                field: "violation.link_finding",
                reason: "must be present when kind=LINKS",
            }),
            (ViolationKind::Links, Some(_)) => Ok(()),
            (_, Some(_)) => Err(ContractViolation::InvalidValue {
                field: "violation.link_finding",
                reason: "must be absent unless kind=LINKS",
            }),
            (ViolationKind::Badword, _) if self.matched_text.is_none() => {
                Err(ContractViolation::InvalidValue {
                    field: "violation.matched_text",
                    reason: "must be present when kind=BADWORD",
                })
            }
            _ => Ok(()),
        }
    }
}
