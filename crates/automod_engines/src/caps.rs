#![forbid(unsafe_code)]

use automod_kernel_contracts::config::CapsRuleConfig;
use automod_kernel_contracts::violation::{Violation, ViolationKind};

pub mod reason_codes {
    use automod_kernel_contracts::ReasonCodeId;

    // Caps rule reason-code namespace.
    pub const AUTOMOD_CAPS_RATIO_EXCEEDED: ReasonCodeId = ReasonCodeId(0x414D_0201);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapsRatio {
    pub letters: usize,
    pub uppercase: usize,
}

impl CapsRatio {
    pub fn of(content: &str) -> Self {
        let mut letters = 0;
        let mut uppercase = 0;
        for c in content.chars().filter(char::is_ascii_alphabetic) {
            letters += 1;
            if c.is_ascii_uppercase() {
                uppercase += 1;
            }
        }
        Self { letters, uppercase }
    }

    pub fn percent_rounded(self) -> usize {
        if self.letters == 0 {
            return 0;
        }
        (self.uppercase * 200 + self.letters) / (self.letters * 2)
    }

    /// `uppercase / letters * 100 >= percentage`, in integers.
    pub fn reaches(self, percentage: u8) -> bool {
        self.letters > 0 && self.uppercase * 100 >= usize::from(percentage) * self.letters
    }
}

pub fn evaluate_caps(content: &str, config: &CapsRuleConfig) -> Option<Violation> {
    if !config.enabled || content.chars().count() < config.min_length as usize {
        return None;
    }
    let ratio = CapsRatio::of(content);
    if !ratio.reaches(config.percentage) {
        return None;
    }

    let reason = format!(
        "{}% caps (limit: {}%)",
        ratio.percent_rounded(),
        config.percentage
    );
    Violation::v1(
        ViolationKind::Caps,
        reason_codes::AUTOMOD_CAPS_RATIO_EXCEEDED,
        reason,
        config.action,
        None,
        None,
    )
    .map_err(|err| tracing::warn!(%err, "caps violation failed contract validation"))
    .ok()
}
