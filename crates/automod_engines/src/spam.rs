#![forbid(unsafe_code)]

use automod_kernel_contracts::config::SpamRuleConfig;
use automod_kernel_contracts::message::InboundMessage;
use automod_kernel_contracts::violation::{Violation, ViolationKind};

use crate::activity::ActivityTracker;

pub mod reason_codes {
    use automod_kernel_contracts::ReasonCodeId;

    // Spam rule reason-code namespace.
    pub const AUTOMOD_SPAM_RATE_EXCEEDED: ReasonCodeId = ReasonCodeId(0x414D_0101);
}

/// Touches the author's window and flags the message once the in-window count
/// reaches the limit. The triggering message counts toward the limit.
///
/// A disabled rule leaves the tracker untouched.
pub fn evaluate_spam(
    message: &InboundMessage,
    config: &SpamRuleConfig,
    activity: &mut ActivityTracker,
) -> Option<Violation> {
    if !config.enabled {
        return None;
    }
    let count = activity.touch(
        &message.author_id,
        message.received_at,
        config.time_window_ms,
    );
    if count < config.message_limit.max(1) as usize {
        return None;
    }

    let reason = format!(
        "Sent {count} messages in {} seconds",
        window_seconds(config.time_window_ms)
    );
    match Violation::v1(
        ViolationKind::Spam,
        reason_codes::AUTOMOD_SPAM_RATE_EXCEEDED,
        reason,
        config.action,
        None,
        None,
    ) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(%err, "spam violation failed contract validation");
            None
        }
    }
}

fn window_seconds(window_ms: u64) -> String {
    if window_ms % 1_000 == 0 {
        (window_ms / 1_000).to_string()
    } else {
        format!("{}", window_ms as f64 / 1_000.0)
    }
}
