#![forbid(unsafe_code)]

mod support;

use automod_kernel_contracts::config::AutomodConfig;
use automod_kernel_contracts::enforcement::{Sanction, StepOutcome};
use automod_kernel_contracts::violation::ViolationKind;
use automod_os::platform::NoTickets;
use automod_storage::document::DocumentStore;

use support::{author, engine, log_channel, message, Call, RecordingPlatform};

fn config() -> AutomodConfig {
    AutomodConfig {
        log_channel_id: Some(log_channel()),
        ..AutomodConfig::default()
    }
}

#[tokio::test]
async fn at_pipeline_spam_01_fifth_message_in_window_is_deleted_timed_out_and_logged() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();

    for seq in 0..4 {
        let out = engine
            .process(&platform, &message(seq, "hello there", seq * 1_000), &cfg, &NoTickets)
            .await;
        assert!(out.is_none());
    }
    let out = engine
        .process(&platform, &message(4, "hello there", 4_000), &cfg, &NoTickets)
        .await
        .unwrap();

    assert_eq!(out.plan.violation.kind, ViolationKind::Spam);
    assert_eq!(out.plan.violation.reason, "Sent 5 messages in 10 seconds");
    assert_eq!(out.plan.sanction, Sanction::Timeout { duration_ms: 300_000 });
    assert!(out.plan.strike.is_none());
    assert!(out.enforcement.message_deleted());
    assert!(out.enforcement.member_sanctioned());
    assert!(out.enforcement.logged());
    assert_eq!(out.enforcement.failed_steps(), 0);

    let calls = platform.calls();
    assert!(matches!(&calls[0], Call::Delete(id) if id.as_str() == "msg_4"));
    assert!(matches!(
        &calls[1],
        Call::Timeout(actor, 300_000, reason)
            if *actor == author() && reason == "Automod: Sent 5 messages in 10 seconds"
    ));
    let report = calls
        .iter()
        .find_map(|c| match c {
            Call::Report(channel, report) if *channel == log_channel() => Some(report),
            _ => None,
        })
        .unwrap();
    assert_eq!(report.violation, ViolationKind::Spam);
    assert_eq!(report.moderator, "automated system");

    assert_eq!(engine.ledger().tracked_actors(), 0);
    assert_eq!(engine.ledger().store().save_count(), 0);
}

#[tokio::test]
async fn at_pipeline_spam_02_slow_messages_never_trigger() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();
    for seq in 0..12 {
        let out = engine
            .process(&platform, &message(seq, "hello", seq * 2_600), &cfg, &NoTickets)
            .await;
        assert!(out.is_none());
    }
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn at_pipeline_spam_03_no_log_channel_skips_the_report() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = AutomodConfig::default();
    for seq in 0..4 {
        engine
            .process(&platform, &message(seq, "hi", seq * 10), &cfg, &NoTickets)
            .await;
    }
    let out = engine
        .process(&platform, &message(4, "hi", 40), &cfg, &NoTickets)
        .await
        .unwrap();
    assert_eq!(
        out.enforcement.logged,
        StepOutcome::Skipped("no log channel configured")
    );
    assert!(!platform
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Report(..))));
    assert!(engine.ledger().store().load().unwrap().is_none());
}
