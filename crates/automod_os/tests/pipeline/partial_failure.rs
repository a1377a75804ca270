#![forbid(unsafe_code)]

mod support;

use automod_kernel_contracts::config::{AutomodConfig, ModerationAction};
use automod_kernel_contracts::enforcement::StepOutcome;
use automod_os::platform::{NoTickets, PlatformError};

use support::{engine, log_channel, message, Call, RecordingPlatform};

fn links_kick_config() -> AutomodConfig {
    let mut cfg = AutomodConfig {
        log_channel_id: Some(log_channel()),
        ..AutomodConfig::default()
    };
    cfg.links.action = ModerationAction::Kick;
    cfg
}

#[tokio::test]
async fn at_pipeline_partial_01_failed_sanction_does_not_stop_notice_or_report() {
    let platform = RecordingPlatform::new().fail("kick", PlatformError::PermissionDenied);
    let mut engine = engine();
    let out = engine
        .process(
            &platform,
            &message(1, "https://evil.example/x", 0),
            &links_kick_config(),
            &NoTickets,
        )
        .await
        .unwrap();

    assert!(out.enforcement.message_deleted());
    assert_eq!(
        out.enforcement.member_sanctioned,
        StepOutcome::Failed("permission denied".to_string())
    );
    assert!(out.enforcement.user_notified());
    assert!(out.enforcement.logged());
    assert_eq!(out.enforcement.failed_steps(), 1);
}

#[tokio::test]
async fn at_pipeline_partial_02_already_deleted_message_counts_as_done() {
    let platform = RecordingPlatform::new().fail("delete", PlatformError::NotFound);
    let mut engine = engine();
    let out = engine
        .process(
            &platform,
            &message(1, "https://evil.example/x", 0),
            &links_kick_config(),
            &NoTickets,
        )
        .await
        .unwrap();
    assert!(out.enforcement.message_deleted());
    assert!(platform.calls().iter().any(|c| matches!(c, Call::Kick(..))));
}

#[tokio::test]
async fn at_pipeline_partial_03_closed_dms_and_rate_limited_log_are_recorded_not_raised() {
    let platform = RecordingPlatform::new()
        .fail("notice", PlatformError::Unavailable("dms closed".to_string()))
        .fail("report", PlatformError::RateLimited { retry_after_ms: 500 });
    let mut engine = engine();
    let out = engine
        .process(&platform, &message(1, "cheat", 0), &links_kick_config(), &NoTickets)
        .await
        .unwrap();
    assert!(out.enforcement.message_deleted());
    assert!(out.enforcement.member_sanctioned());
    assert!(out.enforcement.user_notified.is_failed());
    assert!(out.enforcement.logged.is_failed());
    assert_eq!(engine.ledger().tracked_actors(), 1);
}

#[tokio::test]
async fn at_pipeline_partial_04_departed_member_skips_sanction_and_strike() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let mut m = message(1, "cheat", 0);
    m.member = None;
    let out = engine
        .process(&platform, &m, &links_kick_config(), &NoTickets)
        .await
        .unwrap();
    assert!(out.enforcement.message_deleted());
    assert!(matches!(out.enforcement.member_sanctioned, StepOutcome::Skipped(_)));
    assert!(out.plan.strike.is_none());
    assert_eq!(engine.ledger().tracked_actors(), 0);
}
