#![forbid(unsafe_code)]

mod support;

use automod_kernel_contracts::config::{AutomodConfig, ModerationAction};
use automod_kernel_contracts::enforcement::{Sanction, StrikeStanding, STRIKE_BAN_DELETE_MESSAGE_SECONDS};
use automod_kernel_contracts::violation::ViolationKind;
use std::sync::Arc;
use std::time::Duration;

use automod_kernel_contracts::UnixTimeMs;
use automod_os::admin::AutomodAdmin;
use automod_os::dispatch::process_shared;
use automod_os::platform::NoTickets;
use automod_storage::document::MemoryStore;
use automod_storage::documents::ConfigDocument;
use tokio::sync::Notify;

use support::{author, engine, log_channel, message, other_author, Call, RecordingPlatform, T0};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn config() -> AutomodConfig {
    AutomodConfig {
        log_channel_id: Some(log_channel()),
        ..AutomodConfig::default()
    }
}

#[tokio::test]
async fn at_pipeline_badword_01_leet_cheat_earns_first_strike_and_short_timeout() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();
    assert_eq!(engine.ledger().get(&author(), UnixTimeMs(T0)).strikes, 0);

    let out = engine
        .process(&platform, &message(1, "ch3at codes here", 0), &cfg, &NoTickets)
        .await
        .unwrap();

    assert_eq!(out.plan.violation.kind, ViolationKind::Badword);
    assert_eq!(out.plan.violation.action, ModerationAction::Strike);
    assert_eq!(out.plan.strike, Some(StrikeStanding { strikes: 1, tier: 1 }));
    assert_eq!(out.plan.sanction, Sanction::Timeout { duration_ms: 300_000 });
    assert_eq!(engine.ledger().get(&author(), UnixTimeMs(T0)).strikes, 1);
    assert_eq!(engine.ledger().store().save_count(), 1);

    let calls = platform.calls();
    assert!(calls.iter().any(|c| matches!(
        c,
        Call::Timeout(_, 300_000, reason) if reason == "Automod Strike 1: Contains prohibited content"
    )));
    assert!(!calls.iter().any(|c| matches!(c, Call::Ban(..))));

    let notice = calls
        .iter()
        .find_map(|c| match c {
            Call::Notice(_, notice) => Some(notice),
            _ => None,
        })
        .unwrap();
    assert_eq!(notice.guild_name, "Test Guild");
    assert_eq!(notice.strike_count.as_deref(), Some("1/3"));
    assert_eq!(notice.ladder.len(), 3);
    assert_eq!(notice.footer, Some("Strikes reset after 30 days"));

    let report = calls
        .iter()
        .find_map(|c| match c {
            Call::Report(_, report) => Some(report),
            _ => None,
        })
        .unwrap();
    assert_eq!(report.content.as_deref(), Some("[CENSORED] codes here"));
    assert!(!report.content.as_deref().unwrap_or_default().contains("ch3at"));
}

#[tokio::test]
async fn at_pipeline_badword_02_third_strike_bans_with_week_of_history_purged() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();
    for (seq, offset) in [(1, 0), (2, DAY_MS), (3, 2 * DAY_MS)] {
        engine
            .process(&platform, &message(seq, "selling a hack", offset), &cfg, &NoTickets)
            .await
            .unwrap();
    }
    assert!(platform.calls().iter().any(|c| matches!(
        c,
        Call::Ban(_, secs, reason)
            if *secs == STRIKE_BAN_DELETE_MESSAGE_SECONDS
                && reason == "Automod Strike 3: Contains prohibited content"
    )));
}

#[tokio::test]
async fn at_pipeline_badword_03_strikes_decay_after_thirty_days() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();
    engine
        .process(&platform, &message(1, "cheat", 0), &cfg, &NoTickets)
        .await
        .unwrap();
    let out = engine
        .process(&platform, &message(2, "cheat", 31 * DAY_MS), &cfg, &NoTickets)
        .await
        .unwrap();
    assert_eq!(out.plan.strike, Some(StrikeStanding { strikes: 1, tier: 1 }));
}

#[tokio::test]
async fn at_pipeline_badword_04_shared_engine_serializes_processing() {
    let platform = RecordingPlatform::new();
    let shared = engine().shared();
    let cfg = config();
    let first = process_shared(&shared, &platform, &message(1, "cheat", 0), &cfg, &NoTickets)
        .await
        .unwrap();
    let second = process_shared(&shared, &platform, &message(2, "cheat", 1_000), &cfg, &NoTickets)
        .await
        .unwrap();
    assert_eq!(first.plan.strike.map(|s| s.strikes), Some(1));
    assert_eq!(second.plan.strike.map(|s| s.strikes), Some(2));
    assert_eq!(shared.lock().await.ledger().tracked_actors(), 1);
}

#[tokio::test]
async fn at_pipeline_badword_05_clean_message_touches_nothing() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let out = engine
        .process(&platform, &message(1, "good game everyone", 0), &config(), &NoTickets)
        .await;
    assert!(out.is_none());
    assert!(platform.calls().is_empty());
    assert_eq!(engine.ledger().tracked_actors(), 0);
}

#[tokio::test]
async fn at_pipeline_badword_06_admin_clear_is_seen_by_the_running_engine() {
    let platform = RecordingPlatform::new();
    let mut engine = engine();
    let cfg = config();
    let mut admin: AutomodAdmin<MemoryStore<ConfigDocument>, _> =
        AutomodAdmin::with_ledger(MemoryStore::new(), engine.shared_ledger());

    engine
        .process(&platform, &message(1, "cheat", 0), &cfg, &NoTickets)
        .await
        .unwrap();
    assert_eq!(admin.strikes(&author(), UnixTimeMs(T0)).strikes, 1);
    assert!(admin.clear_strikes(&author()));

    let out = engine
        .process(&platform, &message(2, "cheat", 1_000), &cfg, &NoTickets)
        .await
        .unwrap();
    assert_eq!(out.plan.strike, Some(StrikeStanding { strikes: 1, tier: 1 }));
    assert_eq!(engine.ledger().get(&author(), UnixTimeMs(T0 + 1_000)).strikes, 1);
}

#[tokio::test]
async fn at_pipeline_badword_07_slow_enforcement_does_not_block_other_messages() {
    let gate = Arc::new(Notify::new());
    let platform = RecordingPlatform::new().gate_timeouts(Arc::clone(&gate));
    let shared = engine().shared();
    let cfg = config();
    let violating = message(1, "cheat", 0);
    let mut clean = message(2, "good game everyone", 10);
    clean.author_id = other_author();

    let both = async {
        tokio::join!(
            process_shared(&shared, &platform, &violating, &cfg, &NoTickets),
            async {
                tokio::task::yield_now().await;
                let out = process_shared(&shared, &platform, &clean, &cfg, &NoTickets).await;
                gate.notify_one();
                out
            }
        )
    };
    let (violation, clean_out) = tokio::time::timeout(Duration::from_secs(5), both)
        .await
        .expect("clean message must not wait on the gated timeout");

    assert!(clean_out.is_none());
    let violation = violation.unwrap();
    assert_eq!(violation.plan.strike, Some(StrikeStanding { strikes: 1, tier: 1 }));
    assert!(platform.calls().iter().any(|c| matches!(c, Call::Timeout(..))));
}
