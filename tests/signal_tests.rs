//! Reload signal protocol: coalescing, Full-over-Incremental priority and
//! fail-open acknowledgement, driven through a real `FileSignaler` and the
//! `ReloadService` consumer.

mod common;

use std::sync::Arc;

use common::*;
use tempfile::tempdir;

use shopfront_bot::services::metrics::Metrics;
use shopfront_bot::services::notify::AdminNotifier;
use shopfront_bot::services::posts::PostScheduler;
use shopfront_bot::services::signal::{FileSignaler, SignalKind, Signaler};
use shopfront_bot::services::sync::ReloadService;

struct SignalHarness {
    harness: TestHarness,
    signaler: Arc<FileSignaler>,
    service: ReloadService,
    metrics: Metrics,
    _signal_dir: tempfile::TempDir,
}

async fn signal_setup() -> SignalHarness {
    let harness = setup().await;
    let signal_dir = tempdir().expect("Failed to create signal dir");
    let signaler = Arc::new(FileSignaler::new(signal_dir.path()));
    let metrics = Metrics::new();

    let posts = Arc::new(PostScheduler::new(
        harness.db.clone(),
        harness.messenger.clone(),
        metrics.clone(),
        None,
    ));
    let notifier = AdminNotifier::new(harness.messenger.clone(), harness.db.clone());

    let service = ReloadService::new(
        signaler.clone(),
        harness.db.clone(),
        harness.cache.clone(),
        posts,
        notifier,
        metrics.clone(),
    );

    SignalHarness {
        harness,
        signaler,
        service,
        metrics,
        _signal_dir: signal_dir,
    }
}

#[tokio::test]
async fn test_idle_poll_does_nothing() {
    let s = signal_setup().await;
    s.service.tick().await.unwrap();
    assert_eq!(s.metrics.snapshot().reloads_applied, 0);
}

#[tokio::test]
async fn test_incremental_reload_refreshes_cache() {
    let s = signal_setup().await;
    seed_category(&s.harness.db, "Электроника", "📱").await;

    assert!(s.harness.cache.categories().is_empty());

    s.signaler.raise(SignalKind::Incremental).unwrap();
    s.service.tick().await.unwrap();

    assert_eq!(s.harness.cache.categories().len(), 1);
    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
    // acknowledged by deletion
    assert_eq!(s.signaler.poll().unwrap(), None);
}

#[tokio::test]
async fn test_n_raises_one_reload_latest_timestamp_applied() {
    let s = signal_setup().await;

    s.signaler.raise(SignalKind::Incremental).unwrap();
    s.signaler.raise(SignalKind::Incremental).unwrap();
    s.signaler.raise(SignalKind::Incremental).unwrap();
    let pending = s.signaler.poll().unwrap().unwrap();

    s.service.tick().await.unwrap();
    // several ticks after one batch of raises still mean exactly one reload
    s.service.tick().await.unwrap();
    s.service.tick().await.unwrap();

    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
    // last applied time equals the latest raise
    assert_eq!(s.service.last_applied().await, pending.raised_at);
}

#[tokio::test]
async fn test_full_wins_over_incremental_and_clears_both() {
    let s = signal_setup().await;

    s.signaler.raise(SignalKind::Full).unwrap();
    s.signaler.raise(SignalKind::Incremental).unwrap();

    s.service.tick().await.unwrap();

    // exactly one reload happened, and both files are gone
    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
    assert_eq!(s.signaler.poll().unwrap(), None);

    s.service.tick().await.unwrap();
    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
}

#[tokio::test]
async fn test_stale_incremental_is_acked_without_reload() {
    let s = signal_setup().await;

    s.signaler.raise(SignalKind::Incremental).unwrap();
    s.service.tick().await.unwrap();
    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
    let applied = s.service.last_applied().await;

    // Re-create a signal file carrying an older timestamp than the applied
    // one: it must be consumed but not applied.
    std::fs::write(
        s._signal_dir.path().join("data_update_flag.txt"),
        format!("{}", applied - 100.0),
    )
    .unwrap();

    s.service.tick().await.unwrap();
    assert_eq!(s.metrics.snapshot().reloads_applied, 1);
    assert_eq!(s.signaler.poll().unwrap(), None);
    assert_eq!(s.service.last_applied().await, applied);
}

#[tokio::test]
async fn test_failed_reload_still_acks_signal() {
    let s = signal_setup().await;

    // Poison the reload: the cache query will fail
    sqlx::query("DROP TABLE categories")
        .execute(&s.harness.db.pool)
        .await
        .unwrap();

    s.signaler.raise(SignalKind::Full).unwrap();
    s.service.tick().await.unwrap();

    // fail-open: the signal file was deleted anyway, no reload loop
    assert_eq!(s.signaler.poll().unwrap(), None);
    assert_eq!(s.metrics.snapshot().reloads_applied, 0);
}

#[tokio::test]
async fn test_full_reload_rebuilds_post_timetable_and_notifies_admins() {
    let s = signal_setup().await;
    seed_admin(&s.harness.db, 2002, "Boss").await;

    sqlx::query(
        "INSERT INTO scheduled_posts (title, content, time_morning, target_audience) \
         VALUES ('Акция', 'Скидки сегодня', '09:00', 'all')",
    )
    .execute(&s.harness.db.pool)
    .await
    .unwrap();

    s.signaler.raise(SignalKind::Full).unwrap();
    s.service.tick().await.unwrap();

    // reload summary reached the admin and mentions the loaded post
    let texts = s.harness.messenger.messages_to(2002);
    assert!(texts.iter().any(|t| t.contains("Данные обновлены")));
    assert!(texts.iter().any(|t| t.contains("Автопостов: 1")));
}
