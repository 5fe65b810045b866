//! Scheduled post timetable: once-per-slot-per-day firing, audience
//! resolution and fan-out statistics.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::*;

use shopfront_bot::database::models::ScheduledPost;
use shopfront_bot::services::metrics::Metrics;
use shopfront_bot::services::posts::PostScheduler;

async fn scheduler_with_channel(h: &TestHarness, channel_id: Option<i64>) -> Arc<PostScheduler> {
    let scheduler = Arc::new(PostScheduler::new(
        h.db.clone(),
        h.messenger.clone(),
        Metrics::new(),
        channel_id,
    ));
    scheduler.reload().await.expect("Failed to load timetable");
    scheduler
}

async fn seed_post(h: &TestHarness, morning: Option<&str>, audience: &str) -> i64 {
    sqlx::query(
        "INSERT INTO scheduled_posts (title, content, time_morning, target_audience) \
         VALUES ('Акция', 'Скидки сегодня', ?, ?)",
    )
    .bind(morning)
    .bind(audience)
    .execute(&h.db.pool)
    .await
    .expect("Failed to seed post")
    .last_insert_rowid()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
}

#[tokio::test]
async fn test_fires_at_most_once_per_day_despite_repeated_ticks() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    let post_id = seed_post(&h, Some("09:00"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;

    // The 30s ticker observes 09:00 on two consecutive ticks
    scheduler.tick("09:00", day(5)).await.unwrap();
    scheduler.tick("09:00", day(5)).await.unwrap();
    scheduler.tick("09:01", day(5)).await.unwrap();

    assert_eq!(h.messenger.messages_to(1001).len(), 1);

    // One statistics row for the single fire
    let stats = shopfront_bot::database::models::PostStatistic::for_post(&h.db.pool, post_id)
        .await
        .unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].time_period, "morning");
    assert_eq!(stats[0].sent_count, 1);
    assert_eq!(stats[0].error_count, 0);
}

#[tokio::test]
async fn test_fires_again_next_day() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    seed_post(&h, Some("09:00"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;

    scheduler.tick("09:00", day(5)).await.unwrap();
    scheduler.tick("09:00", day(6)).await.unwrap();

    assert_eq!(h.messenger.messages_to(1001).len(), 2);
}

#[tokio::test]
async fn test_does_not_fire_on_other_minutes() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    seed_post(&h, Some("09:00"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;

    scheduler.tick("08:59", day(5)).await.unwrap();
    scheduler.tick("09:01", day(5)).await.unwrap();

    assert!(h.messenger.messages_to(1001).is_empty());
}

#[tokio::test]
async fn test_reload_preserves_day_guard() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    seed_post(&h, Some("09:00"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;

    scheduler.tick("09:00", day(5)).await.unwrap();
    // An admin edit triggers a timetable reload within the same minute
    scheduler.reload().await.unwrap();
    scheduler.tick("09:00", day(5)).await.unwrap();

    assert_eq!(h.messenger.messages_to(1001).len(), 1);
}

#[tokio::test]
async fn test_channel_audience_goes_to_channel_chat() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    seed_post(&h, Some("10:30"), "channel").await;
    let scheduler = scheduler_with_channel(&h, Some(-100500)).await;

    scheduler.tick("10:30", day(5)).await.unwrap();

    assert_eq!(h.messenger.messages_to(-100500).len(), 1);
    assert!(h.messenger.messages_to(1001).is_empty());
}

#[tokio::test]
async fn test_admins_excluded_from_all_audience() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    seed_admin(&h.db, 2002, "Boss").await;

    let ids = ScheduledPost::audience_telegram_ids(&h.db.pool, "all")
        .await
        .unwrap();
    assert_eq!(ids, vec![1001]);
}

#[tokio::test]
async fn test_vip_audience_requires_spending_threshold() {
    let h = setup().await;
    let alice = seed_user(&h.db, 1001, "Alice").await;
    let bob = seed_user(&h.db, 1002, "Bob").await;

    for (user, amount) in [(&alice, 600.0), (&bob, 100.0)] {
        sqlx::query(
            "INSERT INTO orders (user_id, total_amount, delivery_address, payment_method) \
             VALUES (?, ?, 'адрес', 'cash')",
        )
        .bind(user.id)
        .bind(amount)
        .execute(&h.db.pool)
        .await
        .unwrap();
    }

    let ids = ScheduledPost::audience_telegram_ids(&h.db.pool, "vip")
        .await
        .unwrap();
    assert_eq!(ids, vec![1001]);
}

#[tokio::test]
async fn test_unknown_audience_resolves_to_nobody() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;

    let ids = ScheduledPost::audience_telegram_ids(&h.db.pool, "martians")
        .await
        .unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_invalid_slot_time_is_skipped_on_load() {
    let h = setup().await;
    seed_post(&h, Some("25:99"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;

    assert_eq!(scheduler.job_count().await, 0);
}

#[tokio::test]
async fn test_inactive_posts_stop_firing_after_reload() {
    let h = setup().await;
    seed_user(&h.db, 1001, "Alice").await;
    let post_id = seed_post(&h, Some("09:00"), "all").await;
    let scheduler = scheduler_with_channel(&h, None).await;
    assert_eq!(scheduler.job_count().await, 1);

    sqlx::query("UPDATE scheduled_posts SET is_active = 0 WHERE id = ?")
        .bind(post_id)
        .execute(&h.db.pool)
        .await
        .unwrap();

    // Deactivated rows stop firing only after the next reload
    scheduler.reload().await.unwrap();
    assert_eq!(scheduler.job_count().await, 0);

    scheduler.tick("09:00", day(5)).await.unwrap();
    assert!(h.messenger.messages_to(1001).is_empty());
}
