//! Scheduled post timetable.
//!
//! Each active post contributes one job per configured time-of-day slot.
//! A 30-second ticker compares the current wall-clock minute with each
//! job's slot time; `last_fired` guards the job so it fires at most once
//! per slot per calendar day even though several ticks observe the same
//! minute. A minute missed while the process is down is skipped, not
//! caught up.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::bot::messenger::Messenger;
use crate::database::connection::DatabaseManager;
use crate::database::models::{PostStatistic, ScheduledPost};
use crate::services::metrics::Metrics;
use crate::utils::validation::validate_slot_time;

pub const TICK_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Morning,
    Afternoon,
    Evening,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Afternoon => "afternoon",
            Slot::Evening => "evening",
        }
    }

    fn greeting(&self) -> (&'static str, &'static str) {
        match self {
            Slot::Morning => ("🌅", "Доброе утро"),
            Slot::Afternoon => ("☀️", "Добрый день"),
            Slot::Evening => ("🌆", "Добрый вечер"),
        }
    }
}

#[derive(Debug, Clone)]
struct PostJob {
    post_id: i64,
    slot: Slot,
    /// Wall-clock fire time, `HH:MM`.
    fire_at: String,
    /// Calendar date of the last fire; guards one-fire-per-slot-per-day.
    last_fired: Option<NaiveDate>,
}

pub struct PostScheduler {
    db: DatabaseManager,
    messenger: Arc<dyn Messenger>,
    metrics: Metrics,
    /// Chat id for `channel`-audience posts; such posts are skipped when
    /// unset.
    channel_id: Option<i64>,
    jobs: Mutex<Vec<PostJob>>,
}

impl PostScheduler {
    pub fn new(
        db: DatabaseManager,
        messenger: Arc<dyn Messenger>,
        metrics: Metrics,
        channel_id: Option<i64>,
    ) -> Self {
        Self {
            db,
            messenger,
            metrics,
            channel_id,
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Rebuilds the job table from `scheduled_posts`. `last_fired` marks
    /// are carried over for jobs that survive the reload so a reload within
    /// the fire minute can not double-fire. Returns the number of loaded
    /// jobs.
    pub async fn reload(&self) -> Result<usize> {
        let posts = ScheduledPost::all_active(&self.db.pool).await?;

        let mut next: Vec<PostJob> = Vec::new();
        for post in &posts {
            let slots = [
                (Slot::Morning, &post.time_morning),
                (Slot::Afternoon, &post.time_afternoon),
                (Slot::Evening, &post.time_evening),
            ];
            for (slot, time) in slots {
                let Some(time) = time else { continue };
                if !validate_slot_time(time) {
                    warn!(
                        "Post {} has invalid {} time '{}', slot skipped",
                        post.id,
                        slot.as_str(),
                        time
                    );
                    continue;
                }
                next.push(PostJob {
                    post_id: post.id,
                    slot,
                    fire_at: time.clone(),
                    last_fired: None,
                });
            }
        }

        let mut jobs = self.jobs.lock().await;
        for job in next.iter_mut() {
            if let Some(old) = jobs
                .iter()
                .find(|j| j.post_id == job.post_id && j.slot == job.slot)
            {
                job.last_fired = old.last_fired;
            }
        }
        let count = next.len();
        *jobs = next;

        info!("Loaded {} scheduled post jobs", count);
        Ok(count)
    }

    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                let now = Local::now();
                let hhmm = now.format("%H:%M").to_string();
                if let Err(e) = self.tick(&hhmm, now.date_naive()).await {
                    error!("Post scheduler tick failed: {:#}", e);
                }
            }
        })
    }

    /// One scheduler tick at the given wall-clock minute. Split out so
    /// tests can drive time explicitly.
    pub async fn tick(&self, hhmm: &str, today: NaiveDate) -> Result<()> {
        let due: Vec<PostJob> = {
            let mut jobs = self.jobs.lock().await;
            let mut due = Vec::new();
            for job in jobs.iter_mut() {
                if job.fire_at == hhmm && job.last_fired != Some(today) {
                    job.last_fired = Some(today);
                    due.push(job.clone());
                }
            }
            due
        };

        for job in due {
            if let Err(e) = self.fire(&job).await {
                // the day guard stays set; a failed fire is not retried
                error!(
                    "Failed to fire post {} ({}): {:#}",
                    job.post_id,
                    job.slot.as_str(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Sends one post to its audience, best-effort per recipient, and
    /// persists the fan-out counters.
    async fn fire(&self, job: &PostJob) -> Result<()> {
        let Some(post) = ScheduledPost::find_by_id(&self.db.pool, job.post_id).await? else {
            warn!("Post {} vanished before firing", job.post_id);
            return Ok(());
        };

        let recipients = if post.target_audience == "channel" {
            match self.channel_id {
                Some(id) => vec![id],
                None => {
                    warn!("Post {} targets the channel but POST_CHANNEL_ID is unset", post.id);
                    Vec::new()
                }
            }
        } else {
            ScheduledPost::audience_telegram_ids(&self.db.pool, &post.target_audience).await?
        };

        if recipients.is_empty() {
            info!("Post {} has no recipients, nothing sent", post.id);
            PostStatistic::record(&self.db.pool, post.id, job.slot.as_str(), 0, 0).await?;
            return Ok(());
        }

        let text = format_post_message(&post, job.slot);

        let mut sent = 0i64;
        let mut errors = 0i64;
        for chat_id in recipients {
            let outcome = match &post.image_url {
                Some(image_url) => {
                    self.messenger
                        .send_photo(chat_id, image_url, &text, None)
                        .await
                }
                None => self.messenger.send_message(chat_id, &text, None).await,
            };
            match outcome {
                Ok(()) => sent += 1,
                Err(e) => {
                    errors += 1;
                    error!("Post {} send to {} failed: {:#}", post.id, chat_id, e);
                }
            }
        }

        PostStatistic::record(&self.db.pool, post.id, job.slot.as_str(), sent, errors).await?;
        self.metrics.record_post_fired();
        info!(
            "Post {} ({}) fired: {} sent, {} errors",
            post.id,
            job.slot.as_str(),
            sent,
            errors
        );
        Ok(())
    }

    /// Number of loaded jobs (for tests and the reload summary).
    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }
}

fn format_post_message(post: &ScheduledPost, slot: Slot) -> String {
    let (emoji, greeting) = slot.greeting();

    let mut text = format!("{emoji} <b>{greeting}!</b>\n\n");
    if !post.title.is_empty() {
        text.push_str(&format!("📢 <b>{}</b>\n\n", post.title));
    }
    text.push_str(&post.content);
    text.push_str("\n\n🛍 Перейти в каталог: /start");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names() {
        assert_eq!(Slot::Morning.as_str(), "morning");
        assert_eq!(Slot::Evening.as_str(), "evening");
    }

    #[test]
    fn test_format_post_message() {
        let post = ScheduledPost {
            id: 1,
            title: "Скидки".to_string(),
            content: "Сегодня -20% на всё".to_string(),
            image_url: None,
            time_morning: Some("09:00".to_string()),
            time_afternoon: None,
            time_evening: None,
            target_audience: "all".to_string(),
            is_active: true,
        };

        let text = format_post_message(&post, Slot::Morning);
        assert!(text.starts_with("🌅 <b>Доброе утро!</b>"));
        assert!(text.contains("📢 <b>Скидки</b>"));
        assert!(text.contains("Сегодня -20% на всё"));
        assert!(text.ends_with("🛍 Перейти в каталог: /start"));
    }
}
