//! Consumer side of the reload protocol: a background poller that watches
//! the signal files and refreshes the in-process caches.
//!
//! Multiple admin edits between polls collapse into one reload (the signal
//! channel coalesces), which is correct because a reload is an idempotent
//! full refresh. On a processing error the signal is acked anyway so a
//! poisoned signal can not loop forever; the next successful admin edit
//! re-signals.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::database::connection::DatabaseManager;
use crate::services::cache::CatalogCache;
use crate::services::metrics::Metrics;
use crate::services::notify::AdminNotifier;
use crate::services::posts::PostScheduler;
use crate::services::signal::{SignalKind, Signaler};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct ReloadService {
    signaler: Arc<dyn Signaler>,
    db: DatabaseManager,
    cache: CatalogCache,
    posts: Arc<PostScheduler>,
    notifier: AdminNotifier,
    metrics: Metrics,
    /// Producer timestamp of the last applied reload; older incremental
    /// signals are acked without applying.
    last_applied: Mutex<f64>,
}

impl ReloadService {
    pub fn new(
        signaler: Arc<dyn Signaler>,
        db: DatabaseManager,
        cache: CatalogCache,
        posts: Arc<PostScheduler>,
        notifier: AdminNotifier,
        metrics: Metrics,
    ) -> Self {
        Self {
            signaler,
            db,
            cache,
            posts,
            notifier,
            metrics,
            last_applied: Mutex::new(0.0),
        }
    }

    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = self.tick().await {
                    error!("Reload poller error: {:#}", e);
                }
            }
        })
    }

    /// One poll cycle. Split out for tests.
    pub async fn tick(&self) -> Result<()> {
        let Some(pending) = self.signaler.poll()? else {
            return Ok(());
        };

        match pending.kind {
            SignalKind::Full => {
                if let Err(e) = self.full_reload().await {
                    // fail-open: drop the signal, wait for the next edit
                    error!("Full reload failed: {:#}", e);
                }
                *self.last_applied.lock().await = pending.raised_at;
                // A full reload subsumes any pending incremental signal.
                self.signaler.ack(SignalKind::Full)?;
                self.signaler.ack(SignalKind::Incremental)?;
            }
            SignalKind::Incremental => {
                let mut last_applied = self.last_applied.lock().await;
                if pending.raised_at > *last_applied {
                    if let Err(e) = self.incremental_reload().await {
                        error!("Incremental reload failed: {:#}", e);
                    }
                    *last_applied = pending.raised_at;
                }
                // Stale or applied either way: the file is consumed.
                self.signaler.ack(SignalKind::Incremental)?;
            }
        }
        Ok(())
    }

    /// Everything derived is rebuilt and the admins get a summary.
    async fn full_reload(&self) -> Result<()> {
        info!("Full data reload requested");
        let (categories, products) = self.cache.reload(&self.db).await?;
        let posts = self.posts.reload().await?;
        self.metrics.record_reload();
        self.notifier
            .reload_summary(categories, products, posts)
            .await;
        info!("Full data reload complete");
        Ok(())
    }

    async fn incremental_reload(&self) -> Result<()> {
        info!("Incremental data reload requested");
        let (categories, products) = self.cache.reload(&self.db).await?;
        let posts = self.posts.reload().await?;
        self.metrics.record_reload();
        self.notifier
            .reload_summary(categories, products, posts)
            .await;
        Ok(())
    }

    /// Producer timestamp of the last applied reload (for tests).
    pub async fn last_applied(&self) -> f64 {
        *self.last_applied.lock().await
    }
}
