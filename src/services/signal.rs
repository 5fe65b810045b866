//! File-based reload signaling between the web admin process and the bot.
//!
//! A signal is a sentinel file containing the producer's write time in unix
//! seconds: presence means pending, absence means none. Repeated raises
//! before a poll overwrite the timestamp, so the channel is level-triggered
//! and coalescing: at most one pending signal per kind, never a queue.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Refresh the catalog/posts caches.
    Incremental,
    /// Rebuild every derived cache, including the post timetable.
    Full,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Incremental => "incremental",
            SignalKind::Full => "full",
        }
    }
}

/// A pending signal as observed by `poll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSignal {
    pub kind: SignalKind,
    /// Producer's write time, unix seconds. Zero if the file content was
    /// unreadable; the consumer then acks it without applying.
    pub raised_at: f64,
}

/// Capability interface over the signaling medium, so the file-based
/// implementation can be swapped without touching the reload service.
pub trait Signaler: Send + Sync {
    /// Marks a signal pending, overwriting any unconsumed one of the same
    /// kind.
    fn raise(&self, kind: SignalKind) -> Result<()>;

    /// Returns the highest-priority pending signal: `Full` wins over
    /// `Incremental`.
    fn poll(&self) -> Result<Option<PendingSignal>>;

    /// Acknowledges (removes) a pending signal. Acking an absent signal is
    /// a no-op.
    fn ack(&self, kind: SignalKind) -> Result<()>;
}

/// The production medium: two well-known files in a shared directory. The
/// web admin writes them, the bot's poller consumes them.
pub struct FileSignaler {
    incremental_path: PathBuf,
    full_path: PathBuf,
}

const INCREMENTAL_FILE: &str = "data_update_flag.txt";
const FULL_FILE: &str = "force_reload_flag.txt";

impl FileSignaler {
    pub fn new(dir: &Path) -> Self {
        Self {
            incremental_path: dir.join(INCREMENTAL_FILE),
            full_path: dir.join(FULL_FILE),
        }
    }

    fn path_for(&self, kind: SignalKind) -> &Path {
        match kind {
            SignalKind::Incremental => &self.incremental_path,
            SignalKind::Full => &self.full_path,
        }
    }

    fn read_pending(&self, kind: SignalKind) -> Option<PendingSignal> {
        let path = self.path_for(kind);
        let raw = fs::read_to_string(path).ok()?;
        let raised_at = match raw.trim().parse::<f64>() {
            Ok(ts) => ts,
            Err(_) => {
                warn!("Unreadable timestamp in signal file {}", path.display());
                0.0
            }
        };
        Some(PendingSignal { kind, raised_at })
    }
}

impl Signaler for FileSignaler {
    fn raise(&self, kind: SignalKind) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let path = self.path_for(kind);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating signal dir {}", parent.display()))?;
        }
        fs::write(path, format!("{now}"))
            .with_context(|| format!("writing signal file {}", path.display()))?;
        Ok(())
    }

    fn poll(&self) -> Result<Option<PendingSignal>> {
        // Full has priority over Incremental.
        if let Some(pending) = self.read_pending(SignalKind::Full) {
            return Ok(Some(pending));
        }
        Ok(self.read_pending(SignalKind::Incremental))
    }

    fn ack(&self, kind: SignalKind) -> Result<()> {
        let path = self.path_for(kind);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing signal file {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_poll_empty() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());
        assert_eq!(signaler.poll().unwrap(), None);
    }

    #[test]
    fn test_raise_poll_ack() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());

        signaler.raise(SignalKind::Incremental).unwrap();
        let pending = signaler.poll().unwrap().unwrap();
        assert_eq!(pending.kind, SignalKind::Incremental);
        assert!(pending.raised_at > 0.0);

        signaler.ack(SignalKind::Incremental).unwrap();
        assert_eq!(signaler.poll().unwrap(), None);
    }

    #[test]
    fn test_repeated_raises_coalesce() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());

        signaler.raise(SignalKind::Incremental).unwrap();
        let first = signaler.poll().unwrap().unwrap();
        signaler.raise(SignalKind::Incremental).unwrap();
        signaler.raise(SignalKind::Incremental).unwrap();

        // still exactly one pending, carrying the latest timestamp
        let last = signaler.poll().unwrap().unwrap();
        assert!(last.raised_at >= first.raised_at);

        signaler.ack(SignalKind::Incremental).unwrap();
        assert_eq!(signaler.poll().unwrap(), None);
    }

    #[test]
    fn test_full_has_priority() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());

        signaler.raise(SignalKind::Full).unwrap();
        signaler.raise(SignalKind::Incremental).unwrap();

        let pending = signaler.poll().unwrap().unwrap();
        assert_eq!(pending.kind, SignalKind::Full);
    }

    #[test]
    fn test_ack_absent_is_noop() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());
        assert!(signaler.ack(SignalKind::Full).is_ok());
    }

    #[test]
    fn test_unreadable_timestamp_still_pending() {
        let dir = tempdir().unwrap();
        let signaler = FileSignaler::new(dir.path());
        std::fs::write(dir.path().join(INCREMENTAL_FILE), "not-a-number").unwrap();

        let pending = signaler.poll().unwrap().unwrap();
        assert_eq!(pending.kind, SignalKind::Incremental);
        assert_eq!(pending.raised_at, 0.0);
    }
}
