//! Nightly database backup: copies the SQLite file into the backup
//! directory with a date-stamped name and prunes old copies.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// How many backup files are kept.
const KEEP_BACKUPS: usize = 7;

pub struct BackupService {
    database_path: PathBuf,
    backup_dir: PathBuf,
    scheduler: JobScheduler,
}

impl BackupService {
    pub async fn new(
        database_path: PathBuf,
        backup_dir: PathBuf,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            database_path,
            backup_dir,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let database_path = self.database_path.clone();
        let backup_dir = self.backup_dir.clone();

        // Nightly at 03:00 local time
        let backup_job = Job::new_async("0 0 3 * * *", move |_uuid, _l| {
            let database_path = database_path.clone();
            let backup_dir = backup_dir.clone();
            Box::pin(async move {
                match run_backup(&database_path, &backup_dir) {
                    Ok(path) => info!("Database backup written to {}", path.display()),
                    Err(e) => error!("Database backup failed: {:#}", e),
                }
            })
        })?;

        self.scheduler.add(backup_job).await?;
        self.scheduler.start().await?;

        info!("Backup service started - nightly at 03:00");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub fn backup_now(&self) -> Result<PathBuf> {
        run_backup(&self.database_path, &self.backup_dir)
    }
}

fn run_backup(database_path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    if !database_path.exists() {
        return Err(anyhow!(
            "database file {} does not exist",
            database_path.display()
        ));
    }

    std::fs::create_dir_all(backup_dir)?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let target = backup_dir.join(format!("shop-{stamp}.db"));
    std::fs::copy(database_path, &target)?;

    prune_old_backups(backup_dir)?;
    Ok(target)
}

fn prune_old_backups(backup_dir: &Path) -> Result<()> {
    let mut backups: Vec<PathBuf> = std::fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("shop-") && n.ends_with(".db"))
                .unwrap_or(false)
        })
        .collect();

    // Date-stamped names sort chronologically
    backups.sort();

    while backups.len() > KEEP_BACKUPS {
        let oldest = backups.remove(0);
        std::fs::remove_file(&oldest)?;
        info!("Pruned old backup {}", oldest.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_backup_copies_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shop.db");
        std::fs::write(&db_path, b"data").unwrap();
        let backup_dir = dir.path().join("backups");

        let target = run_backup(&db_path, &backup_dir).unwrap();
        assert!(target.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"data");
    }

    #[test]
    fn test_run_backup_missing_database() {
        let dir = tempdir().unwrap();
        let result = run_backup(&dir.path().join("missing.db"), &dir.path().join("backups"));
        assert!(result.is_err());
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            std::fs::write(dir.path().join(format!("shop-2024010{i}-000000.db")), b"x").unwrap();
        }

        prune_old_backups(dir.path()).unwrap();

        let remaining = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(remaining, KEEP_BACKUPS);
        // the oldest ones were removed
        assert!(!dir.path().join("shop-20240100-000000.db").exists());
        assert!(dir.path().join("shop-20240109-000000.db").exists());
    }
}
