//! Snapshots of the transactions loaded from the remote store.

use crate::error::Res;
use crate::model::Transaction;
use crate::{utils, Config};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for the snapshot written after each successful remote load.
pub const LOAD: &str = "load";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `transactions` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, transactions: &[Transaction]) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{EXTENSION}");
        let path = self.backups_dir.join(&filename);

        let json = serde_json::to_string_pretty(transactions)
            .context("Failed to serialize transactions to JSON")?;
        utils::write(&path, json).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let mut max_seq: u32 = 0;
        for name in self.file_names().await? {
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Res<()> {
        let mut files: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // Sorting by name sorts by date and sequence number
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(name)).await?;
        }

        Ok(())
    }

    async fn file_names(&self) -> Res<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let seq = filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?;
    seq.parse().ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, TransactionType};
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("load.2025-12-14-001.json", "load", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("load.2025-12-14-042.json", "load", "2025-12-14"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("other.2025-12-14-001.json", "load", "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("load.2025-12-13-001.json", "load", "2025-12-14"),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number("load.2025-12-14-001.txt", "load", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("load.2025-12-14-001.json", "load"));
        assert!(!is_backup_file("load.2025-12-14-001.txt", "load"));
        assert!(!is_backup_file("loader.2025-12-14-001.json", "load"));
        assert!(!is_backup_file("config.json", "load"));
    }

    #[tokio::test]
    async fn test_save_json_rotates() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), None, None, None).await.unwrap();
        let backup = config.backup();
        let txn = Transaction::new(TransactionType::Income, Category::Salary, "", "10").unwrap();

        let mut paths = Vec::new();
        for _ in 0..(config.backup_copies() + 2) {
            paths.push(backup.save_json(LOAD, &[txn.clone()]).await.unwrap());
        }

        let first = paths[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(first.ends_with("-001.json"));
        let last = paths.last().unwrap();
        assert!(last.is_file());
        assert!(!paths[0].exists());
        assert!(!paths[1].exists());

        let saved: Vec<Transaction> =
            serde_json::from_str(&utils::read(last).await.unwrap()).unwrap();
        assert_eq!(saved, vec![txn]);

        let remaining = backup.file_names().await.unwrap();
        assert_eq!(remaining.len(), config.backup_copies() as usize);
    }
}
