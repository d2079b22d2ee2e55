use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use chrono::{DateTime, Duration, Utc};
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// Global age limit for run directories under the backup root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age_days: u32,
}

/// What one pruning pass did.
#[derive(Debug, Default)]
pub struct PruneSummary {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<Error>,
}

impl RetentionPolicy {
    pub fn new(max_age_days: u32) -> Self {
        Self { max_age_days }
    }

    /// Oldest modification time still kept. A limit reaching past the
    /// representable range keeps everything.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(i64::from(self.max_age_days))
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Removes every immediate subdirectory of `backup_root` last modified
    /// before the cutoff.
    ///
    /// Age is the directory's modification time, not the timestamp in its
    /// name. `protect` is never removed whatever its age. A failure on one
    /// directory is recorded and the pass continues with the next one.
    pub fn prune_older_than(
        &self,
        backup_root: &Path,
        now: DateTime<Utc>,
        protect: Option<&Path>,
    ) -> Result<PruneSummary> {
        let cutoff = self.cutoff(now);
        tracing::info!(
            "Cleaning up backups older than {} days (before {})",
            self.max_age_days,
            cutoff
        );

        let mut summary = PruneSummary::default();
        let entries = read_dir(backup_root)
            .map_err(Error::from)
            .with_msg(format!("Listing backup root {:?} failed", backup_root))?;

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", backup_root, e);
                    summary.failures.push(Error::prune(backup_root, Error::from(e)));
                    continue;
                }
            };

            if protect.is_some_and(|p| p == path) {
                tracing::debug!("Keeping current run directory {:?}", path);
                continue;
            }

            match self.expired_dir(&path, cutoff) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    tracing::warn!("Cannot read age of {:?}: {}", path, e);
                    summary.failures.push(Error::prune(path, e));
                    continue;
                }
            }

            tracing::info!("Removing old backup directory: {:?}", path);
            match std::fs::remove_dir_all(&path) {
                Ok(_) => summary.removed.push(path),
                Err(e) => {
                    let e = Error::prune(path, Error::from(e));
                    tracing::error!("{e}");
                    summary.failures.push(e);
                }
            }
        }

        Ok(summary)
    }

    fn expired_dir(&self, path: &Path, cutoff: DateTime<Utc>) -> Result<bool> {
        // symlinks are not followed, a link is never a run directory
        let md = std::fs::symlink_metadata(path)?;
        if !md.is_dir() {
            return Ok(false);
        }
        let modified: DateTime<Utc> = md.modified()?.into();
        Ok(modified < cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use tempfile::TempDir;

    fn remaining(root: &Path) -> BTreeSet<String> {
        read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        assert_eq!(RetentionPolicy::new(30).cutoff(now), now - Duration::days(30));
        assert_eq!(RetentionPolicy::new(0).cutoff(now), now);
    }

    fn backdate(dir: &Path, days: i64) {
        let when = std::time::SystemTime::now() - std::time::Duration::from_secs(days as u64 * 86_400);
        File::open(dir).unwrap().set_modified(when).unwrap();
    }

    #[test]
    fn test_old_directory_removed_recent_kept() {
        let root = TempDir::new().unwrap();
        let old = root.path().join("20230101_000000");
        let recent = root.path().join("recent");
        std::fs::create_dir_all(old.join("nested")).unwrap();
        std::fs::write(old.join("nested/a.tar.xz"), "x").unwrap();
        std::fs::create_dir(&recent).unwrap();
        backdate(&old, 40);
        backdate(&recent, 5);

        let summary = RetentionPolicy::new(30)
            .prune_older_than(root.path(), Utc::now(), None)
            .unwrap();

        assert_eq!(summary.removed, vec![old.clone()]);
        assert!(summary.failures.is_empty());
        assert!(!old.exists());
        assert_eq!(remaining(root.path()), BTreeSet::from(["recent".to_string()]));
    }

    #[test]
    fn test_huge_retention_keeps_everything() {
        let root = TempDir::new().unwrap();
        let ancient = root.path().join("ancient");
        std::fs::create_dir(&ancient).unwrap();
        backdate(&ancient, 3650);

        let policy = RetentionPolicy::new(99_999_999);
        assert_eq!(policy.cutoff(Utc::now()), DateTime::<Utc>::MIN_UTC);
        let summary = policy
            .prune_older_than(root.path(), Utc::now(), None)
            .unwrap();

        assert!(summary.removed.is_empty());
        assert!(ancient.exists());
    }

    #[test]
    fn test_files_in_root_are_ignored() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("notes.txt"), "keep me").unwrap();

        let summary = RetentionPolicy::new(0)
            .prune_older_than(root.path(), Utc::now() + Duration::days(1), None)
            .unwrap();

        assert!(summary.removed.is_empty());
        assert_eq!(remaining(root.path()), BTreeSet::from(["notes.txt".to_string()]));
    }

    #[test]
    fn test_protected_directory_survives_zero_retention() {
        let root = TempDir::new().unwrap();
        let current = root.path().join("current");
        std::fs::create_dir(&current).unwrap();
        std::fs::create_dir(root.path().join("previous")).unwrap();

        let summary = RetentionPolicy::new(0)
            .prune_older_than(root.path(), Utc::now() + Duration::days(1), Some(&current))
            .unwrap();

        assert_eq!(summary.removed, vec![root.path().join("previous")]);
        assert!(current.exists());
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let root = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            std::fs::create_dir(root.path().join(name)).unwrap();
        }
        let policy = RetentionPolicy::new(30);
        let now = Utc::now() + Duration::days(10);

        policy.prune_older_than(root.path(), now, None).unwrap();
        let first = remaining(root.path());
        let summary = policy.prune_older_than(root.path(), now, None).unwrap();
        let second = remaining(root.path());

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(summary.removed.is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let root = TempDir::new().unwrap();
        let result =
            RetentionPolicy::new(30).prune_older_than(&root.path().join("nope"), Utc::now(), None);
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_on_one_directory_does_not_stop_others() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let locked = root.path().join("a_locked");
        std::fs::create_dir_all(locked.join("inner")).unwrap();
        std::fs::write(locked.join("inner/file"), "x").unwrap();
        std::fs::create_dir(root.path().join("b_free")).unwrap();
        std::fs::set_permissions(locked.join("inner"), std::fs::Permissions::from_mode(0o500))
            .unwrap();

        let summary = RetentionPolicy::new(1)
            .prune_older_than(root.path(), Utc::now() + Duration::days(2), None)
            .unwrap();

        assert!(!root.path().join("b_free").exists());
        // root ignores permission bits, so only assert when the lock held
        if locked.exists() {
            std::fs::set_permissions(locked.join("inner"), std::fs::Permissions::from_mode(0o700))
                .unwrap();
            assert_eq!(summary.failures.len(), 1);
        }
    }
}
