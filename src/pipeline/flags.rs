//! Per-feed enabled flags.
//!
//! One small file per feed records whether its delivery schedule was enabled
//! at last shutdown; process start resumes only the feeds whose flag reads
//! true.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{HuddleError, Result};

pub struct FeedStatusStore {
    dir: PathBuf,
}

impl FeedStatusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn flag_path(&self, feed: &str) -> PathBuf {
        self.dir.join(format!("{}_posting_status", feed))
    }

    /// Whether the feed was enabled at last shutdown. A missing flag or an
    /// unrecognized value reads as disabled.
    pub fn is_enabled(&self, feed: &str) -> bool {
        let path = self.flag_path(feed);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return false,
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => {
                warn!(feed, value = other, path = %path.display(),
                    "unknown value for posting status, treating as disabled");
                false
            }
        }
    }

    /// Persist the enabled flag. Failure here matters: callers must not
    /// treat a stop as done when the flag did not reach disk.
    pub fn set_enabled(&self, feed: &str, enabled: bool) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            HuddleError::Persistence(format!("cannot create state dir for '{}': {}", feed, e))
        })?;

        std::fs::write(self.flag_path(feed), if enabled { "true" } else { "false" }).map_err(
            |e| HuddleError::Persistence(format!("cannot persist flag for '{}': {}", feed, e)),
        )
    }

    pub fn state_dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flag_reads_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FeedStatusStore::new(dir.path());
        assert!(!store.is_enabled("fta"));
    }

    #[test]
    fn flag_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FeedStatusStore::new(dir.path());

        store.set_enabled("fta", true).expect("persist");
        assert!(store.is_enabled("fta"));

        store.set_enabled("fta", false).expect("persist");
        assert!(!store.is_enabled("fta"));
    }

    #[test]
    fn unknown_value_reads_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FeedStatusStore::new(dir.path());
        std::fs::write(dir.path().join("fta_posting_status"), "maybe").expect("write");
        assert!(!store.is_enabled("fta"));
    }

    #[test]
    fn unwritable_dir_is_a_persistence_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").expect("blocker file");

        let store = FeedStatusStore::new(blocker.join("nested"));
        assert!(matches!(
            store.set_enabled("fta", true),
            Err(crate::error::HuddleError::Persistence(_))
        ));
    }
}
