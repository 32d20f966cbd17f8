//! On-disk follower snapshots.
//!
//! Each snapshot is a file named `followers.<timestamp>` holding one login
//! per line. Stamps are UTC in a format that sorts lexicographically in
//! chronological order, so listing by name is listing by capture time.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};

use crate::error::SnapshotError;
use crate::followers::FollowerSet;

pub const SNAPSHOT_PREFIX: &str = "followers.";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SnapshotError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn write(&self, followers: &FollowerSet) -> Result<PathBuf> {
        self.write_at(followers, Utc::now())
    }

    /// Write `followers` as a new snapshot stamped `at`.
    ///
    /// The body goes to a hidden temp file first and is then linked into
    /// place without overwriting, so a snapshot is either complete or absent.
    /// When the name for `at` is taken, the stamp moves forward 1ms at a time.
    pub fn write_at(&self, followers: &FollowerSet, at: DateTime<Utc>) -> Result<PathBuf> {
        let mut body = String::new();
        for login in followers {
            body.push_str(login);
            body.push('\n');
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".followers-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| SnapshotError::io(&self.dir, e))?;
        tmp.write_all(body.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SnapshotError::io(tmp.path(), e))?;

        let mut at = at;
        loop {
            let path = self.path_for(&at);
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    info!(
                        "recorded {} followers to {}",
                        followers.len(),
                        path.display()
                    );
                    return Ok(path);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, bumping timestamp", path.display());
                    tmp = e.file;
                    at += TimeDelta::milliseconds(1);
                }
                Err(e) => return Err(SnapshotError::io(path, e.error)),
            }
        }
    }

    fn path_for(&self, at: &DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("{SNAPSHOT_PREFIX}{}", at.format(TIMESTAMP_FORMAT)))
    }

    /// All snapshot files, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnapshotError::io(&self.dir, e))?;
            let is_snapshot = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(SNAPSHOT_PREFIX))
                .is_some_and(|stamp| !stamp.is_empty());
            if is_snapshot && entry.file_type().is_ok_and(|t| t.is_file()) {
                snapshots.push(entry.path());
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    pub fn read(&self, path: &Path) -> Result<FollowerSet> {
        let body = fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
        Ok(parse_snapshot(&body))
    }

    /// The newest snapshot other than `exclude`.
    pub fn previous(&self, exclude: Option<&Path>) -> Result<Option<PathBuf>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|path| Some(path.as_path()) != exclude)
            .next_back())
    }

    /// Delete the oldest snapshots so that at most `keep` remain.
    pub fn prune(&self, keep: usize) -> Result<Vec<PathBuf>> {
        let snapshots = self.list()?;
        let excess = snapshots.len().saturating_sub(keep);

        let mut removed = Vec::with_capacity(excess);
        for path in snapshots.into_iter().take(excess) {
            fs::remove_file(&path).map_err(|e| SnapshotError::io(&path, e))?;
            info!("pruned old snapshot {}", path.display());
            removed.push(path);
        }
        Ok(removed)
    }
}

/// One login per line; surrounding whitespace and blank lines are ignored.
pub fn parse_snapshot(body: &str) -> FollowerSet {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
