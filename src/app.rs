use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use log::info;

use crate::config::Config;
use crate::diff::{diff, FollowerDiff};
use crate::error::Result;
use crate::followers::{Fetcher, FollowerSet, FollowerSource};
use crate::snapshot::SnapshotStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Compared {
        previous: PathBuf,
        diff: FollowerDiff,
    },
    /// No earlier snapshot to compare against, the expected first-run state.
    NotEnoughHistory,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub followers: FollowerSet,
    /// The snapshot written by this run, `None` when recording is off.
    pub snapshot: Option<PathBuf>,
    pub comparison: Comparison,
    pub pruned: Vec<PathBuf>,
}

/// Fetch, record, compare with the previous snapshot, then apply retention.
///
/// Nothing touches the snapshot directory until the fetch has fully
/// completed, so a failed or cancelled fetch leaves no trace on disk.
pub async fn run<S, C>(config: &Config, source: S, cancel: C) -> Result<RunOutcome>
where
    S: FollowerSource,
    C: Future<Output = ()>,
{
    let fetcher = Fetcher::new(source, config.fetch.clone());
    let followers = fetcher.fetch_followers(&config.user, cancel).await?;

    let store = SnapshotStore::open(&config.dir)?;
    let snapshot = if config.record {
        Some(store.write(&followers)?)
    } else {
        None
    };

    let comparison = match store.previous(snapshot.as_deref())? {
        Some(previous) => {
            let before = store.read(&previous)?;
            info!("comparing against {}", previous.display());
            Comparison::Compared {
                diff: diff(&before, &followers),
                previous,
            }
        }
        None => Comparison::NotEnoughHistory,
    };

    let pruned = match config.keep {
        Some(keep) if config.record => store.prune(keep)?,
        _ => Vec::new(),
    };

    Ok(RunOutcome {
        followers,
        snapshot,
        comparison,
        pruned,
    })
}

impl RunOutcome {
    /// Human readable summary printed at the end of a run.
    pub fn report<'a>(&'a self, user: &'a str, list: bool) -> Report<'a> {
        Report {
            outcome: self,
            user,
            list,
        }
    }
}

pub struct Report<'a> {
    outcome: &'a RunOutcome,
    user: &'a str,
    list: bool,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;
        writeln!(f, "{} has {} followers", self.user, outcome.followers.len())?;
        if self.list {
            for (i, login) in outcome.followers.iter().enumerate() {
                writeln!(f, "{:03}. {login}", i + 1)?;
            }
        }
        if let Some(snapshot) = &outcome.snapshot {
            writeln!(f, "recorded current followers to {}", snapshot.display())?;
        }
        match &outcome.comparison {
            Comparison::Compared { diff, .. } => writeln!(f, "{diff}")?,
            Comparison::NotEnoughHistory => {
                writeln!(f, "last recorded followers not found, diff skipped")?
            }
        }
        if !outcome.pruned.is_empty() {
            writeln!(f, "pruned {} old snapshots", outcome.pruned.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(logins: &[&str]) -> FollowerSet {
        logins.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_report_first_run() {
        let outcome = RunOutcome {
            followers: set(&["bob", "alice"]),
            snapshot: Some(PathBuf::from("/tmp/followers.2023-01-01 00:00:00.000")),
            comparison: Comparison::NotEnoughHistory,
            pruned: Vec::new(),
        };
        assert_eq!(
            outcome.report("octocat", true).to_string(),
            "octocat has 2 followers\n\
             001. alice\n\
             002. bob\n\
             recorded current followers to /tmp/followers.2023-01-01 00:00:00.000\n\
             last recorded followers not found, diff skipped\n"
        );
    }

    #[test]
    fn test_report_with_diff() {
        let outcome = RunOutcome {
            followers: set(&["alice", "carol", "dave"]),
            snapshot: None,
            comparison: Comparison::Compared {
                previous: PathBuf::from("followers.a"),
                diff: diff(&set(&["alice", "bob", "carol"]), &set(&["alice", "carol", "dave"])),
            },
            pruned: Vec::new(),
        };
        assert_eq!(
            outcome.report("octocat", false).to_string(),
            "octocat has 3 followers\n\
             unfollowed users: [bob]\n\
             newly followed users: [dave]\n"
        );
    }

    #[test]
    fn test_report_unchanged_and_pruned() {
        let followers = set(&["alice"]);
        let outcome = RunOutcome {
            followers: followers.clone(),
            snapshot: None,
            comparison: Comparison::Compared {
                previous: PathBuf::from("followers.a"),
                diff: diff(&followers, &followers),
            },
            pruned: vec![PathBuf::from("followers.0"), PathBuf::from("followers.1")],
        };
        assert_eq!(
            outcome.report("octocat", false).to_string(),
            "octocat has 1 followers\n\
             no follower changes since last record\n\
             pruned 2 old snapshots\n"
        );
    }
}
