use std::fmt;

use crate::followers::FollowerSet;

/// Who left and who joined between two follower sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowerDiff {
    pub unfollowed: FollowerSet,
    pub newly_followed: FollowerSet,
}

impl FollowerDiff {
    pub fn is_empty(&self) -> bool {
        self.unfollowed.is_empty() && self.newly_followed.is_empty()
    }
}

pub fn diff(previous: &FollowerSet, current: &FollowerSet) -> FollowerDiff {
    FollowerDiff {
        unfollowed: previous.difference(current).cloned().collect(),
        newly_followed: current.difference(previous).cloned().collect(),
    }
}

fn format_logins(logins: &FollowerSet) -> String {
    let joined = logins
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

impl fmt::Display for FollowerDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no follower changes since last record");
        }
        writeln!(f, "unfollowed users: {}", format_logins(&self.unfollowed))?;
        write!(
            f,
            "newly followed users: {}",
            format_logins(&self.newly_followed)
        )
    }
}
