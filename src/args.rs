use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// GitHub user whose followers are tracked (read GITHUB_ACCESS_TOKEN for auth)
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,
    /// Snapshot directory [default: ~/.config/gh-followers]
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,
    /// Keep only the newest N snapshots, oldest ones are deleted after the diff
    #[arg(short = 'k', long = "keep")]
    pub keep: Option<usize>,
    /// Followers requested per page (1-100)
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,
    /// Wait before retrying a rate-limited page, in milliseconds
    #[arg(long = "retry-delay-ms")]
    pub retry_delay_ms: Option<u64>,
    /// Transport failures tolerated per page before giving up
    #[arg(long = "network-retries")]
    pub network_retries: Option<u32>,
    /// Compare against the latest snapshot without recording a new one
    #[arg(short = 'n', long = "no-record")]
    pub no_record: bool,
    /// Print every current follower
    #[arg(short = 'l', long = "list")]
    pub list: bool,
}
