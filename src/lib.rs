//! Track who follows a GitHub user over time.
//!
//! Every run fetches the full follower list, records it as a timestamped
//! snapshot and reports the difference to the previous snapshot.

pub mod app;
pub mod args;
pub mod config;
pub mod diff;
pub mod error;
pub mod followers;
pub mod snapshot;
