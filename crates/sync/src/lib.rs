//! Keeps a [`LocalStore`](store::LocalStore) mirrored to the remote database
//! for one owner at a time.
//!
//! A session starts with a one-time initial sync (download everything when
//! the owner already has remote data, upload everything otherwise) and then
//! pushes the full local state on a fixed interval. Deletions are inferred:
//! any remote id missing locally is removed.

use std::time::Duration;

pub use engine::SyncEngine;
pub use error::SyncError;
pub use report::{CycleReport, InitialSync, KindOutcome};
pub use state::SyncState;

mod engine;
mod error;
mod report;
mod state;

pub type ResultSync<T> = Result<T, SyncError>;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
