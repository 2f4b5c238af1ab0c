use store::StoreError;
use thiserror::Error;

/// Failures a caller of the sync engine can see.
///
/// Remote failures never show up here: they are logged and either degrade
/// the session to local-only or wait for the next cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("local store: {0}")]
    Local(#[from] StoreError),
    #[error("no active sync session")]
    NoSession,
}
