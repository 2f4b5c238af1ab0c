//! Remote side of the sync boundary.
//!
//! [`RemoteDatabase`] is the network-backed row store, addressed by table name
//! and owner. [`RemoteAdapter`] sits on top of it, converting between local
//! records and remote rows, and is the only thing the sync engine talks to.

use async_trait::async_trait;
use serde_json::Value;

pub use adapter::RemoteAdapter;
pub use error::RemoteError;
pub use memory::MemoryDatabase;
pub use postgrest::{PostgrestBuilder, PostgrestClient};

mod adapter;
mod error;
mod memory;
mod postgrest;

pub type ResultRemote<T> = Result<T, RemoteError>;

/// Column holding the owner of every remote row.
pub const OWNER_COLUMN: &str = "user_id";

/// Row-level access to the remote database.
///
/// Every read and delete is scoped to one owner. Implementations never retry.
#[async_trait]
pub trait RemoteDatabase: Send + Sync {
    /// Every row of `table` owned by `owner_id`.
    async fn select(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<Value>>;

    /// Ids of every row of `table` owned by `owner_id`.
    async fn select_ids(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<String>>;

    /// Number of rows of `table` owned by `owner_id`.
    async fn count(&self, table: &str, owner_id: &str) -> ResultRemote<u64>;

    /// Insert rows, overwriting any row with the same `id`.
    async fn upsert(&self, table: &str, rows: Vec<Value>) -> ResultRemote<()>;

    /// Delete the rows of `table` owned by `owner_id` whose id is in `ids`.
    async fn delete(&self, table: &str, owner_id: &str, ids: &[String]) -> ResultRemote<()>;
}
