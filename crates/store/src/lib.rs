//! On-device record store.
//!
//! Records live in a SQLite database through `sea-orm`, one table per
//! [`RecordKind`]. The [`LocalStore`] trait is the contract the sync engine
//! consumes; [`Store`] implements it and also exposes the record-level
//! operations the application uses directly.

use async_trait::async_trait;
use model::{RecordKind, Records, Snapshot};
use sea_orm::DatabaseConnection;

pub use backup::Backup;
pub use error::StoreError;
pub use seed::Seeded;

mod backup;
mod budgets;
mod categories;
mod error;
mod goals;
mod local;
mod records;
mod seed;
mod settings;
mod transactions;

pub type ResultStore<T> = Result<T, StoreError>;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Bulk access to the five record tables.
///
/// Every method works on whole tables: the sync engine relies on reading the
/// complete set of a kind to infer remote deletions.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Every record of `kind`.
    async fn get_all(&self, kind: RecordKind) -> ResultStore<Records>;

    /// Clear the batch's table, then insert the batch.
    async fn replace_all(&self, records: Records) -> ResultStore<()>;

    async fn clear(&self, kind: RecordKind) -> ResultStore<()>;

    /// Insert the batch. Fails if an id already exists.
    async fn bulk_insert(&self, records: Records) -> ResultStore<()>;

    /// Every record of every kind.
    async fn snapshot(&self) -> ResultStore<Snapshot> {
        let mut snapshot = Snapshot::default();
        for kind in RecordKind::ALL {
            snapshot.set(self.get_all(kind).await?);
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    database: DatabaseConnection,
}

impl Store {
    /// Return a builder for `Store`. Help to build the struct.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }
}

/// The builder for `Store`
#[derive(Default)]
pub struct StoreBuilder {
    database: DatabaseConnection,
}

impl StoreBuilder {
    /// Pass the required database. Migrations must already be applied.
    pub fn database(mut self, db: DatabaseConnection) -> StoreBuilder {
        self.database = db;
        self
    }

    /// Construct `Store`
    pub fn build(self) -> Store {
        Store {
            database: self.database,
        }
    }
}
