//! Record types shared by the local store, the remote adapter and the sync
//! engine.
//!
//! Every record carries a client-generated string `id` which never changes
//! and is the only key used to match a local record with its remote copy.

pub use error::MappingError;
pub use kind::{Record, RecordKind, Records, Snapshot};
pub use records::{Budget, Category, CategoryType, Goal, Setting, Transaction, TransactionType};
pub use row::RemoteRecord;

mod error;
mod kind;
mod records;
pub mod row;

/// Setting key holding the currency used when a form does not pick one.
pub const DEFAULT_CURRENCY_KEY: &str = "defaultCurrency";

/// Currency used when no `defaultCurrency` setting exists.
pub const FALLBACK_CURRENCY: &str = "USD";
