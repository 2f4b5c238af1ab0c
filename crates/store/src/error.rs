//! The module contains the errors the local store can return.
//!
//! - [`KeyNotFound`] when a record addressed by id or key does not exist.
//! - [`InvalidRecord`] when a stored row cannot be turned back into a record.
//! - [`Database`] for any failure of the underlying SQLite connection.
//!
//!  [`KeyNotFound`]: StoreError::KeyNotFound
//!  [`InvalidRecord`]: StoreError::InvalidRecord
//!  [`Database`]: StoreError::Database
use model::MappingError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<MappingError> for StoreError {
    fn from(value: MappingError) -> Self {
        StoreError::InvalidRecord(value.to_string())
    }
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidRecord(a), Self::InvalidRecord(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
