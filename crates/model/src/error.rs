use thiserror::Error;

use crate::RecordKind;

/// Errors raised while moving records between the local and remote shapes.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("invalid {kind} row: {source}")]
    Row {
        kind: RecordKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown {field} value: {value}")]
    UnknownVariant { field: &'static str, value: String },
}
