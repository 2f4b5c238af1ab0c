use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{OWNER_COLUMN, RemoteDatabase, RemoteError, ResultRemote};

type Table = BTreeMap<String, Value>;

/// In-process remote database.
///
/// Rows are kept per table, keyed by id. Clones share the same tables, so a
/// test can keep a handle while an adapter owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn text<'a>(row: &'a Value, column: &str) -> ResultRemote<&'a str> {
    row.get(column)
        .and_then(Value::as_str)
        .ok_or_else(|| RemoteError::Server {
            status: StatusCode::BAD_REQUEST,
            message: format!("row without {column}"),
        })
}

fn owned_by(row: &Value, owner_id: &str) -> bool {
    row.get(OWNER_COLUMN).and_then(Value::as_str) == Some(owner_id)
}

#[async_trait]
impl RemoteDatabase for MemoryDatabase {
    async fn select(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<Value>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|row| owned_by(row, owner_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn select_ids(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<String>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, row)| owned_by(row, owner_id))
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, table: &str, owner_id: &str) -> ResultRemote<u64> {
        let tables = self.tables.lock().await;
        let count = tables
            .get(table)
            .map(|rows| rows.values().filter(|row| owned_by(row, owner_id)).count())
            .unwrap_or_default();
        Ok(count as u64)
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> ResultRemote<()> {
        let mut tables = self.tables.lock().await;
        let existing = tables.entry(table.to_string()).or_default();

        // Validate the whole batch before writing any of it.
        let mut keyed = Vec::with_capacity(rows.len());
        for row in rows {
            let id = text(&row, "id")?.to_string();
            let owner = text(&row, OWNER_COLUMN)?;
            if let Some(current) = existing.get(&id)
                && !owned_by(current, owner)
            {
                return Err(RemoteError::Server {
                    status: StatusCode::FORBIDDEN,
                    message: format!("row {id} of {table} belongs to another owner"),
                });
            }
            keyed.push((id, row));
        }

        existing.extend(keyed);
        Ok(())
    }

    async fn delete(&self, table: &str, owner_id: &str, ids: &[String]) -> ResultRemote<()> {
        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(table) {
            for id in ids {
                if rows.get(id).is_some_and(|row| owned_by(row, owner_id)) {
                    rows.remove(id);
                }
            }
        }
        Ok(())
    }
}
