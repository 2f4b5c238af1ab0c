use std::{collections::BTreeSet, sync::Arc};

use model::{RecordKind, Records};

use crate::{RemoteDatabase, ResultRemote};

/// Record-level view of the remote database for one or more owners.
///
/// Converts local batches into owner-stamped rows and back. Never retries;
/// every failure is returned to the caller.
#[derive(Clone)]
pub struct RemoteAdapter {
    database: Arc<dyn RemoteDatabase>,
}

impl core::fmt::Debug for RemoteAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemoteAdapter").finish_non_exhaustive()
    }
}

impl RemoteAdapter {
    pub fn new(database: Arc<dyn RemoteDatabase>) -> Self {
        Self { database }
    }

    /// Every remote record of `kind` owned by `owner_id`.
    pub async fn fetch_all(&self, owner_id: &str, kind: RecordKind) -> ResultRemote<Records> {
        let rows = self.database.select(kind.table(), owner_id).await?;
        Ok(Records::from_rows(kind, rows)?)
    }

    /// Write every record of the batch, overwriting existing ids. Returns the
    /// number of rows sent.
    pub async fn upsert_all(&self, owner_id: &str, records: &Records) -> ResultRemote<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows = records.to_rows(owner_id)?;
        let count = rows.len();
        self.database.upsert(records.kind().table(), rows).await?;
        tracing::debug!(kind = %records.kind(), count, "upserted remote rows");
        Ok(count)
    }

    /// Delete every remote record of `kind` owned by `owner_id` whose id is
    /// not in `keep_ids`. Returns the number of ids deleted.
    pub async fn delete_except(
        &self,
        owner_id: &str,
        kind: RecordKind,
        keep_ids: &BTreeSet<String>,
    ) -> ResultRemote<usize> {
        let stale: Vec<String> = self
            .database
            .select_ids(kind.table(), owner_id)
            .await?
            .into_iter()
            .filter(|id| !keep_ids.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if stale.is_empty() {
            return Ok(0);
        }
        self.database
            .delete(kind.table(), owner_id, &stale)
            .await?;
        tracing::debug!(%kind, count = stale.len(), "deleted remote rows");
        Ok(stale.len())
    }

    /// Whether `owner_id` has synced before, judged by the presence of at
    /// least one category.
    pub async fn owner_has_any_data(&self, owner_id: &str) -> ResultRemote<bool> {
        let count = self
            .database
            .count(RecordKind::Categories.table(), owner_id)
            .await?;
        Ok(count > 0)
    }
}
