//! JSON backup of the whole store.

use chrono::{SecondsFormat, Utc};
use model::{Budget, Category, Goal, RecordKind, Records, Setting, Transaction};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};

use crate::{
    LocalStore, ResultStore, Store,
    local::{clear_table, insert_records},
    with_tx,
};

/// Backup file payload.
///
/// Kinds missing from an imported file are left untouched, so a partial
/// backup only replaces what it contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<Vec<Budget>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<Setting>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

impl Backup {
    fn into_batches(self) -> Vec<Records> {
        [
            self.transactions.map(Records::Transactions),
            self.categories.map(Records::Categories),
            self.budgets.map(Records::Budgets),
            self.goals.map(Records::Goals),
            self.settings.map(Records::Settings),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Store {
    /// Every record, stamped with the export time.
    pub async fn export_backup(&self) -> ResultStore<Backup> {
        let snapshot = self.snapshot().await?;
        Ok(Backup {
            transactions: Some(snapshot.transactions),
            categories: Some(snapshot.categories),
            budgets: Some(snapshot.budgets),
            goals: Some(snapshot.goals),
            settings: Some(snapshot.settings),
            exported_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
    }

    /// Replace every kind present in `backup` in a single transaction and
    /// return the kinds that were replaced.
    pub async fn import_backup(&self, backup: Backup) -> ResultStore<Vec<RecordKind>> {
        let batches = backup.into_batches();
        let kinds: Vec<RecordKind> = batches.iter().map(Records::kind).collect();

        with_tx!(self, |db_tx| {
            for records in batches {
                clear_table(&db_tx, records.kind()).await?;
                insert_records(&db_tx, records).await?;
            }
            Ok::<_, crate::StoreError>(())
        })?;

        tracing::info!(?kinds, "imported backup");
        Ok(kinds)
    }
}
