use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Budget, Category, Goal, MappingError, Setting, Transaction,
    row::{from_rows, to_rows},
};

/// The five record kinds. The string form doubles as the table name on both
/// sides of the sync boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Transactions,
    Categories,
    Budgets,
    Goals,
    Settings,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Transactions,
        RecordKind::Categories,
        RecordKind::Budgets,
        RecordKind::Goals,
        RecordKind::Settings,
    ];

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            RecordKind::Transactions => "transactions",
            RecordKind::Categories => "categories",
            RecordKind::Budgets => "budgets",
            RecordKind::Goals => "goals",
            RecordKind::Settings => "settings",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.table())
    }
}

/// One record of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Transaction(Transaction),
    Category(Category),
    Budget(Budget),
    Goal(Goal),
    Setting(Setting),
}

impl Record {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Transaction(_) => RecordKind::Transactions,
            Record::Category(_) => RecordKind::Categories,
            Record::Budget(_) => RecordKind::Budgets,
            Record::Goal(_) => RecordKind::Goals,
            Record::Setting(_) => RecordKind::Settings,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Record::Transaction(r) => &r.id,
            Record::Category(r) => &r.id,
            Record::Budget(r) => &r.id,
            Record::Goal(r) => &r.id,
            Record::Setting(r) => &r.id,
        }
    }
}

/// A batch of records of a single kind.
///
/// This is the unit every store and adapter operation works with, so the
/// kind of a batch can never disagree with the records inside it.
#[derive(Clone, Debug, PartialEq)]
pub enum Records {
    Transactions(Vec<Transaction>),
    Categories(Vec<Category>),
    Budgets(Vec<Budget>),
    Goals(Vec<Goal>),
    Settings(Vec<Setting>),
}

impl Records {
    #[must_use]
    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Transactions => Records::Transactions(Vec::new()),
            RecordKind::Categories => Records::Categories(Vec::new()),
            RecordKind::Budgets => Records::Budgets(Vec::new()),
            RecordKind::Goals => Records::Goals(Vec::new()),
            RecordKind::Settings => Records::Settings(Vec::new()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Records::Transactions(_) => RecordKind::Transactions,
            Records::Categories(_) => RecordKind::Categories,
            Records::Budgets(_) => RecordKind::Budgets,
            Records::Goals(_) => RecordKind::Goals,
            Records::Settings(_) => RecordKind::Settings,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Records::Transactions(items) => items.len(),
            Records::Categories(items) => items.len(),
            Records::Budgets(items) => items.len(),
            Records::Goals(items) => items.len(),
            Records::Settings(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers of every record in the batch.
    #[must_use]
    pub fn ids(&self) -> BTreeSet<String> {
        fn collect<'a>(ids: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
            ids.cloned().collect()
        }
        match self {
            Records::Transactions(items) => collect(items.iter().map(|r| &r.id)),
            Records::Categories(items) => collect(items.iter().map(|r| &r.id)),
            Records::Budgets(items) => collect(items.iter().map(|r| &r.id)),
            Records::Goals(items) => collect(items.iter().map(|r| &r.id)),
            Records::Settings(items) => collect(items.iter().map(|r| &r.id)),
        }
    }

    /// Map the batch to remote rows owned by `owner_id`.
    pub fn to_rows(&self, owner_id: &str) -> Result<Vec<Value>, MappingError> {
        match self {
            Records::Transactions(items) => to_rows(items, owner_id),
            Records::Categories(items) => to_rows(items, owner_id),
            Records::Budgets(items) => to_rows(items, owner_id),
            Records::Goals(items) => to_rows(items, owner_id),
            Records::Settings(items) => to_rows(items, owner_id),
        }
    }

    /// Map remote rows of `kind` back into a local batch, dropping the owner
    /// column.
    pub fn from_rows(kind: RecordKind, rows: Vec<Value>) -> Result<Self, MappingError> {
        Ok(match kind {
            RecordKind::Transactions => Records::Transactions(from_rows(rows)?),
            RecordKind::Categories => Records::Categories(from_rows(rows)?),
            RecordKind::Budgets => Records::Budgets(from_rows(rows)?),
            RecordKind::Goals => Records::Goals(from_rows(rows)?),
            RecordKind::Settings => Records::Settings(from_rows(rows)?),
        })
    }
}

impl From<Record> for Records {
    fn from(value: Record) -> Self {
        match value {
            Record::Transaction(r) => Records::Transactions(vec![r]),
            Record::Category(r) => Records::Categories(vec![r]),
            Record::Budget(r) => Records::Budgets(vec![r]),
            Record::Goal(r) => Records::Goals(vec![r]),
            Record::Setting(r) => Records::Settings(vec![r]),
        }
    }
}

/// Full content of a store: every record of every kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl Snapshot {
    /// Replace the records of the batch's kind.
    pub fn set(&mut self, records: Records) {
        match records {
            Records::Transactions(items) => self.transactions = items,
            Records::Categories(items) => self.categories = items,
            Records::Budgets(items) => self.budgets = items,
            Records::Goals(items) => self.goals = items,
            Records::Settings(items) => self.settings = items,
        }
    }

    /// Split the snapshot into one batch per kind, in [`RecordKind::ALL`] order.
    #[must_use]
    pub fn into_batches(self) -> Vec<Records> {
        vec![
            Records::Transactions(self.transactions),
            Records::Categories(self.categories),
            Records::Budgets(self.budgets),
            Records::Goals(self.goals),
            Records::Settings(self.settings),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryType, TransactionType};

    #[test]
    fn snapshot_batches_follow_kind_order() {
        let mut snapshot = Snapshot::default();
        snapshot.set(Records::Categories(vec![Category {
            id: "c1".to_string(),
            name: "Food".to_string(),
            icon: "Utensils".to_string(),
            color: "#ef4444".to_string(),
            kind: CategoryType::Expense,
            is_default: true,
        }]));
        snapshot.set(Records::Transactions(vec![Transaction {
            id: "t1".to_string(),
            amount: 3.5,
            kind: TransactionType::Expense,
            category_id: "c1".to_string(),
            currency: "USD".to_string(),
            date: "2024-03-01".to_string(),
            note: String::new(),
            created_at: "2024-03-01T00:00:00Z".to_string(),
        }]));

        let batches = snapshot.into_batches();
        let kinds: Vec<_> = batches.iter().map(Records::kind).collect();
        assert_eq!(kinds, RecordKind::ALL.to_vec());
        assert_eq!(batches[1].ids(), BTreeSet::from(["c1".to_string()]));
        assert_eq!(batches.iter().map(Records::len).sum::<usize>(), 2);
    }
}
