use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use cloud::{MemoryDatabase, RemoteAdapter, RemoteDatabase, ResultRemote};
use model::{Category, CategoryType, Goal, RecordKind, Records, Transaction, TransactionType};
use serde_json::{Value, json};

/// Counts the writes that reach the wrapped database.
#[derive(Default)]
struct CountingDatabase {
    inner: MemoryDatabase,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
}

#[async_trait]
impl RemoteDatabase for CountingDatabase {
    async fn select(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<Value>> {
        self.inner.select(table, owner_id).await
    }

    async fn select_ids(&self, table: &str, owner_id: &str) -> ResultRemote<Vec<String>> {
        self.inner.select_ids(table, owner_id).await
    }

    async fn count(&self, table: &str, owner_id: &str) -> ResultRemote<u64> {
        self.inner.count(table, owner_id).await
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> ResultRemote<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(table, rows).await
    }

    async fn delete(&self, table: &str, owner_id: &str, ids: &[String]) -> ResultRemote<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(table, owner_id, ids).await
    }
}

fn transaction(id: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: 42.0,
        kind: TransactionType::Expense,
        category_id: "c1".to_string(),
        currency: "USD".to_string(),
        date: "2024-03-01".to_string(),
        note: String::new(),
        created_at: "2024-03-01T00:00:00Z".to_string(),
    }
}

fn category(id: &str) -> Category {
    Category {
        id: id.to_string(),
        name: format!("Category {id}"),
        icon: "Tag".to_string(),
        color: "#6b7280".to_string(),
        kind: CategoryType::Both,
        is_default: false,
    }
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn fetch_all_is_empty_for_unknown_owner() {
    let adapter = RemoteAdapter::new(Arc::new(MemoryDatabase::new()));
    let records = adapter
        .fetch_all("nobody", RecordKind::Goals)
        .await
        .unwrap();
    assert_eq!(records, Records::Goals(vec![]));
    assert!(!adapter.owner_has_any_data("nobody").await.unwrap());
}

#[tokio::test]
async fn upsert_all_round_trips_and_is_idempotent() {
    let adapter = RemoteAdapter::new(Arc::new(MemoryDatabase::new()));
    let batch = Records::Transactions(vec![transaction("t1"), transaction("t2")]);

    assert_eq!(adapter.upsert_all("u1", &batch).await.unwrap(), 2);
    assert_eq!(adapter.upsert_all("u1", &batch).await.unwrap(), 2);

    let fetched = adapter
        .fetch_all("u1", RecordKind::Transactions)
        .await
        .unwrap();
    assert_eq!(fetched, batch);
}

#[tokio::test]
async fn upsert_all_overwrites_existing_ids() {
    let adapter = RemoteAdapter::new(Arc::new(MemoryDatabase::new()));
    let goal = Goal {
        id: "g1".to_string(),
        name: "Trip".to_string(),
        target_amount: 2000.0,
        current_amount: 0.0,
        currency: "EUR".to_string(),
        deadline: "2025-06-01".to_string(),
        color: "#3b82f6".to_string(),
    };
    adapter
        .upsert_all("u1", &Records::Goals(vec![goal.clone()]))
        .await
        .unwrap();

    let funded = Goal {
        current_amount: 250.0,
        ..goal
    };
    adapter
        .upsert_all("u1", &Records::Goals(vec![funded.clone()]))
        .await
        .unwrap();

    assert_eq!(
        adapter.fetch_all("u1", RecordKind::Goals).await.unwrap(),
        Records::Goals(vec![funded])
    );
}

#[tokio::test]
async fn empty_batches_send_nothing() {
    let database = Arc::new(CountingDatabase::default());
    let adapter = RemoteAdapter::new(database.clone());

    assert_eq!(
        adapter
            .upsert_all("u1", &Records::empty(RecordKind::Budgets))
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        adapter
            .delete_except("u1", RecordKind::Budgets, &BTreeSet::new())
            .await
            .unwrap(),
        0
    );

    assert_eq!(database.upserts.load(Ordering::SeqCst), 0);
    assert_eq!(database.deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_except_removes_only_missing_ids() {
    let database = Arc::new(CountingDatabase::default());
    let adapter = RemoteAdapter::new(database.clone());
    adapter
        .upsert_all(
            "u1",
            &Records::Transactions(vec![transaction("t1"), transaction("t2"), transaction("t3")]),
        )
        .await
        .unwrap();

    let deleted = adapter
        .delete_except("u1", RecordKind::Transactions, &ids(&["t1", "t2"]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let remaining = adapter
        .fetch_all("u1", RecordKind::Transactions)
        .await
        .unwrap();
    assert_eq!(remaining.ids(), ids(&["t1", "t2"]));

    // Nothing left to delete, so no request goes out.
    adapter
        .delete_except("u1", RecordKind::Transactions, &ids(&["t1", "t2"]))
        .await
        .unwrap();
    assert_eq!(database.deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_except_never_touches_other_owners() {
    let adapter = RemoteAdapter::new(Arc::new(MemoryDatabase::new()));
    adapter
        .upsert_all("u1", &Records::Categories(vec![category("a")]))
        .await
        .unwrap();
    adapter
        .upsert_all("u2", &Records::Categories(vec![category("b")]))
        .await
        .unwrap();

    adapter
        .delete_except("u1", RecordKind::Categories, &BTreeSet::new())
        .await
        .unwrap();

    assert!(!adapter.owner_has_any_data("u1").await.unwrap());
    assert!(adapter.owner_has_any_data("u2").await.unwrap());
    assert_eq!(
        adapter
            .fetch_all("u2", RecordKind::Categories)
            .await
            .unwrap(),
        Records::Categories(vec![category("b")])
    );
}

#[tokio::test]
async fn numeric_text_is_read_as_number() {
    let database = Arc::new(MemoryDatabase::new());
    database
        .upsert(
            "budgets",
            vec![json!({
                "id": "b1",
                "user_id": "u1",
                "category_id": "c1",
                "amount": "125.50",
                "currency": "USD",
                "month": "2024-03",
            })],
        )
        .await
        .unwrap();

    let adapter = RemoteAdapter::new(database);
    let Records::Budgets(budgets) = adapter.fetch_all("u1", RecordKind::Budgets).await.unwrap()
    else {
        panic!("expected budgets");
    };
    assert_eq!(budgets[0].amount, 125.5);
}

#[tokio::test]
async fn malformed_rows_surface_as_errors() {
    let database = Arc::new(MemoryDatabase::new());
    database
        .upsert(
            "transactions",
            vec![json!({"id": "t1", "user_id": "u1", "amount": "lots"})],
        )
        .await
        .unwrap();

    let adapter = RemoteAdapter::new(database);
    let err = adapter
        .fetch_all("u1", RecordKind::Transactions)
        .await
        .unwrap_err();
    assert!(matches!(err, cloud::RemoteError::Mapping(_)));
}
