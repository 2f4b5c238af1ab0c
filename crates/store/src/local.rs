use async_trait::async_trait;
use model::{Budget, Category, Goal, RecordKind, Records, Setting, Transaction};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryOrder, TransactionTrait,
};

use crate::{
    LocalStore, ResultStore, Store, budgets, categories, goals, settings, transactions, with_tx,
};

/// Rows per INSERT statement; keeps bind parameters under SQLite's limit.
const INSERT_CHUNK: usize = 100;

#[async_trait]
impl LocalStore for Store {
    async fn get_all(&self, kind: RecordKind) -> ResultStore<Records> {
        read_all(&self.database, kind).await
    }

    async fn replace_all(&self, records: Records) -> ResultStore<()> {
        with_tx!(self, |db_tx| {
            clear_table(&db_tx, records.kind()).await?;
            insert_records(&db_tx, records).await
        })
    }

    async fn clear(&self, kind: RecordKind) -> ResultStore<()> {
        clear_table(&self.database, kind).await
    }

    async fn bulk_insert(&self, records: Records) -> ResultStore<()> {
        with_tx!(self, |db_tx| insert_records(&db_tx, records).await)
    }
}

pub(crate) async fn read_all<C: ConnectionTrait>(
    conn: &C,
    kind: RecordKind,
) -> ResultStore<Records> {
    let records = match kind {
        RecordKind::Transactions => Records::Transactions(
            transactions::Entity::find()
                .order_by_asc(transactions::Column::Id)
                .all(conn)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultStore<_>>()?,
        ),
        RecordKind::Categories => Records::Categories(
            categories::Entity::find()
                .order_by_asc(categories::Column::Id)
                .all(conn)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect::<ResultStore<_>>()?,
        ),
        RecordKind::Budgets => Records::Budgets(
            budgets::Entity::find()
                .order_by_asc(budgets::Column::Id)
                .all(conn)
                .await?
                .into_iter()
                .map(Budget::from)
                .collect(),
        ),
        RecordKind::Goals => Records::Goals(
            goals::Entity::find()
                .order_by_asc(goals::Column::Id)
                .all(conn)
                .await?
                .into_iter()
                .map(Goal::from)
                .collect(),
        ),
        RecordKind::Settings => Records::Settings(
            settings::Entity::find()
                .order_by_asc(settings::Column::Id)
                .all(conn)
                .await?
                .into_iter()
                .map(Setting::from)
                .collect(),
        ),
    };
    Ok(records)
}

pub(crate) async fn clear_table<C: ConnectionTrait>(conn: &C, kind: RecordKind) -> ResultStore<()> {
    match kind {
        RecordKind::Transactions => transactions::Entity::delete_many().exec(conn).await?,
        RecordKind::Categories => categories::Entity::delete_many().exec(conn).await?,
        RecordKind::Budgets => budgets::Entity::delete_many().exec(conn).await?,
        RecordKind::Goals => goals::Entity::delete_many().exec(conn).await?,
        RecordKind::Settings => settings::Entity::delete_many().exec(conn).await?,
    };
    Ok(())
}

pub(crate) async fn insert_records<C: ConnectionTrait>(
    conn: &C,
    records: Records,
) -> ResultStore<()> {
    match records {
        Records::Transactions(items) => {
            insert_chunked(conn, items.iter().map(transactions::ActiveModel::from).collect()).await
        }
        Records::Categories(items) => {
            insert_chunked(conn, items.iter().map(categories::ActiveModel::from).collect()).await
        }
        Records::Budgets(items) => {
            insert_chunked(conn, items.iter().map(budgets::ActiveModel::from).collect()).await
        }
        Records::Goals(items) => {
            insert_chunked(conn, items.iter().map(goals::ActiveModel::from).collect()).await
        }
        Records::Settings(items) => {
            insert_chunked(conn, items.iter().map(settings::ActiveModel::from).collect()).await
        }
    }
}

async fn insert_chunked<C, A>(conn: &C, mut models: Vec<A>) -> ResultStore<()>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    while !models.is_empty() {
        let chunk: Vec<A> = models.drain(..models.len().min(INSERT_CHUNK)).collect();
        <A::Entity as EntityTrait>::insert_many(chunk)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}
