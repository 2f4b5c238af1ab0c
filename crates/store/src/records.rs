use model::{DEFAULT_CURRENCY_KEY, FALLBACK_CURRENCY, Goal, Record, RecordKind, Setting};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ResultStore, Store, StoreError, budgets, categories, goals, local::insert_records, settings,
    transactions, with_tx,
};

impl Store {
    /// Insert `record`, replacing any record of the same kind with the same id.
    pub async fn put(&self, record: Record) -> ResultStore<()> {
        with_tx!(self, |db_tx| {
            delete_by_id(&db_tx, record.kind(), record.id()).await?;
            insert_records(&db_tx, record.into()).await
        })
    }

    /// Delete one record.
    pub async fn delete(&self, kind: RecordKind, id: &str) -> ResultStore<()> {
        if delete_by_id(&self.database, kind, id).await? == 0 {
            return Err(StoreError::KeyNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Add `amount` to a goal's current amount and return the updated goal.
    ///
    /// Negative amounts withdraw from the goal.
    pub async fn fund_goal(&self, id: &str, amount: f64) -> ResultStore<Goal> {
        if !amount.is_finite() {
            return Err(StoreError::InvalidRecord(format!(
                "invalid funding amount: {amount}"
            )));
        }
        with_tx!(self, |db_tx| {
            let model = goals::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| StoreError::KeyNotFound(id.to_string()))?;
            let current_amount = model.current_amount + amount;
            let mut active: goals::ActiveModel = model.into();
            active.current_amount = ActiveValue::Set(current_amount);
            let updated = active.update(&db_tx).await?;
            Ok::<_, StoreError>(Goal::from(updated))
        })
    }

    /// Value of the setting `key`, if any.
    pub async fn setting(&self, key: &str) -> ResultStore<Option<String>> {
        let model = settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .order_by_asc(settings::Column::Id)
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.value))
    }

    /// Create or update the setting `key`. Duplicate rows for the same key
    /// are collapsed into one.
    pub async fn set_setting(&self, key: &str, value: &str) -> ResultStore<Setting> {
        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::InvalidRecord(
                "setting key must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let existing = settings::Entity::find()
                .filter(settings::Column::Key.eq(key))
                .order_by_asc(settings::Column::Id)
                .all(&db_tx)
                .await?;

            let mut existing = existing.into_iter();
            let setting = match existing.next() {
                Some(model) => {
                    let mut active: settings::ActiveModel = model.into();
                    active.value = ActiveValue::Set(value.to_string());
                    Setting::from(active.update(&db_tx).await?)
                }
                None => {
                    let setting = Setting {
                        id: Uuid::new_v4().to_string(),
                        key: key.to_string(),
                        value: value.to_string(),
                    };
                    settings::ActiveModel::from(&setting).insert(&db_tx).await?;
                    setting
                }
            };

            let duplicates: Vec<String> = existing.map(|m| m.id).collect();
            if !duplicates.is_empty() {
                settings::Entity::delete_many()
                    .filter(settings::Column::Id.is_in(duplicates))
                    .exec(&db_tx)
                    .await?;
            }
            Ok::<_, StoreError>(setting)
        })
    }

    /// The configured default currency, `USD` when unset.
    pub async fn default_currency(&self) -> ResultStore<String> {
        Ok(self
            .setting(DEFAULT_CURRENCY_KEY)
            .await?
            .unwrap_or_else(|| FALLBACK_CURRENCY.to_string()))
    }
}

async fn delete_by_id<C: ConnectionTrait>(conn: &C, kind: RecordKind, id: &str) -> ResultStore<u64> {
    let id = id.to_string();
    let result = match kind {
        RecordKind::Transactions => transactions::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Categories => categories::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Budgets => budgets::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Goals => goals::Entity::delete_by_id(id).exec(conn).await?,
        RecordKind::Settings => settings::Entity::delete_by_id(id).exec(conn).await?,
    };
    Ok(result.rows_affected)
}
