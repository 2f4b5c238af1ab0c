//! Default data for a fresh store.

use std::collections::HashSet;

use model::{Category, CategoryType, DEFAULT_CURRENCY_KEY, FALLBACK_CURRENCY, RecordKind, Setting};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{ResultStore, Store, categories, local::clear_table, settings, with_tx};

/// (name, icon, color, type) of every seeded category.
const DEFAULT_CATEGORIES: &[(&str, &str, &str, CategoryType)] = &[
    ("Housing", "Home", "#3b82f6", CategoryType::Expense),
    ("Food & Dining", "UtensilsCrossed", "#ef4444", CategoryType::Expense),
    ("Transport", "Car", "#06b6d4", CategoryType::Expense),
    ("Utilities", "Zap", "#f59e0b", CategoryType::Expense),
    ("Entertainment", "Gamepad2", "#8b5cf6", CategoryType::Expense),
    ("Shopping", "ShoppingBag", "#ec4899", CategoryType::Expense),
    ("Health", "Heart", "#f43f5e", CategoryType::Expense),
    ("Education", "GraduationCap", "#6366f1", CategoryType::Expense),
    ("Subscriptions", "CreditCard", "#14b8a6", CategoryType::Expense),
    ("Other", "MoreHorizontal", "#6b7280", CategoryType::Expense),
    ("Salary", "Briefcase", "#22c55e", CategoryType::Income),
    ("Freelance", "Laptop", "#10b981", CategoryType::Income),
    ("Gifts", "Gift", "#a855f7", CategoryType::Income),
    ("Investments", "TrendingUp", "#f97316", CategoryType::Income),
    ("Other Income", "MoreHorizontal", "#6b7280", CategoryType::Income),
];

/// What [`Store::seed_defaults`] changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Seeded {
    pub duplicate_categories_removed: usize,
    pub categories_inserted: usize,
    pub settings_inserted: usize,
}

impl Store {
    /// Make sure the store holds the default categories and a default
    /// currency.
    ///
    /// Categories sharing a name and type are collapsed first (the one with
    /// the smallest id survives). Defaults are only inserted into empty
    /// tables, so running this on an existing store is a no-op.
    pub async fn seed_defaults(&self) -> ResultStore<Seeded> {
        let seeded = with_tx!(self, |db_tx| {
            let mut seeded = Seeded::default();

            let existing = categories::Entity::find()
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?;
            let mut seen = HashSet::new();
            let duplicates: Vec<String> = existing
                .into_iter()
                .filter(|model| !seen.insert((model.name.clone(), model.kind.clone())))
                .map(|model| model.id)
                .collect();
            if !duplicates.is_empty() {
                seeded.duplicate_categories_removed = duplicates.len();
                categories::Entity::delete_many()
                    .filter(categories::Column::Id.is_in(duplicates))
                    .exec(&db_tx)
                    .await?;
            }

            if categories::Entity::find().count(&db_tx).await? == 0 {
                let defaults: Vec<categories::ActiveModel> = DEFAULT_CATEGORIES
                    .iter()
                    .map(|(name, icon, color, kind)| Category {
                        id: Uuid::new_v4().to_string(),
                        name: (*name).to_string(),
                        icon: (*icon).to_string(),
                        color: (*color).to_string(),
                        kind: *kind,
                        is_default: true,
                    })
                    .map(|category| categories::ActiveModel::from(&category))
                    .collect();
                seeded.categories_inserted = defaults.len();
                categories::Entity::insert_many(defaults)
                    .exec_without_returning(&db_tx)
                    .await?;
            }

            if settings::Entity::find().count(&db_tx).await? == 0 {
                let setting = Setting {
                    id: Uuid::new_v4().to_string(),
                    key: DEFAULT_CURRENCY_KEY.to_string(),
                    value: FALLBACK_CURRENCY.to_string(),
                };
                settings::ActiveModel::from(&setting).insert(&db_tx).await?;
                seeded.settings_inserted = 1;
            }

            Ok::<_, crate::StoreError>(seeded)
        })?;

        if seeded != Seeded::default() {
            tracing::info!(
                duplicates = seeded.duplicate_categories_removed,
                categories = seeded.categories_inserted,
                settings = seeded.settings_inserted,
                "seeded local store"
            );
        }
        Ok(seeded)
    }

    /// Delete every record of every kind, then restore the defaults.
    pub async fn clear_all(&self) -> ResultStore<Seeded> {
        with_tx!(self, |db_tx| {
            for kind in RecordKind::ALL {
                clear_table(&db_tx, kind).await?;
            }
            Ok::<_, crate::StoreError>(())
        })?;
        tracing::info!("cleared local store");
        self.seed_defaults().await
    }
}
