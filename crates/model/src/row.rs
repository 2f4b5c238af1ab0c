//! Remote row shapes.
//!
//! Remote rows use snake_case column names and carry the owning `user_id`.
//! Numeric columns may come back as JSON numbers or as text (Postgres
//! `numeric` is serialized as a string by some gateways), so every amount is
//! read through [`numeric`]. Optional text columns may be `null` and are
//! read through [`nullable_text`].

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Budget, Category, CategoryType, Goal, MappingError, RecordKind, Setting, Transaction,
    TransactionType,
};

/// A local record type with a remote row counterpart.
pub trait RemoteRecord: Sized {
    type Row: Serialize + DeserializeOwned;

    const KIND: RecordKind;

    fn to_row(&self, owner_id: &str) -> Self::Row;

    fn from_row(row: Self::Row) -> Self;
}

pub(crate) fn to_rows<T: RemoteRecord>(
    items: &[T],
    owner_id: &str,
) -> Result<Vec<Value>, MappingError> {
    items
        .iter()
        .map(|item| {
            serde_json::to_value(item.to_row(owner_id))
                .map_err(|source| MappingError::Row { kind: T::KIND, source })
        })
        .collect()
}

pub(crate) fn from_rows<T: RemoteRecord>(rows: Vec<Value>) -> Result<Vec<T>, MappingError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<T::Row>(row)
                .map(T::from_row)
                .map_err(|source| MappingError::Row { kind: T::KIND, source })
        })
        .collect()
}

/// Accept a JSON number or a numeric string.
pub fn numeric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid number {text:?}: {err}"))),
    }
}

/// Accept a string or `null`, which reads as an empty string.
pub fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    #[serde(deserialize_with = "numeric")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: String,
    pub currency: String,
    pub date: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub note: String,
    pub created_at: String,
}

impl RemoteRecord for Transaction {
    type Row = TransactionRow;

    const KIND: RecordKind = RecordKind::Transactions;

    fn to_row(&self, owner_id: &str) -> TransactionRow {
        TransactionRow {
            id: self.id.clone(),
            user_id: owner_id.to_string(),
            amount: self.amount,
            kind: self.kind,
            category_id: self.category_id.clone(),
            currency: self.currency.clone(),
            date: self.date.clone(),
            note: self.note.clone(),
            created_at: self.created_at.clone(),
        }
    }

    fn from_row(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            kind: row.kind,
            category_id: row.category_id,
            currency: row.currency,
            date: row.date,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    pub is_default: bool,
}

impl RemoteRecord for Category {
    type Row = CategoryRow;

    const KIND: RecordKind = RecordKind::Categories;

    fn to_row(&self, owner_id: &str) -> CategoryRow {
        CategoryRow {
            id: self.id.clone(),
            user_id: owner_id.to_string(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            kind: self.kind,
            is_default: self.is_default,
        }
    }

    fn from_row(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            color: row.color,
            kind: row.kind,
            is_default: row.is_default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRow {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    #[serde(deserialize_with = "numeric")]
    pub amount: f64,
    pub currency: String,
    pub month: String,
}

impl RemoteRecord for Budget {
    type Row = BudgetRow;

    const KIND: RecordKind = RecordKind::Budgets;

    fn to_row(&self, owner_id: &str) -> BudgetRow {
        BudgetRow {
            id: self.id.clone(),
            user_id: owner_id.to_string(),
            category_id: self.category_id.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            month: self.month.clone(),
        }
    }

    fn from_row(row: BudgetRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            amount: row.amount,
            currency: row.currency,
            month: row.month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(deserialize_with = "numeric")]
    pub target_amount: f64,
    #[serde(deserialize_with = "numeric")]
    pub current_amount: f64,
    pub currency: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub deadline: String,
    pub color: String,
}

impl RemoteRecord for Goal {
    type Row = GoalRow;

    const KIND: RecordKind = RecordKind::Goals;

    fn to_row(&self, owner_id: &str) -> GoalRow {
        GoalRow {
            id: self.id.clone(),
            user_id: owner_id.to_string(),
            name: self.name.clone(),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            currency: self.currency.clone(),
            deadline: self.deadline.clone(),
            color: self.color.clone(),
        }
    }

    fn from_row(row: GoalRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            target_amount: row.target_amount,
            current_amount: row.current_amount,
            currency: row.currency,
            deadline: row.deadline,
            color: row.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRow {
    pub id: String,
    pub user_id: String,
    pub key: String,
    pub value: String,
}

impl RemoteRecord for Setting {
    type Row = SettingRow;

    const KIND: RecordKind = RecordKind::Settings;

    fn to_row(&self, owner_id: &str) -> SettingRow {
        SettingRow {
            id: self.id.clone(),
            user_id: owner_id.to_string(),
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }

    fn from_row(row: SettingRow) -> Self {
        Self {
            id: row.id,
            key: row.key,
            value: row.value,
        }
    }
}
