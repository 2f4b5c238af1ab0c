use serde::{Deserialize, Serialize};

use crate::MappingError;

/// Direction of money for a [`Transaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = MappingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(MappingError::UnknownVariant {
                field: "transaction type",
                value: other.to_string(),
            }),
        }
    }
}

/// Which transactions a [`Category`] can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Both,
}

impl CategoryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
            CategoryType::Both => "both",
        }
    }
}

impl TryFrom<&str> for CategoryType {
    type Error = MappingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            "both" => Ok(CategoryType::Both),
            other => Err(MappingError::UnknownVariant {
                field: "category type",
                value: other.to_string(),
            }),
        }
    }
}

/// A single income or expense.
///
/// `date` is a plain `YYYY-MM-DD` calendar string and `created_at` an RFC 3339
/// timestamp; both are kept verbatim so lexical ordering keeps working and
/// sync never rewrites them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: String,
    pub currency: String,
    pub date: String,
    #[serde(default)]
    pub note: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    /// Seeded rows the UI refuses to delete.
    pub is_default: bool,
}

/// Spending limit for one category in one `YYYY-MM` month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub amount: f64,
    pub currency: String,
    pub month: String,
}

/// A savings goal, funded incrementally through `current_amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub currency: String,
    pub deadline: String,
    pub color: String,
}

/// A key/value preference. Keys are unique within a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: String,
}
