//! Local `transactions` table.

use model::{Transaction, TransactionType};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: f64,
    pub kind: String,
    pub category_id: String,
    pub currency: String,
    pub date: String,
    pub note: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(value: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            amount: ActiveValue::Set(value.amount),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            category_id: ActiveValue::Set(value.category_id.clone()),
            currency: ActiveValue::Set(value.currency.clone()),
            date: ActiveValue::Set(value.date.clone()),
            note: ActiveValue::Set(value.note.clone()),
            created_at: ActiveValue::Set(value.created_at.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = StoreError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: TransactionType::try_from(value.kind.as_str())?,
            id: value.id,
            amount: value.amount,
            category_id: value.category_id,
            currency: value.currency,
            date: value.date,
            note: value.note,
            created_at: value.created_at,
        })
    }
}
