//! Local `budgets` table.

use model::Budget;
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_id: String,
    pub amount: f64,
    pub currency: String,
    pub month: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            category_id: ActiveValue::Set(value.category_id.clone()),
            amount: ActiveValue::Set(value.amount),
            currency: ActiveValue::Set(value.currency.clone()),
            month: ActiveValue::Set(value.month.clone()),
        }
    }
}

impl From<Model> for Budget {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            category_id: value.category_id,
            amount: value.amount,
            currency: value.currency,
            month: value.month,
        }
    }
}
