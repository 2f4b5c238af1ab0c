//! Local `goals` table.

use model::Goal;
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub currency: String,
    pub deadline: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(value: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            target_amount: ActiveValue::Set(value.target_amount),
            current_amount: ActiveValue::Set(value.current_amount),
            currency: ActiveValue::Set(value.currency.clone()),
            deadline: ActiveValue::Set(value.deadline.clone()),
            color: ActiveValue::Set(value.color.clone()),
        }
    }
}

impl From<Model> for Goal {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            target_amount: value.target_amount,
            current_amount: value.current_amount,
            currency: value.currency,
            deadline: value.deadline,
            color: value.color,
        }
    }
}
