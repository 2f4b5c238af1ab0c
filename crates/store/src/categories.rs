//! Local `categories` table.

use model::{Category, CategoryType};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub kind: String,
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            icon: ActiveValue::Set(value.icon.clone()),
            color: ActiveValue::Set(value.color.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            is_default: ActiveValue::Set(value.is_default),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = StoreError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: CategoryType::try_from(value.kind.as_str())?,
            id: value.id,
            name: value.name,
            icon: value.icon,
            color: value.color,
            is_default: value.is_default,
        })
    }
}
