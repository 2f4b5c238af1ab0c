//! Local `settings` table.

use model::Setting;
use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Setting> for ActiveModel {
    fn from(value: &Setting) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            key: ActiveValue::Set(value.key.clone()),
            value: ActiveValue::Set(value.value.clone()),
        }
    }
}

impl From<Model> for Setting {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            key: value.key,
            value: value.value,
        }
    }
}
