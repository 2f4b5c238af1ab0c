pub use sea_orm_migration::prelude::*;

mod m20240301_000000_init;
mod m20240315_000000_settings_key;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000000_init::Migration),
            Box::new(m20240315_000000_settings_key::Migration),
        ]
    }
}
