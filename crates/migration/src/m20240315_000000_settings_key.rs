//! Lookup index on `settings.key`.
//!
//! Key uniqueness is kept by the store when writing a setting, not by the
//! schema: a download replaces the table with whatever the remote holds and
//! must not fail on a duplicated key written by an older client.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Settings {
    Table,
    Key,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx-settings-key")
                    .table(Settings::Table)
                    .col(Settings::Key)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-settings-key")
                    .table(Settings::Table)
                    .to_owned(),
            )
            .await
    }
}
