use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(ResponseCache)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Votes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_response_cache_key")
                    .table(CacheTable::Table)
                    .col(CacheTable::CacheKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CacheTable::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoteTable::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CacheTable {
    #[sea_orm(iden = "response_cache")]
    Table,
    CacheKey,
}

#[derive(DeriveIden)]
enum VoteTable {
    #[sea_orm(iden = "votes")]
    Table,
}
