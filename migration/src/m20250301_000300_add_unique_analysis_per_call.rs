use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One analysis job per call
        manager
            .get_connection()
            .execute_unprepared(
                "DROP INDEX IF EXISTS crm.analyses_call_id_idx;
                 CREATE UNIQUE INDEX IF NOT EXISTS analyses_call_id_key ON crm.analyses (call_id);",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP INDEX IF EXISTS crm.analyses_call_id_key;
                 CREATE INDEX IF NOT EXISTS analyses_call_id_idx ON crm.analyses (call_id);",
            )
            .await?;

        Ok(())
    }
}
