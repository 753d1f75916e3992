use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE crm.lead_status AS ENUM (
                'unassigned',
                'assigned',
                'active',
                'contacted',
                'follow_up',
                'converted',
                'completed',
                'not_interested',
                'removed'
            )",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.managers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                phone VARCHAR(50),
                department VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.employees (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                manager_id UUID REFERENCES crm.managers(id) ON DELETE SET NULL,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.lead_groups (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                assigned_to UUID REFERENCES crm.managers(id) ON DELETE SET NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // Deleting a group hard-deletes its leads
        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.leads (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255),
                phone VARCHAR(50) NOT NULL,
                department VARCHAR(255),
                status crm.lead_status NOT NULL DEFAULT 'unassigned',
                group_id UUID REFERENCES crm.lead_groups(id) ON DELETE CASCADE,
                user_id UUID REFERENCES crm.managers(id) ON DELETE SET NULL,
                assigned_to UUID REFERENCES crm.employees(id) ON DELETE SET NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.removed_leads (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                lead_id UUID NOT NULL REFERENCES crm.leads(id) ON DELETE CASCADE,
                employee_id UUID REFERENCES crm.employees(id) ON DELETE SET NULL,
                reason TEXT NOT NULL,
                lead_snapshot JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.company_settings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                caller_id VARCHAR(50),
                from_numbers TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS leads_group_id_idx ON crm.leads (group_id);
             CREATE INDEX IF NOT EXISTS leads_status_idx ON crm.leads (status);
             CREATE INDEX IF NOT EXISTS leads_created_at_idx ON crm.leads (created_at DESC, id DESC);",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP TABLE IF EXISTS crm.company_settings;
                 DROP TABLE IF EXISTS crm.removed_leads;
                 DROP TABLE IF EXISTS crm.leads;
                 DROP TABLE IF EXISTS crm.lead_groups;
                 DROP TABLE IF EXISTS crm.employees;
                 DROP TABLE IF EXISTS crm.managers;
                 DROP TYPE IF EXISTS crm.lead_status;",
            )
            .await?;

        Ok(())
    }
}
