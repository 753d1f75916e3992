use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE crm.call_outcome AS ENUM (
                'interested',
                'not_interested',
                'follow_up',
                'converted',
                'lost',
                'completed',
                'not_answered',
                'failed'
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TYPE crm.analysis_status AS ENUM (
                'pending',
                'processing',
                'completed',
                'failed'
            )",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.call_history (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                lead_id UUID NOT NULL REFERENCES crm.leads(id) ON DELETE CASCADE,
                employee_id UUID NOT NULL REFERENCES crm.employees(id) ON DELETE CASCADE,
                outcome crm.call_outcome NOT NULL DEFAULT 'completed',
                notes TEXT NOT NULL DEFAULT '',
                call_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                next_follow_up TIMESTAMPTZ,
                auto_call_followup BOOLEAN NOT NULL DEFAULT FALSE,
                call_sid VARCHAR(64),
                from_number VARCHAR(50),
                to_number VARCHAR(50),
                duration_seconds INTEGER,
                recording_url TEXT,
                provider_status VARCHAR(32),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.recordings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                owner_id UUID NOT NULL REFERENCES crm.employees(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                filename VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (owner_id, url)
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS crm.analyses (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                recording_id UUID NOT NULL REFERENCES crm.recordings(id) ON DELETE CASCADE,
                call_id UUID REFERENCES crm.call_history(id) ON DELETE CASCADE,
                status crm.analysis_status NOT NULL DEFAULT 'pending',
                sentiment_score DOUBLE PRECISION,
                engagement_score DOUBLE PRECISION,
                confidence_score_executive DOUBLE PRECISION,
                confidence_score_person DOUBLE PRECISION,
                summary TEXT,
                error_message TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // Latest-call lookups order by created_at then id
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS call_history_lead_latest_idx
                ON crm.call_history (lead_id, created_at DESC, id DESC);
             CREATE INDEX IF NOT EXISTS call_history_due_follow_up_idx
                ON crm.call_history (next_follow_up) WHERE auto_call_followup;
             CREATE INDEX IF NOT EXISTS analyses_call_id_idx ON crm.analyses (call_id);",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP TABLE IF EXISTS crm.analyses;
                 DROP TABLE IF EXISTS crm.recordings;
                 DROP TABLE IF EXISTS crm.call_history;
                 DROP TYPE IF EXISTS crm.analysis_status;
                 DROP TYPE IF EXISTS crm.call_outcome;",
            )
            .await?;

        Ok(())
    }
}
