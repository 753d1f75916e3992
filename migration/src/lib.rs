pub use sea_orm_migration::prelude::*;

mod m20250301_000000_create_schema_and_base_db_setup;
mod m20250301_000100_create_people_and_lead_tables;
mod m20250301_000200_create_call_and_analysis_tables;
mod m20250301_000300_add_unique_analysis_per_call;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000000_create_schema_and_base_db_setup::Migration),
            Box::new(m20250301_000100_create_people_and_lead_tables::Migration),
            Box::new(m20250301_000200_create_call_and_analysis_tables::Migration),
            Box::new(m20250301_000300_add_unique_analysis_per_call::Migration),
        ]
    }
}
