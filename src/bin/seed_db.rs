//! Fills an empty database with a small, realistic call center: two managers,
//! their employees, a few lead groups with leads and the company calling settings.

use chrono::Utc;
use domain::error::Error;
use domain::lead::{AssignmentTarget, NewLead};
use domain::{
    company_setting, employee, employees, lead, lead_group, lead_groups, manager, managers, Id,
};
use log::{error, info};
use sea_orm::DatabaseConnection;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("Seeding database [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);

    if let Err(e) = seed_database(service_state.db_conn_ref()).await {
        error!("Seeding failed: {e:?}");
        std::process::exit(1);
    }
    info!("Seeding complete");
}

async fn seed_database(db: &DatabaseConnection) -> Result<(), Error> {
    let sales = seed_manager(db, "Maria Lopez", "maria.lopez@example.com", "Sales").await?;
    let renewals = seed_manager(db, "Dev Patel", "dev.patel@example.com", "Renewals").await?;

    let agent = seed_employee(db, sales.id, "Sam Carter", "sam.carter@example.com").await?;
    seed_employee(db, sales.id, "Ana Silva", "ana.silva@example.com").await?;
    seed_employee(db, renewals.id, "Lee Wong", "lee.wong@example.com").await?;

    let spring = seed_group(db, "Spring Campaign", Some(sales.id)).await?;
    let expiring = seed_group(db, "Expiring Contracts", Some(renewals.id)).await?;
    // Leads cannot be added here until a manager is assigned
    seed_group(db, "Trade Show Contacts", None).await?;

    let leads = [
        ("Northwind Traders", "+15550111", "Retail", spring.id, Some(agent.id)),
        ("Contoso Ltd", "+15550112", "Manufacturing", spring.id, None),
        ("Fabrikam Inc", "+15550113", "Logistics", spring.id, None),
        ("Tailspin Toys", "+15550114", "Retail", expiring.id, None),
        ("Wingtip Travel", "+15550115", "Hospitality", expiring.id, None),
    ];
    for (name, phone, department, group_id, assigned_to) in leads {
        lead::assign_lead(
            db,
            NewLead {
                name: name.to_owned(),
                email: None,
                phone: phone.to_owned(),
                department: Some(department.to_owned()),
                assigned_to,
            },
            AssignmentTarget {
                group_id: Some(group_id),
                manager_id: None,
            },
        )
        .await?;
    }

    company_setting::upsert(
        db,
        Some("+15550100".to_owned()),
        vec!["+15550101".to_owned(), "+15550102".to_owned()],
    )
    .await?;

    Ok(())
}

async fn seed_manager(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    department: &str,
) -> Result<managers::Model, Error> {
    let now = Utc::now();
    manager::create(
        db,
        managers::Model {
            id: Id::nil(),
            name: name.to_owned(),
            email: email.to_owned(),
            phone: None,
            department: Some(department.to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
}

async fn seed_employee(
    db: &DatabaseConnection,
    manager_id: Id,
    name: &str,
    email: &str,
) -> Result<employees::Model, Error> {
    let now = Utc::now();
    employee::create(
        db,
        employees::Model {
            id: Id::nil(),
            manager_id: Some(manager_id),
            name: name.to_owned(),
            email: email.to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
}

async fn seed_group(
    db: &DatabaseConnection,
    name: &str,
    assigned_to: Option<Id>,
) -> Result<lead_groups::Model, Error> {
    let now = Utc::now();
    Ok(lead_group::create(
        db,
        lead_groups::Model {
            id: Id::nil(),
            name: name.to_owned(),
            assigned_to,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?)
}
