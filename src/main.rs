use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("Starting up the call center CRM backend...");
    debug!("Runtime environment: {}", config.runtime_env());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    let shutdown = CancellationToken::new();
    let service_state = service::AppState::new(config, &db);
    let app_state = match web::AppState::new(service_state, shutdown.clone()) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to build the application state: {e:?}");
            std::process::exit(1);
        }
    };

    let reconciler = app_state
        .analysis_tracker
        .spawn_reconciler(app_state.database(), shutdown.child_token());

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown requested, stopping background work..."),
                Err(e) => error!("Failed to listen for the shutdown signal: {e}"),
            }
            shutdown.cancel();
        }
    });

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        shutdown.cancel();
    }

    if let Err(e) = reconciler.await {
        warn!("Analysis reconciler did not stop cleanly: {e}");
    }
    info!("Shut down");
}
