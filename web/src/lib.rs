use axum::http::{header, HeaderName, HeaderValue, Method};
use call_providers::traits::{analysis::Dispatcher, telephony::Provider};
use domain::analysis::{AnalysisTracker, Coordinator};
use domain::error::Error as DomainError;
use domain::gateway::{
    analysis_webhook::AnalysisWebhookClient, telephony_proxy::TelephonyProxyClient,
};
use domain::session::{FileSessionStore, MemorySessionStore, SessionStore};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
mod params;
pub mod router;
mod telephony_sessions;

pub use error::{Error, Result};
pub use telephony_sessions::TelephonySessions;

/// Web-layer state: the infrastructure state plus the long-lived collaborators the
/// controllers share. Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub session_store: Arc<dyn SessionStore>,
    pub analysis_tracker: AnalysisTracker,
    pub telephony_sessions: TelephonySessions,
    /// Cancelled on shutdown; every background loop listens on a child of it
    pub shutdown: CancellationToken,
    analysis: Option<Coordinator>,
    telephony: Option<Arc<dyn Provider>>,
}

impl AppState {
    /// Builds the state from configuration. The analysis webhook and telephony
    /// proxy are optional; the endpoints that need them answer with an error
    /// until they are configured.
    pub fn new(
        service_state: service::AppState,
        shutdown: CancellationToken,
    ) -> core::result::Result<Self, DomainError> {
        let config = &service_state.config;

        let session_store: Arc<dyn SessionStore> = match config.session_store_path() {
            Some(path) => {
                info!("Persisting sessions to {path}");
                Arc::new(FileSessionStore::new(path))
            }
            None => {
                warn!("SESSION_STORE_PATH is not set, sessions will not survive a restart");
                Arc::new(MemorySessionStore::new())
            }
        };

        let analysis_tracker = AnalysisTracker::from_config(config);
        let analysis = match config.analysis_webhook_url() {
            Some(url) => {
                let dispatcher: Arc<dyn Dispatcher> = Arc::new(AnalysisWebhookClient::new(&url)?);
                Some(Coordinator::new(
                    analysis_tracker.clone(),
                    dispatcher,
                    config.analysis_source(),
                ))
            }
            None => {
                warn!("ANALYSIS_WEBHOOK_URL is not set, call analysis is disabled");
                None
            }
        };

        let telephony = match config.telephony_proxy_url() {
            Some(url) => Some(Arc::new(TelephonyProxyClient::new(&url)?) as Arc<dyn Provider>),
            None => {
                warn!("TELEPHONY_PROXY_URL is not set, outbound calling is disabled");
                None
            }
        };

        Ok(Self::with_providers(
            service_state,
            session_store,
            analysis_tracker,
            analysis,
            telephony,
            shutdown,
        ))
    }

    pub fn with_providers(
        service_state: service::AppState,
        session_store: Arc<dyn SessionStore>,
        analysis_tracker: AnalysisTracker,
        analysis: Option<Coordinator>,
        telephony: Option<Arc<dyn Provider>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service_state,
            session_store,
            analysis_tracker,
            telephony_sessions: TelephonySessions::default(),
            shutdown,
            analysis,
            telephony,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn database(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.service_state.database_connection)
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }

    pub(crate) fn coordinator(&self) -> Result<&Coordinator> {
        self.analysis
            .as_ref()
            .ok_or_else(|| DomainError::config("ANALYSIS_WEBHOOK_URL is not configured").into())
    }

    pub(crate) fn telephony_provider(&self) -> Result<Arc<dyn Provider>> {
        self.telephony
            .clone()
            .ok_or_else(|| DomainError::config("TELEPHONY_PROXY_URL is not configured").into())
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config().clone();
    let host = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{host}:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    let shutdown = app_state.shutdown.clone();
    let app = router::define_routes(app_state).layer(cors_layer(&config));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(extractors::acting_user::SESSION_TOKEN_HEADER),
            HeaderName::from_static(extractors::webhook_secret::WEBHOOK_SECRET_HEADER),
        ])
        .allow_credentials(true)
}
