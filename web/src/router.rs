use crate::{controller::health_check_controller, params, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::controller::{
    analysis_controller, call_controller, company_setting_controller, employee_controller,
    lead_controller, lead_group_controller, manager_controller, session_controller,
    telephony_session_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// Global OpenAPI definition. A path or schema only shows up in the rendered
// document when it is listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Call Center CRM API"
        ),
        paths(
            analysis_controller::index,
            analysis_controller::result,
            call_controller::create,
            call_controller::classification,
            call_controller::delete,
            call_controller::countdown,
            call_controller::countdown_stream,
            call_controller::due_auto_calls,
            call_controller::analyze,
            company_setting_controller::read,
            company_setting_controller::update,
            employee_controller::index,
            employee_controller::create,
            employee_controller::delete,
            health_check_controller::health_check,
            lead_controller::index,
            lead_controller::create,
            lead_controller::import,
            lead_controller::update,
            lead_controller::assignment,
            lead_controller::removal,
            lead_controller::bulk_delete,
            lead_controller::status_indicator,
            lead_controller::calls,
            lead_controller::delete_follow_up,
            lead_group_controller::index,
            lead_group_controller::create,
            lead_group_controller::update,
            lead_group_controller::deletion_preview,
            lead_group_controller::delete,
            manager_controller::index,
            manager_controller::create,
            manager_controller::delete,
            session_controller::create,
            session_controller::read,
            session_controller::delete,
            telephony_session_controller::create,
            telephony_session_controller::read,
            telephony_session_controller::delete,
        ),
        components(
            schemas(
                domain::analyses::Model,
                domain::calls::Model,
                domain::company_settings::Model,
                domain::employees::Model,
                domain::lead_groups::Model,
                domain::leads::Model,
                domain::managers::Model,
                domain::call_outcome::CallOutcome,
                domain::analysis_status::AnalysisStatus,
                domain::lead_status::LeadStatus,
                params::analysis::ResultParams,
                params::call::CreateParams,
                params::call::ClassificationParams,
                params::company_setting::UpdateParams,
                params::lead::CreateParams,
                params::lead::AssignmentParams,
                params::lead::ImportParams,
                params::lead::UpdateParams,
                params::lead::RemovalParams,
                params::lead::BulkDeleteParams,
                params::session::LoginParams,
                params::telephony_session::CreateParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "crm_platform", description = "Call Center Lead & Call Management API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Session tokens for people, a shared secret for the analysis service's callbacks.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    crate::extractors::acting_user::SESSION_TOKEN_HEADER,
                    "Token returned in the data of a successful POST /session",
                ))),
            );
            components.add_security_scheme(
                "webhook_secret",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    crate::extractors::webhook_secret::WEBHOOK_SECRET_HEADER,
                    "Shared secret configured as ANALYSIS_WEBHOOK_SECRET",
                ))),
            );
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(analysis_routes(app_state.clone()))
        .merge(call_routes(app_state.clone()))
        .merge(company_setting_routes(app_state.clone()))
        .merge(employee_routes(app_state.clone()))
        .merge(health_routes())
        .merge(lead_group_routes(app_state.clone()))
        .merge(lead_routes(app_state.clone()))
        .merge(manager_routes(app_state.clone()))
        .merge(session_routes(app_state.clone()))
        .merge(telephony_session_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn analysis_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/analyses", get(analysis_controller::index))
        .route("/analyses/{id}/result", put(analysis_controller::result))
        .with_state(app_state)
}

fn call_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/calls", post(call_controller::create))
        .route("/calls/due_auto_calls", get(call_controller::due_auto_calls))
        .route("/calls/{id}", delete(call_controller::delete))
        .route(
            "/calls/{id}/classification",
            put(call_controller::classification),
        )
        .route("/calls/{id}/countdown", get(call_controller::countdown))
        .route(
            "/calls/{id}/countdown/stream",
            get(call_controller::countdown_stream),
        )
        .route("/calls/{id}/analysis", post(call_controller::analyze))
        .with_state(app_state)
}

fn company_setting_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/company_settings",
            get(company_setting_controller::read).put(company_setting_controller::update),
        )
        .with_state(app_state)
}

fn employee_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/employees", get(employee_controller::index))
        .route("/employees", post(employee_controller::create))
        .route("/employees/{id}", delete(employee_controller::delete))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn lead_group_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/lead_groups", get(lead_group_controller::index))
        .route("/lead_groups", post(lead_group_controller::create))
        .route("/lead_groups/{id}", put(lead_group_controller::update))
        .route("/lead_groups/{id}", delete(lead_group_controller::delete))
        .route(
            "/lead_groups/{id}/deletion_preview",
            get(lead_group_controller::deletion_preview),
        )
        .with_state(app_state)
}

fn lead_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/leads", get(lead_controller::index))
        .route("/leads", post(lead_controller::create))
        .route("/leads/import", post(lead_controller::import))
        .route("/leads/bulk_delete", post(lead_controller::bulk_delete))
        .route("/leads/{id}", put(lead_controller::update))
        .route("/leads/{id}/assignment", put(lead_controller::assignment))
        .route("/leads/{id}/removal", post(lead_controller::removal))
        .route(
            "/leads/{id}/status_indicator",
            get(lead_controller::status_indicator),
        )
        .route("/leads/{id}/calls", get(lead_controller::calls))
        .route(
            "/leads/{id}/follow_up",
            delete(lead_controller::delete_follow_up),
        )
        .with_state(app_state)
}

fn manager_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/managers", get(manager_controller::index))
        .route("/managers", post(manager_controller::create))
        .route("/managers/{id}", delete(manager_controller::delete))
        .with_state(app_state)
}

fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/session",
            post(session_controller::create)
                .get(session_controller::read)
                .delete(session_controller::delete),
        )
        .with_state(app_state)
}

fn telephony_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/telephony_sessions",
            post(telephony_session_controller::create),
        )
        .route(
            "/telephony_sessions/{id}",
            get(telephony_session_controller::read).delete(telephony_session_controller::delete),
        )
        .with_state(app_state)
}
