//! esas-api
//!
//! HTTP surface of the screening service. Runs under AWS Lambda or as a
//! plain TCP server.

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/symptoms", get(routes::symptoms::list_symptoms))
        .route(
            "/recommendations/{symptom}/{risk_level}",
            get(routes::recommendations::get_recommendation),
        )
        .route("/education", get(routes::education::search_education));

    // Anonymous writes are the only rate-limited routes.
    let guest = Router::new()
        .route(
            "/screenings/guest",
            post(routes::screenings::create_guest_screening),
        )
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::rate::limit,
        ));

    let protected = Router::new()
        .route("/accounts", post(routes::accounts::register))
        .route("/accounts/me", get(routes::accounts::me))
        .route(
            "/accounts/{account_id}/role",
            put(routes::accounts::set_role),
        )
        .route("/providers", post(routes::providers::create_provider))
        .route(
            "/patients",
            get(routes::patients::list_patients).post(routes::patients::create_patient),
        )
        .route("/patients/{id}", get(routes::patients::get_patient))
        .route(
            "/screenings",
            get(routes::screenings::list_screenings).post(routes::screenings::create_screening),
        )
        .route("/screenings/{id}", get(routes::screenings::get_screening))
        .route("/guest-link", post(routes::guest_link::link_guest))
        .route("/reports/{screening_id}", get(routes::reports::get_report))
        .route(
            "/reports/{screening_id}/export",
            post(routes::reports::export_report),
        )
        .route_layer(axum_mw::from_fn(middleware::auth::require_auth));

    Router::new()
        .merge(public)
        .merge(guest)
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
