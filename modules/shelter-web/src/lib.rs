//! Dashboard web server: the filter-to-render pipeline behind axum routes,
//! plus a small JSON API over the record store gateway.

pub mod pipeline;
pub mod routes;
pub mod state;
pub mod templates;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub use state::{load_logo, AppState, Logo};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Dashboard
        .route("/", get(routes::dashboard_page))
        .route("/api/dashboard", get(routes::api_dashboard))
        .route("/export.csv", get(routes::export_csv))
        // Records API
        .route(
            "/api/animals",
            axum::routing::post(routes::create_animal)
                .patch(routes::update_animals)
                .delete(routes::delete_animals),
        )
        .with_state(state)
        // View state lives in the URL; never serve a cached page for another session
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method and path only; query strings carry filter state
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
