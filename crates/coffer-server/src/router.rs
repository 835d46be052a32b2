use crate::handlers::{access, files, health};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::convert::Infallible;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries, part headers and the category field on
/// top of the file payload itself.
const MULTIPART_ENVELOPE_BYTES: u64 = 64 * 1024;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state
        .limits
        .max_bytes
        .saturating_add(MULTIPART_ENVELOPE_BYTES);
    let upload_limit = usize::try_from(upload_limit).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/upload",
            post(files::upload_file)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(upload_limit)),
        )
        .route("/file/{id}", get(files::download_file))
        .route("/categories", get(files::categories))
        .route("/files/{category}", get(files::files_in_category))
        .route("/verify-access", post(access::verify_access))
        .route("/approve/{token}", get(access::approve))
        .route("/check-approval/{token}", get(access::check_approval))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
