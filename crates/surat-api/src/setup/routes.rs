//! Route configuration.
//!
//! Public routes (health, tracking, docs) are merged with protected routes
//! behind the bearer-token middleware. State is applied inside the route
//! builders so handlers taking Multipart keep working.

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use surat_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

/// Set up all application routes.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config);
    let auth_state = Arc::new(AuthState::new(&config.jwt_secret, state.profiles.clone()));

    let public_routes = public_routes(state.clone());
    let protected_routes = protected_routes(state.clone())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    // Multipart bodies carry some framing overhead beyond the file itself.
    let body_limit = config.max_upload_size_bytes + 64 * 1024;

    let app = public_routes
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_origins.is_empty() || config.cors_origins.contains(&"*".to_string()) {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    }
}

/// Routes reachable without a token: health, the public tracking lookup,
/// and the OpenAPI document.
fn public_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/track", get(handlers::tracking::track_report))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        )
        .with_state(state)
}

/// Routes that require a verified bearer token.
fn protected_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            "/api/reports",
            post(handlers::reports::create_report)
                .get(handlers::reports::list_reports)
                // The update payload carries the report id in the body.
                .put(handlers::reports::update_report),
        )
        .route(
            "/api/reports/{id}",
            get(handlers::reports::get_report).delete(handlers::reports::delete_report),
        )
        .route(
            "/api/reports/{id}/forward",
            post(handlers::workflow::forward_to_coordinator),
        )
        .route(
            "/api/reports/{id}/assignments",
            post(handlers::workflow::assign_staff),
        )
        .route(
            "/api/reports/{id}/request-revision",
            post(handlers::workflow::request_revision),
        )
        .route(
            "/api/reports/{id}/approve-revisions",
            post(handlers::workflow::approve_revisions),
        )
        .route(
            "/api/reports/{id}/forward-tu",
            post(handlers::workflow::forward_to_tu),
        )
        .route(
            "/api/reports/{id}/finalize",
            post(handlers::workflow::finalize),
        )
        .route(
            "/api/assignments/{id}/submit",
            post(handlers::workflow::submit_work),
        )
        .route(
            "/api/assignments/{id}/revision",
            post(handlers::workflow::submit_revision),
        )
        .route(
            "/api/assignments/{id}/file",
            get(handlers::workflow::download_assignment_file),
        )
        .route("/api/upload", post(handlers::upload::upload_file))
        .route("/api/profiles", get(handlers::profiles::list_profiles))
        .route(
            "/api/profiles/{id}",
            put(handlers::profiles::update_profile),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use surat_storage::S3Storage;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec![],
            database_url: "postgres://localhost/surat_test".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: "test-secret-at-least-16-chars".to_string(),
            s3_bucket: "surat-documents".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: Some("http://localhost:9000".to_string()),
            max_upload_size_bytes: 10 * 1024 * 1024,
            presign_min_secs: 60,
            presign_max_secs: 3600,
        }
    }

    // Lazy pool + builder-only storage: routing can be exercised without a
    // database or an object store listening.
    fn test_state(config: &Config) -> Arc<AppState> {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let storage = Arc::new(
            S3Storage::new(
                config.s3_bucket.clone(),
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )
            .unwrap(),
        );
        Arc::new(AppState::new(config.clone(), pool, storage))
    }

    fn put_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_report_mounted_on_collection() {
        let config = test_config();
        let app = protected_routes(test_state(&config));

        // The route matches; without the auth layer the request dies at the
        // auth extractor, not in the router.
        let response = app
            .clone()
            .oneshot(put_request("/api/reports"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Updates go through the collection path only; the id lives in the
        // body, so a per-id PUT has nothing to route to.
        let uri = format!("/api/reports/{}", uuid::Uuid::new_v4());
        let response = app.oneshot(put_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_docs_routes_are_public() {
        let config = test_config();
        let app = setup_routes(&config, test_state(&config)).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
