// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, category, status},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, status, categories, admin).
/// * Auth layers are route layers, so unknown paths still answer 404.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_login = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(require_login.clone()),
        );

    let status_routes = Router::new()
        .route("/", get(status::list_statuses))
        .route("/categories", get(status::list_feed_categories))
        // Protected status routes
        .merge(
            Router::new()
                .route("/", post(status::create_status))
                .route("/bulk", post(status::bulk_create_statuses))
                .route("/categories", post(status::add_feed_category))
                .route("/categories/{name}", delete(status::delete_feed_category))
                .route(
                    "/{id}",
                    put(status::update_status).delete(status::delete_status),
                )
                .route_layer(require_login.clone()),
        );

    let category_routes = Router::new()
        .route("/", get(category::list_categories))
        // Admin-only category management
        .merge(
            Router::new()
                .route("/", post(category::create_category))
                .route("/bulk", post(category::bulk_create_categories))
                .route(
                    "/{id}",
                    put(category::update_category).delete(category::delete_category),
                )
                // Double middleware protection: Auth first, then Admin check
                .route_layer(middleware::from_fn(admin_middleware))
                .route_layer(require_login.clone()),
        );

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_user_role))
        .route("/statuses", get(admin::list_statuses))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(require_login);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/status", status_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
