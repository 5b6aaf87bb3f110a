use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call without an `x-user-id` header: the session
/// gateway (login, register), the access gate itself and the read-only
/// catalogues the sign-up pages need.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe.
        .route("/health", get(|| async { "ok" }))
        // GET /access?path=...
        // Gate decision for a browser route. Answers anonymous callers too.
        .route("/access", get(handlers::check_access))
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register_user))
        .route("/categories", get(handlers::list_categories))
        // GET /subscriptions/plans?billing_cycle=monthly|yearly
        .route("/subscriptions/plans", get(handlers::list_plans))
}
