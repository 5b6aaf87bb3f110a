use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Everything a signed-in viewer can reach. The router layer above rejects
/// requests without a resolvable session, so each handler receives an
/// `AuthUser` and only has to apply role and ownership rules.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile ---
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        // GET /me/agency
        // The agency record owned by an agency account.
        .route("/me/agency", get(handlers::get_my_agency))
        // POST /me/subscription
        // Plan selection for agency accounts; returns the checkout location.
        .route("/me/subscription", post(handlers::subscribe))
        // --- Directory ---
        // GET /agencies?query=...&category=...&country=...
        .route(
            "/agencies",
            get(handlers::list_agencies).post(handlers::create_agency),
        )
        // Edit and delete are limited to admins and the owning agency account.
        .route(
            "/agencies/{id}",
            get(handlers::get_agency)
                .put(handlers::update_agency)
                .delete(handlers::delete_agency),
        )
        .route("/dashboard/stats", get(handlers::get_dashboard_stats))
        // --- Messaging ---
        .route(
            "/conversations",
            get(handlers::list_conversations).post(handlers::start_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::send_message),
        )
}
