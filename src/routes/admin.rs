use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Platform management. Every handler here runs the admin guard itself, so a
/// signed-in non-admin gets 403 with a redirect to their role home and an
/// anonymous caller gets 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/users?query=...
        .route("/users", get(handlers::list_users))
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        // POST /admin/categories
        .route("/categories", post(handlers::add_category))
        // Rename and delete cascade into every agency's category set.
        .route(
            "/categories/{name}",
            put(handlers::rename_category).delete(handlers::delete_category),
        )
}
