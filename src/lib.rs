use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain rules. Pure functions over the models, no I/O.
pub mod access;
pub mod filter;
pub mod subscription;

// Data and services.
pub mod config;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod repository;

// HTTP surface.
pub mod auth;
pub mod handlers;
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every annotated handler, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::check_access, handlers::login, handlers::register_user, handlers::get_me,
        handlers::update_me, handlers::get_my_agency, handlers::list_agencies,
        handlers::get_agency, handlers::create_agency, handlers::update_agency,
        handlers::delete_agency, handlers::list_categories, handlers::add_category,
        handlers::rename_category, handlers::delete_category, handlers::list_users,
        handlers::get_settings, handlers::update_settings, handlers::get_dashboard_stats,
        handlers::list_conversations, handlers::start_conversation, handlers::send_message,
        handlers::list_plans, handlers::subscribe
    ),
    components(
        schemas(
            models::Role, models::User, models::Agency, models::SocialMedia,
            models::AgencyRequest, models::UpdateAgencyRequest, models::SearchFilters,
            models::FilterKey, models::FilterChip, models::AgencyListing,
            models::LoginRequest, models::RegisterRequest, models::UpdateProfileRequest,
            models::CategoryRequest, models::Message, models::Conversation,
            models::StartConversationRequest, models::SendMessageRequest,
            models::DashboardStats, models::PlatformSettings, models::UpdateSettingsRequest,
            access::GateOutcome, handlers::AccessDecision,
            subscription::BillingCycle, subscription::SubscriptionPlan,
            subscription::PlanQuote, subscription::SubscribeRequest,
            subscription::SubscriptionCheckout,
        )
    ),
    tags(
        (name = "agency-directory", description = "Real estate agency directory API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Data source. In-memory unless a different `Repository` is plugged in.
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

/// auth_middleware
///
/// Session gate for `authenticated_routes`. Extracting `AuthUser` is the whole
/// check: an absent or unknown `x-user-id` rejects with 401 before the
/// handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the route groups, the session layer and the observability stack.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Role checks for admin routes happen inside the handlers.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// One `http_request` span per request, tagged with the request id so every
/// log line of that request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    let viewer = request
        .headers()
        .get(auth::SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
        viewer = %viewer,
    )
}
