use crate::{
    AppState,
    access::{self, GateOutcome, RouteGuard},
    auth::AuthUser,
    error::AppError,
    filter,
    models::{
        Agency, AgencyListing, AgencyRequest, CategoryRequest, Conversation, DashboardStats,
        LoginRequest, Message, PlatformSettings, RegisterRequest, Role, SearchFilters,
        SendMessageRequest, StartConversationRequest, UpdateAgencyRequest, UpdateProfileRequest,
        UpdateSettingsRequest, User, UserSearch,
    },
    subscription::{self, PlanQuery, PlanQuote, SubscribeRequest, SubscriptionCheckout},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Guards ---

fn admin_only() -> RouteGuard {
    RouteGuard::only(&[Role::Admin])
}

fn agency_managers() -> RouteGuard {
    RouteGuard::only(&[Role::Admin, Role::Agency])
}

fn agency_only() -> RouteGuard {
    RouteGuard::only(&[Role::Agency])
}

/// Rejects category sets larger than the platform limit.
fn check_category_limit(category: &[String], settings: &PlatformSettings) -> Result<(), AppError> {
    if category.len() > settings.max_categories {
        return Err(AppError::BadRequest(format!(
            "An agency may list at most {} categories.",
            settings.max_categories
        )));
    }
    Ok(())
}

/// checked_categories
///
/// Turns a requested category list into a set drawn from the managed
/// categories: first occurrence wins, unknown names are refused, and the
/// platform limit applies to the deduplicated set.
async fn checked_categories(
    state: &AppState,
    requested: Vec<String>,
) -> Result<Vec<String>, AppError> {
    let known = state.repo.list_categories().await;
    let mut category: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !known.contains(&name) {
            return Err(AppError::BadRequest(format!("Unknown category: {}", name)));
        }
        if !category.contains(&name) {
            category.push(name);
        }
    }
    check_category_limit(&category, &state.repo.get_settings().await)?;
    Ok(category)
}

fn non_blank(text: String, what: &str) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", what)));
    }
    Ok(trimmed.to_string())
}

// --- Access ---

/// AccessQuery
///
/// The location the browser router is about to render.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Defaults to `/` when omitted.
    #[serde(default = "root_path")]
    pub path: String,
}

fn root_path() -> String {
    "/".to_string()
}

/// AccessDecision
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessDecision {
    pub location: String,
    pub decision: GateOutcome,
}

/// check_access
///
/// [Public Route] Answers the browser router's "may I render this view" question
/// using the protected-route table. Anonymous callers get `redirect_to_login`
/// for protected paths, carrying the requested location for redirect-back.
#[utoipa::path(
    get,
    path = "/access",
    params(AccessQuery),
    responses((status = 200, description = "Gate decision", body = AccessDecision))
)]
pub async fn check_access(
    viewer: Option<AuthUser>,
    Query(AccessQuery { path }): Query<AccessQuery>,
) -> Json<AccessDecision> {
    let decision = access::check_route(&AuthUser::snapshot(viewer.as_ref()), &path);
    Json(AccessDecision {
        location: path,
        decision,
    })
}

// --- Accounts ---

/// login
///
/// [Public Route] Mock sign-in. The account is resolved by email alone; the
/// returned `id` is what the client sends back in the `x-user-id` header.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = User),
        (status = 401, description = "Unknown account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .ok_or(AppError::Unauthenticated)?;
    tracing::info!(user_id = %user.id, role = %user.role, "login");
    Ok(Json(user))
}

/// register_user
///
/// [Public Route] Creates a visitor or agency account. Admin accounts cannot be
/// self-registered, and registration is refused while signups are disabled.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = User),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    if !state.repo.get_settings().await.allow_signups {
        return Err(AppError::Disabled(
            "New signups are currently disabled".to_string(),
        ));
    }

    let role = payload.role.unwrap_or(Role::Visitor);
    if role == Role::Admin {
        return Err(AppError::BadRequest(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: payload.email,
        name: payload.name,
        role,
        agency_id: None,
        created_at: Utc::now(),
    };
    let created = state.repo.create_user(user).await?;
    tracing::info!(user_id = %created.id, role = %created.role, "account registered");
    Ok(Json(created))
}

/// get_me
///
/// [Authenticated Route] The signed-in account.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    state
        .repo
        .get_user(&id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("user"))
}

/// update_me
///
/// [Authenticated Route] Partial profile update (name, email).
#[utoipa::path(
    put,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    let user = state.repo.update_user(&id, payload).await?;
    Ok(Json(user))
}

/// get_my_agency
///
/// [Authenticated Route] The agency record managed by an agency account.
#[utoipa::path(
    get,
    path = "/me/agency",
    responses(
        (status = 200, description = "Managed agency", body = Agency),
        (status = 403, description = "Not an agency account"),
        (status = 404, description = "No agency linked")
    )
)]
pub async fn get_my_agency(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Agency>, AppError> {
    user.authorize(&agency_only(), "/agency-profile")?;
    let agency_id = user.agency_id.as_deref().ok_or(AppError::NotFound("agency"))?;
    state
        .repo
        .get_agency(agency_id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("agency"))
}

// --- Agencies ---

/// list_agencies
///
/// [Authenticated Route] The directory listing. Facet filters and the free-text
/// query compose by AND; the response also carries the active-filter chips and
/// the query strings for removing one chip or clearing all facets.
#[utoipa::path(
    get,
    path = "/agencies",
    params(SearchFilters),
    responses((status = 200, description = "Filtered agencies", body = AgencyListing))
)]
pub async fn list_agencies(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> Json<AgencyListing> {
    if !filters.is_empty() {
        tracing::debug!(filters = %filters.to_query_string(), "filtered listing");
    }
    let records = state.repo.list_agencies().await;
    let agencies: Vec<Agency> = filter::apply(&records, &filters)
        .into_iter()
        .cloned()
        .collect();

    Json(AgencyListing {
        total: agencies.len(),
        agencies,
        active_filters: filter::describe_active_filters(&filters),
        reset_query: filter::reset(&filters).to_query_string(),
        filters,
    })
}

/// get_agency
///
/// [Authenticated Route] A single agency.
#[utoipa::path(
    get,
    path = "/agencies/{id}",
    params(("id" = String, Path, description = "Agency ID")),
    responses(
        (status = 200, description = "Found", body = Agency),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_agency(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Agency>, AppError> {
    state
        .repo
        .get_agency(&id)
        .await
        .map(Json)
        .ok_or(AppError::NotFound("agency"))
}

/// create_agency
///
/// [Authenticated Route] Admins and agency accounts may add agencies. An agency
/// account becomes the owner of what it creates, and may own only one.
/// Categories must come from the managed list; duplicates collapse.
#[utoipa::path(
    post,
    path = "/agencies",
    request_body = AgencyRequest,
    responses(
        (status = 200, description = "Created", body = Agency),
        (status = 400, description = "Unknown category or too many categories"),
        (status = 403, description = "Role not permitted"),
        (status = 409, description = "Agency account already owns an agency"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_agency(
    user: AuthUser,
    State(state): State<AppState>,
    Json(mut payload): Json<AgencyRequest>,
) -> Result<Json<Agency>, AppError> {
    user.authorize(&agency_managers(), "/add-agency")?;
    payload.validate()?;
    payload.category = checked_categories(&state, std::mem::take(&mut payload.category)).await?;

    let owner = (user.role == Role::Agency).then(|| user.id.clone());
    let agency = state.repo.create_agency(payload, owner).await?;
    tracing::info!(agency_id = %agency.id, user_id = %user.id, "agency created");
    Ok(Json(agency))
}

/// update_agency
///
/// [Authenticated Route] Partial update. Admins may edit any agency; an agency
/// account only its own.
#[utoipa::path(
    put,
    path = "/agencies/{id}",
    params(("id" = String, Path, description = "Agency ID")),
    request_body = UpdateAgencyRequest,
    responses(
        (status = 200, description = "Updated", body = Agency),
        (status = 403, description = "Not permitted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_agency(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut payload): Json<UpdateAgencyRequest>,
) -> Result<Json<Agency>, AppError> {
    if !user.can_edit_agency(&id) {
        return Err(user.forbidden());
    }
    payload.validate()?;
    if let Some(category) = payload.category.take() {
        payload.category = Some(checked_categories(&state, category).await?);
    }

    let agency = state
        .repo
        .update_agency(&id, payload)
        .await
        .ok_or(AppError::NotFound("agency"))?;
    tracing::info!(agency_id = %agency.id, user_id = %user.id, "agency updated");
    Ok(Json(agency))
}

/// delete_agency
///
/// [Authenticated Route] Same permission as editing.
#[utoipa::path(
    delete,
    path = "/agencies/{id}",
    params(("id" = String, Path, description = "Agency ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not permitted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_agency(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !user.can_edit_agency(&id) {
        return Err(user.forbidden());
    }
    if state.repo.delete_agency(&id).await {
        tracing::info!(agency_id = %id, user_id = %user.id, "agency deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("agency"))
    }
}

// --- Categories ---

/// list_categories
///
/// [Public Route] Category names available to agencies.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [String]))
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.repo.list_categories().await)
}

/// add_category
///
/// [Admin Route] Adds a category. Returns the updated list.
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Added", body = [String]),
        (status = 409, description = "Duplicate")
    )
)]
pub async fn add_category(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    user.authorize(&admin_only(), "/manage-categories")?;
    let name = non_blank(payload.name, "Category name")?;
    let categories = state.repo.add_category(name.clone()).await?;
    tracing::info!(category = %name, "category added");
    Ok(Json(categories))
}

/// rename_category
///
/// [Admin Route] Renames a category everywhere it is used.
#[utoipa::path(
    put,
    path = "/admin/categories/{name}",
    params(("name" = String, Path, description = "Current category name")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Renamed", body = [String]),
        (status = 404, description = "Unknown category"),
        (status = 409, description = "Duplicate")
    )
)]
pub async fn rename_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(current): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    user.authorize(&admin_only(), "/manage-categories")?;
    let name = non_blank(payload.name, "Category name")?;
    let categories = state.repo.rename_category(&current, name.clone()).await?;
    tracing::info!(from = %current, to = %name, "category renamed");
    Ok(Json(categories))
}

/// delete_category
///
/// [Admin Route] Removes a category and strips it from every agency.
#[utoipa::path(
    delete,
    path = "/admin/categories/{name}",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Deleted", body = [String]),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn delete_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    user.authorize(&admin_only(), "/manage-categories")?;
    let categories = state.repo.delete_category(&name).await?;
    tracing::info!(category = %name, "category deleted");
    Ok(Json(categories))
}

// --- Admin ---

/// list_users
///
/// [Admin Route] All accounts, optionally narrowed by a case-insensitive
/// substring of name or email.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(UserSearch),
    responses((status = 200, description = "Users", body = [User]))
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(search): Query<UserSearch>,
) -> Result<Json<Vec<User>>, AppError> {
    user.authorize(&admin_only(), "/admin")?;
    let users = state.repo.list_users().await;
    let users = match search.query.map(|q| q.to_lowercase()) {
        Some(needle) => users
            .into_iter()
            .filter(|u| {
                filter::contains_lowercase(&u.name, &needle)
                    || filter::contains_lowercase(&u.email, &needle)
            })
            .collect(),
        None => users,
    };
    Ok(Json(users))
}

/// get_settings
///
/// [Admin Route] Current platform settings.
#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "Settings", body = PlatformSettings))
)]
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PlatformSettings>, AppError> {
    user.authorize(&admin_only(), "/admin")?;
    Ok(Json(state.repo.get_settings().await))
}

/// update_settings
///
/// [Admin Route] Partial settings update.
#[utoipa::path(
    put,
    path = "/admin/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated", body = PlatformSettings),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<PlatformSettings>, AppError> {
    user.authorize(&admin_only(), "/admin")?;
    payload.validate()?;
    let settings = state.repo.update_settings(payload).await;
    tracing::info!(user_id = %user.id, "platform settings updated");
    Ok(Json(settings))
}

/// get_dashboard_stats
///
/// [Authenticated Route] Dashboard counters.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_dashboard_stats(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Json<DashboardStats> {
    Json(state.repo.get_stats().await)
}

// --- Messaging ---

/// list_conversations
///
/// [Authenticated Route] Threads the caller takes part in, either as the
/// viewer or as the account managing the agency side.
#[utoipa::path(
    get,
    path = "/conversations",
    responses((status = 200, description = "Conversations", body = [Conversation]))
)]
pub async fn list_conversations(
    AuthUser { id, agency_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Conversation>> {
    Json(
        state
            .repo
            .conversations_for(&id, agency_id.as_deref())
            .await,
    )
}

/// start_conversation
///
/// [Authenticated Route] Messages an agency, reusing the caller's existing
/// thread with it when there is one.
#[utoipa::path(
    post,
    path = "/conversations",
    request_body = StartConversationRequest,
    responses(
        (status = 200, description = "Conversation", body = Conversation),
        (status = 404, description = "Unknown agency")
    )
)]
pub async fn start_conversation(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<StartConversationRequest>,
) -> Result<Json<Conversation>, AppError> {
    payload.validate()?;
    let text = non_blank(payload.text, "Message")?;
    let conversation = state
        .repo
        .start_conversation(&id, &payload.agency_id, text)
        .await?;
    tracing::info!(conversation_id = %conversation.id, user_id = %id, "message sent");
    Ok(Json(conversation))
}

/// send_message
///
/// [Authenticated Route] Appends to a thread the caller takes part in.
/// Threads the caller cannot see answer 404.
#[utoipa::path(
    post,
    path = "/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Sent", body = Message),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn send_message(
    AuthUser { id, agency_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<Message>, AppError> {
    payload.validate()?;
    let text = non_blank(payload.text, "Message")?;
    let message = state
        .repo
        .send_message(&conversation_id, &id, agency_id.as_deref(), text)
        .await?;
    tracing::info!(conversation_id = %conversation_id, user_id = %id, "message sent");
    Ok(Json(message))
}

// --- Subscriptions ---

/// list_plans
///
/// [Public Route] All plans priced for the requested billing cycle.
#[utoipa::path(
    get,
    path = "/subscriptions/plans",
    params(PlanQuery),
    responses((status = 200, description = "Plans", body = [PlanQuote]))
)]
pub async fn list_plans(Query(query): Query<PlanQuery>) -> Json<Vec<PlanQuote>> {
    Json(
        subscription::plans()
            .iter()
            .map(|plan| plan.quote(query.billing_cycle))
            .collect(),
    )
}

/// subscribe
///
/// [Authenticated Route] An agency account picks a plan and is sent to checkout.
#[utoipa::path(
    post,
    path = "/me/subscription",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Checkout", body = SubscriptionCheckout),
        (status = 403, description = "Not an agency account"),
        (status = 404, description = "Unknown plan")
    )
)]
pub async fn subscribe(
    user: AuthUser,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionCheckout>, AppError> {
    user.authorize(&agency_only(), "/billing")?;
    let plan = subscription::find_plan(&payload.plan_id).ok_or(AppError::NotFound("plan"))?;
    tracing::info!(user_id = %user.id, plan = %plan.id, cycle = ?payload.billing_cycle, "plan selected");
    Ok(Json(SubscriptionCheckout {
        quote: plan.quote(payload.billing_cycle),
        checkout_path: "/billing".to_string(),
    }))
}
