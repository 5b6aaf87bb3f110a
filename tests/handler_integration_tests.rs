use agency_directory::{
    AppState,
    access::GateOutcome,
    auth::AuthUser,
    config::AppConfig,
    error::AppError,
    handlers::{self, AccessQuery},
    models::{
        AgencyRequest, CategoryRequest, FilterKey, LoginRequest, RegisterRequest, Role,
        SearchFilters, SendMessageRequest, StartConversationRequest, UpdateAgencyRequest,
        UpdateSettingsRequest, UserSearch,
    },
    repository::{InMemoryRepository, Repository, RepositoryState},
    subscription::{BillingCycle, PlanQuery, SubscribeRequest},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::test;

// --- Test Fixtures ---

fn state() -> AppState {
    AppState {
        repo: Arc::new(InMemoryRepository::seeded()) as RepositoryState,
        config: AppConfig::default(),
    }
}

fn admin() -> AuthUser {
    AuthUser {
        id: "1".to_string(),
        role: Role::Admin,
        agency_id: None,
    }
}

fn agency_owner() -> AuthUser {
    AuthUser {
        id: "2".to_string(),
        role: Role::Agency,
        agency_id: Some("1".to_string()),
    }
}

fn visitor() -> AuthUser {
    AuthUser {
        id: "3".to_string(),
        role: Role::Visitor,
        agency_id: None,
    }
}

fn new_agency(category: &[&str]) -> AgencyRequest {
    AgencyRequest {
        name: "Harbour Homes".to_string(),
        email: "hello@harbour.test".to_string(),
        phone: "+64 9 555 0100".to_string(),
        address: "1 Quay Street".to_string(),
        city: "Auckland".to_string(),
        country: "New Zealand".to_string(),
        category: category.iter().map(|c| c.to_string()).collect(),
        ..AgencyRequest::default()
    }
}

fn status_of(err: AppError) -> StatusCode {
    err.into_response().status()
}

fn forbidden_redirect(err: AppError) -> String {
    match err {
        AppError::Forbidden { redirect } => redirect,
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

// --- Access ---

#[test]
async fn test_check_access_for_anonymous_and_signed_in() {
    let Json(decision) = handlers::check_access(
        None,
        Query(AccessQuery {
            path: "/messages".to_string(),
        }),
    )
    .await;
    assert_eq!(
        decision.decision,
        GateOutcome::RedirectToLogin {
            from: "/messages".to_string()
        }
    );

    let Json(decision) = handlers::check_access(
        Some(visitor()),
        Query(AccessQuery {
            path: "/manage-categories".to_string(),
        }),
    )
    .await;
    assert_eq!(
        decision.decision,
        GateOutcome::RedirectTo {
            path: "/".to_string()
        }
    );
}

// --- Accounts ---

#[test]
async fn test_login_by_email() {
    let Json(user) = handlers::login(
        State(state()),
        Json(LoginRequest {
            email: "agency@realestate.com".to_string(),
            password: "anything".to_string(),
        }),
    )
    .await
    .expect("seeded account should log in");
    assert_eq!(user.role, Role::Agency);
    assert_eq!(user.agency_id.as_deref(), Some("1"));

    let err = handlers::login(
        State(state()),
        Json(LoginRequest {
            email: "ghost@realestate.com".to_string(),
            password: String::new(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
}

#[test]
async fn test_register_rules() {
    let app = state();
    let request = |email: &str, role: Option<Role>| RegisterRequest {
        email: email.to_string(),
        name: "New Person".to_string(),
        password: "secret1".to_string(),
        role,
    };

    let Json(user) = handlers::register_user(State(app.clone()), Json(request("new@x.test", None)))
        .await
        .unwrap();
    assert_eq!(user.role, Role::Visitor);

    let dup = handlers::register_user(State(app.clone()), Json(request("NEW@x.test", None)))
        .await
        .unwrap_err();
    assert_eq!(status_of(dup), StatusCode::CONFLICT);

    let admin = handlers::register_user(
        State(app.clone()),
        Json(request("boss@x.test", Some(Role::Admin))),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(admin), StatusCode::BAD_REQUEST);

    app.repo
        .update_settings(UpdateSettingsRequest {
            allow_signups: Some(false),
            ..UpdateSettingsRequest::default()
        })
        .await;
    let closed = handlers::register_user(State(app), Json(request("late@x.test", None)))
        .await
        .unwrap_err();
    assert_eq!(status_of(closed), StatusCode::FORBIDDEN);
}

#[test]
async fn test_get_my_agency_for_agency_only() {
    let Json(agency) = handlers::get_my_agency(agency_owner(), State(state()))
        .await
        .unwrap();
    assert_eq!(agency.name, "Skyline Properties");

    let err = handlers::get_my_agency(admin(), State(state()))
        .await
        .unwrap_err();
    assert_eq!(forbidden_redirect(err), "/admin");
}

// --- Agencies ---

#[test]
async fn test_list_agencies_with_filters() {
    let Json(listing) = handlers::list_agencies(
        visitor(),
        State(state()),
        Query(SearchFilters {
            category: Some("Commercial".to_string()),
            country: Some("United States".to_string()),
            query: Some("sky".to_string()),
        }),
    )
    .await;

    assert_eq!(listing.total, 1);
    assert_eq!(listing.agencies[0].id, "1");
    assert_eq!(listing.active_filters.len(), 2);
    assert_eq!(listing.active_filters[1].remove, FilterKey::Country);
    assert_eq!(
        listing.active_filters[1].remove_query,
        "query=sky&category=Commercial"
    );
    assert_eq!(listing.reset_query, "query=sky");
}

#[test]
async fn test_create_agency_permissions() {
    let err = handlers::create_agency(visitor(), State(state()), Json(new_agency(&["Land"])))
        .await
        .unwrap_err();
    assert_eq!(forbidden_redirect(err), "/");

    let app = state();
    let Json(created) = handlers::create_agency(admin(), State(app.clone()), Json(new_agency(&["Land"])))
        .await
        .unwrap();
    assert_eq!(app.repo.get_agency(&created.id).await, Some(created));

    // The seeded agency account already manages agency "1".
    let err = handlers::create_agency(agency_owner(), State(app), Json(new_agency(&["Land"])))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::CONFLICT);
}

#[test]
async fn test_create_agency_validation_and_limits() {
    let mut invalid = new_agency(&["Land"]);
    invalid.email = "not-an-email".to_string();
    invalid.name = "A".to_string();
    let err = handlers::create_agency(admin(), State(state()), Json(invalid))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);

    let too_many = new_agency(&[
        "Residential",
        "Commercial",
        "Industrial",
        "Land",
        "Luxury",
        "Investment",
    ]);
    let err = handlers::create_agency(admin(), State(state()), Json(too_many))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_update_agency_ownership() {
    let app = state();
    let patch = || UpdateAgencyRequest {
        phone: Some("+1 555 000 1111".to_string()),
        ..UpdateAgencyRequest::default()
    };

    let Json(updated) = handlers::update_agency(
        agency_owner(),
        State(app.clone()),
        Path("1".to_string()),
        Json(patch()),
    )
    .await
    .unwrap();
    assert_eq!(updated.phone, "+1 555 000 1111");

    let err = handlers::update_agency(
        agency_owner(),
        State(app.clone()),
        Path("2".to_string()),
        Json(patch()),
    )
    .await
    .unwrap_err();
    assert_eq!(forbidden_redirect(err), "/dashboard");

    let err = handlers::update_agency(admin(), State(app), Path("404".to_string()), Json(patch()))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::NOT_FOUND);
}

#[test]
async fn test_update_agency_clears_and_sets_contact_fields() {
    let app = state();
    let patch: UpdateAgencyRequest = serde_json::from_value(serde_json::json!({
        "website": "",
        "state": null,
        "zip_code": "10002",
        "logo": "/logos/skyline.png"
    }))
    .unwrap();

    let Json(updated) =
        handlers::update_agency(admin(), State(app.clone()), Path("1".to_string()), Json(patch))
            .await
            .expect("clearing optional fields should be accepted");

    assert_eq!(updated.website, None);
    assert_eq!(updated.state, None);
    assert_eq!(updated.zip_code.as_deref(), Some("10002"));
    assert_eq!(updated.logo.as_deref(), Some("/logos/skyline.png"));
    // Absent keys are left alone.
    assert!(updated.description.is_some());
    assert_eq!(app.repo.get_agency("1").await, Some(updated));
}

#[test]
async fn test_update_agency_rejects_bad_website() {
    let patch: UpdateAgencyRequest =
        serde_json::from_value(serde_json::json!({ "website": "not a url" })).unwrap();
    let err = handlers::update_agency(admin(), State(state()), Path("1".to_string()), Json(patch))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
async fn test_agency_categories_form_a_known_set() {
    let app = state();
    let Json(created) = handlers::create_agency(
        admin(),
        State(app.clone()),
        Json(new_agency(&["Luxury", "Land", "Luxury", "Land", "Land", "Luxury"])),
    )
    .await
    .expect("duplicates collapse before the limit applies");
    assert_eq!(created.category, vec!["Luxury", "Land"]);

    let err = handlers::create_agency(
        admin(),
        State(app.clone()),
        Json(new_agency(&["Luxury", "NoSuchCategory"])),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

    let err = handlers::update_agency(
        admin(),
        State(app.clone()),
        Path(created.id.clone()),
        Json(UpdateAgencyRequest {
            category: Some(vec!["Castles".to_string()]),
            ..UpdateAgencyRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

    let Json(updated) = handlers::update_agency(
        admin(),
        State(app),
        Path(created.id),
        Json(UpdateAgencyRequest {
            category: Some(vec!["Investment".to_string(), "Investment".to_string()]),
            ..UpdateAgencyRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.category, vec!["Investment"]);
}

#[test]
async fn test_delete_agency() {
    let app = state();
    let err = handlers::delete_agency(visitor(), State(app.clone()), Path("1".to_string()))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::FORBIDDEN);

    let status = handlers::delete_agency(agency_owner(), State(app.clone()), Path("1".to_string()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.repo.get_agency("1").await.is_none());
}

// --- Categories ---

#[test]
async fn test_category_admin_flow() {
    let app = state();
    let name = |n: &str| {
        Json(CategoryRequest {
            name: n.to_string(),
        })
    };

    let Json(categories) = handlers::add_category(admin(), State(app.clone()), name("  Vacation "))
        .await
        .unwrap();
    assert!(categories.contains(&"Vacation".to_string()));

    let blank = handlers::add_category(admin(), State(app.clone()), name("   "))
        .await
        .unwrap_err();
    assert_eq!(status_of(blank), StatusCode::BAD_REQUEST);

    let not_admin = handlers::add_category(agency_owner(), State(app.clone()), name("Other"))
        .await
        .unwrap_err();
    assert_eq!(forbidden_redirect(not_admin), "/dashboard");

    handlers::rename_category(
        admin(),
        State(app.clone()),
        Path("Residential".to_string()),
        name("Homes"),
    )
    .await
    .unwrap();
    let skyline = app.repo.get_agency("1").await.unwrap();
    assert_eq!(skyline.category, vec!["Homes", "Commercial"]);

    let missing = handlers::delete_category(admin(), State(app), Path("Residential".to_string()))
        .await
        .unwrap_err();
    assert_eq!(status_of(missing), StatusCode::NOT_FOUND);
}

// --- Admin ---

#[test]
async fn test_list_users_search() {
    let Json(users) = handlers::list_users(
        admin(),
        State(state()),
        Query(UserSearch {
            query: Some("AGENCY".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "2");

    let err = handlers::list_users(visitor(), State(state()), Query(UserSearch::default()))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), StatusCode::FORBIDDEN);
}

#[test]
async fn test_update_settings_validation() {
    let err = handlers::update_settings(
        admin(),
        State(state()),
        Json(UpdateSettingsRequest {
            max_categories: Some(0),
            ..UpdateSettingsRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);

    let Json(settings) = handlers::update_settings(
        admin(),
        State(state()),
        Json(UpdateSettingsRequest {
            platform_name: Some("Homes Hub".to_string()),
            ..UpdateSettingsRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(settings.platform_name, "Homes Hub");
}

// --- Messaging ---

#[test]
async fn test_messaging_flow() {
    let app = state();

    let Json(mine) = handlers::list_conversations(visitor(), State(app.clone())).await;
    assert_eq!(mine.len(), 2);

    let blank = handlers::start_conversation(
        visitor(),
        State(app.clone()),
        Json(StartConversationRequest {
            agency_id: "3".to_string(),
            text: "   ".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(blank), StatusCode::BAD_REQUEST);

    let Json(message) = handlers::send_message(
        agency_owner(),
        State(app.clone()),
        Path("1".to_string()),
        Json(SendMessageRequest {
            text: "  See you Tuesday. ".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(message.text, "See you Tuesday.");

    let hidden = handlers::send_message(
        admin(),
        State(app),
        Path("1".to_string()),
        Json(SendMessageRequest {
            text: "hi".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(hidden), StatusCode::NOT_FOUND);
}

// --- Subscriptions ---

#[test]
async fn test_plans_and_subscribe() {
    let Json(quotes) = handlers::list_plans(Query(PlanQuery {
        billing_cycle: BillingCycle::Yearly,
    }))
    .await;
    assert_eq!(quotes.len(), 3);
    assert_eq!(quotes[0].label, "$95.90/year");

    let Json(checkout) = handlers::subscribe(
        agency_owner(),
        Json(SubscribeRequest {
            plan_id: "Standard".to_string(),
            billing_cycle: BillingCycle::Monthly,
        }),
    )
    .await
    .unwrap();
    assert_eq!(checkout.checkout_path, "/billing");
    assert_eq!(checkout.quote.price_cents, 2499);

    let unknown = handlers::subscribe(
        agency_owner(),
        Json(SubscribeRequest {
            plan_id: "Platinum".to_string(),
            billing_cycle: BillingCycle::Monthly,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(status_of(unknown), StatusCode::NOT_FOUND);

    let visitor_err = handlers::subscribe(
        visitor(),
        Json(SubscribeRequest {
            plan_id: "Basic".to_string(),
            billing_cycle: BillingCycle::Monthly,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(forbidden_redirect(visitor_err), "/");
}
