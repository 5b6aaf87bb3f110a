use agency_directory::{
    access::{
        self, AuthSnapshot, GateOutcome, PROTECTED_ROUTES, RouteGuard, can_edit_agency,
        check_route, evaluate, role_home, route_guard,
    },
    models::Role,
};

const ALL_ROLES: [Role; 3] = [Role::Admin, Role::Agency, Role::Visitor];

fn all_guards() -> Vec<RouteGuard> {
    vec![
        RouteGuard::any_authenticated(),
        RouteGuard::only(&[Role::Admin]),
        RouteGuard::only(&[Role::Agency]),
        RouteGuard::only(&[Role::Admin, Role::Agency]),
        RouteGuard::only(&ALL_ROLES),
    ]
}

// --- evaluate ---

#[test]
fn test_empty_guard_renders_for_every_authenticated_viewer() {
    let guard = RouteGuard::any_authenticated();
    for role in ALL_ROLES {
        let outcome = evaluate(&AuthSnapshot::authenticated(Some(role)), &guard, "/dashboard");
        assert_eq!(outcome, GateOutcome::Render, "role {role} should render");
    }
    // Authenticated without a recognised role still passes an open guard.
    assert_eq!(
        evaluate(&AuthSnapshot::authenticated(None), &guard, "/profile"),
        GateOutcome::Render
    );
}

#[test]
fn test_anonymous_viewer_always_redirects_to_login() {
    for guard in all_guards() {
        let outcome = evaluate(&AuthSnapshot::anonymous(), &guard, "/agency/42?tab=contact");
        assert_eq!(
            outcome,
            GateOutcome::RedirectToLogin {
                from: "/agency/42?tab=contact".to_string()
            }
        );
    }
}

#[test]
fn test_loading_session_neither_renders_nor_redirects() {
    let snapshots = [
        AuthSnapshot::loading(),
        AuthSnapshot {
            is_loading: true,
            is_authenticated: true,
            role: Some(Role::Admin),
        },
    ];
    for auth in snapshots {
        for guard in all_guards() {
            assert_eq!(evaluate(&auth, &guard, "/admin"), GateOutcome::Loading);
        }
    }
}

#[test]
fn test_admin_on_agency_route_goes_to_admin_home() {
    let outcome = evaluate(
        &AuthSnapshot::authenticated(Some(Role::Admin)),
        &RouteGuard::only(&[Role::Agency]),
        "/agency-profile",
    );
    assert_eq!(
        outcome,
        GateOutcome::RedirectTo {
            path: "/admin".to_string()
        }
    );
}

#[test]
fn test_visitor_on_management_route_goes_home() {
    let outcome = evaluate(
        &AuthSnapshot::authenticated(Some(Role::Visitor)),
        &RouteGuard::only(&[Role::Admin, Role::Agency]),
        "/add-agency",
    );
    assert_eq!(
        outcome,
        GateOutcome::RedirectTo {
            path: "/".to_string()
        }
    );
}

#[test]
fn test_unknown_role_is_refused_by_restricted_guard() {
    let outcome = evaluate(
        &AuthSnapshot::authenticated(None),
        &RouteGuard::only(&[Role::Admin]),
        "/admin",
    );
    assert_eq!(
        outcome,
        GateOutcome::RedirectTo {
            path: "/".to_string()
        }
    );
}

#[test]
fn test_role_home_table() {
    assert_eq!(role_home(Some(Role::Admin)), "/admin");
    assert_eq!(role_home(Some(Role::Agency)), "/dashboard");
    assert_eq!(role_home(Some(Role::Visitor)), "/");
    assert_eq!(role_home(None), "/");
}

#[test]
fn test_unknown_role_string_does_not_parse() {
    assert!("superuser".parse::<Role>().is_err());
    assert_eq!("agency".parse::<Role>(), Ok(Role::Agency));
}

// --- Route table ---

#[test]
fn test_route_guard_matches_parameter_segments() {
    let guard = route_guard("/edit-agency/17").expect("edit route is protected");
    assert!(guard.allowed_roles().contains(&Role::Admin));
    assert!(guard.allowed_roles().contains(&Role::Agency));
    assert!(!guard.allowed_roles().contains(&Role::Visitor));

    let guard = route_guard("/agency/3").expect("detail route is protected");
    assert!(guard.allowed_roles().is_empty());
}

#[test]
fn test_route_guard_ignores_query_and_fragment() {
    assert_eq!(
        route_guard("/agencies?category=Luxury#top"),
        Some(RouteGuard::any_authenticated())
    );
}

#[test]
fn test_public_and_unknown_paths_have_no_guard() {
    for path in ["/", "/login", "/register", "/support", "/no-such-page", "/agency"] {
        assert!(route_guard(path).is_none(), "{path} should be public");
    }
    // Extra segments do not match a shorter pattern.
    assert!(route_guard("/agency/1/extra").is_none());
}

#[test]
fn test_every_table_entry_is_reachable() {
    for (pattern, roles) in PROTECTED_ROUTES {
        let concrete = pattern.replace(":id", "1");
        let guard = route_guard(&concrete).expect("pattern should match itself");
        assert_eq!(guard, RouteGuard::only(roles), "guard for {pattern}");
    }
}

#[test]
fn test_check_route_public_path_renders_for_anonymous() {
    assert_eq!(
        check_route(&AuthSnapshot::anonymous(), "/support"),
        GateOutcome::Render
    );
}

#[test]
fn test_check_route_echoes_full_location_on_login_redirect() {
    assert_eq!(
        check_route(&AuthSnapshot::anonymous(), "/agencies?country=Canada"),
        GateOutcome::RedirectToLogin {
            from: "/agencies?country=Canada".to_string()
        }
    );
}

#[test]
fn test_check_route_agency_viewer_on_admin_pages() {
    let auth = AuthSnapshot::authenticated(Some(Role::Agency));
    let home = GateOutcome::RedirectTo {
        path: "/dashboard".to_string(),
    };
    assert_eq!(check_route(&auth, "/admin"), home);
    assert_eq!(check_route(&auth, "/manage-categories"), home);
    assert_eq!(check_route(&auth, "/agency-profile"), GateOutcome::Render);
}

#[test]
fn test_gate_outcome_wire_format() {
    let json = serde_json::to_value(GateOutcome::RedirectTo {
        path: "/admin".to_string(),
    })
    .unwrap();
    assert_eq!(json["outcome"], "redirect_to");
    assert_eq!(json["path"], "/admin");

    let json = serde_json::to_value(GateOutcome::Render).unwrap();
    assert_eq!(json, serde_json::json!({ "outcome": "render" }));
}

// --- Edit permission ---

#[test]
fn test_can_edit_agency_rules() {
    assert!(can_edit_agency(Role::Admin, None, "5"));
    assert!(can_edit_agency(Role::Agency, Some("1"), "1"));
    assert!(!can_edit_agency(Role::Agency, Some("1"), "2"));
    assert!(!can_edit_agency(Role::Agency, None, "1"));
    assert!(!access::can_edit_agency(Role::Visitor, Some("1"), "1"));
}
