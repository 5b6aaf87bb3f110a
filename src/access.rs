//! Route authorization.
//!
//! Every decision here is a pure function of the viewer's session snapshot and
//! the route's declared roles. Performing the navigation (or turning an outcome
//! into an HTTP status) belongs to the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::Role;

/// AuthSnapshot
///
/// What the session collaborator knows about the viewer at decision time.
/// `role` is absent for anonymous viewers and for sessions carrying a role
/// string outside the closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSnapshot {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl AuthSnapshot {
    /// Session restoration still in flight.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(role: Option<Role>) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            role,
        }
    }
}

/// RouteGuard
///
/// A route's `allowed_roles` declaration. The empty set admits any
/// authenticated viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteGuard {
    allowed_roles: BTreeSet<Role>,
}

impl RouteGuard {
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    pub fn only(roles: &[Role]) -> Self {
        Self {
            allowed_roles: roles.iter().copied().collect(),
        }
    }

    pub fn allowed_roles(&self) -> &BTreeSet<Role> {
        &self.allowed_roles
    }

    fn admits(&self, role: Option<Role>) -> bool {
        if self.allowed_roles.is_empty() {
            return true;
        }
        role.is_some_and(|r| self.allowed_roles.contains(&r))
    }
}

/// GateOutcome
///
/// The four possible answers to "may this viewer see this route".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum GateOutcome {
    /// Session not yet restored; render neither the view nor a redirect.
    Loading,
    Render,
    /// `from` is the originally requested location, for redirect-back after login.
    RedirectToLogin { from: String },
    RedirectTo { path: String },
}

/// role_home
///
/// Landing page for a viewer bounced off a route their role may not see.
pub fn role_home(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "/admin",
        Some(Role::Agency) => "/dashboard",
        Some(Role::Visitor) | None => "/",
    }
}

/// evaluate
///
/// Decides a single navigation. Loading is resolved first so that neither
/// protected content nor a redirect can appear while the session is restored.
pub fn evaluate(auth: &AuthSnapshot, guard: &RouteGuard, location: &str) -> GateOutcome {
    if auth.is_loading {
        return GateOutcome::Loading;
    }
    if !auth.is_authenticated {
        return GateOutcome::RedirectToLogin {
            from: location.to_string(),
        };
    }
    if guard.admits(auth.role) {
        GateOutcome::Render
    } else {
        GateOutcome::RedirectTo {
            path: role_home(auth.role).to_string(),
        }
    }
}

// --- Route table ---

const ANY: &[Role] = &[];

/// Protected views of the browser application and the roles each admits.
/// Paths not listed here are public.
pub const PROTECTED_ROUTES: &[(&str, &[Role])] = &[
    ("/dashboard", ANY),
    ("/agencies", ANY),
    ("/agency/:id", ANY),
    ("/agency-profile", &[Role::Agency]),
    ("/add-agency", &[Role::Admin, Role::Agency]),
    ("/edit-agency/:id", &[Role::Admin, Role::Agency]),
    ("/profile", ANY),
    ("/settings", ANY),
    ("/messages", ANY),
    ("/manage-categories", &[Role::Admin]),
    ("/admin", &[Role::Admin]),
];

fn path_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') || p == s => continue,
            _ => return false,
        }
    }
}

/// route_guard
///
/// Looks up the guard for a location. Any query string or fragment is ignored
/// for matching. `None` means the route is public.
pub fn route_guard(location: &str) -> Option<RouteGuard> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    PROTECTED_ROUTES
        .iter()
        .find(|(pattern, _)| path_matches(pattern, path))
        .map(|(_, roles)| RouteGuard::only(roles))
}

/// check_route
///
/// Full navigation decision against the route table. Public routes always render.
pub fn check_route(auth: &AuthSnapshot, location: &str) -> GateOutcome {
    match route_guard(location) {
        Some(guard) => evaluate(auth, &guard, location),
        None => GateOutcome::Render,
    }
}

/// can_edit_agency
///
/// Admins may edit any agency; an agency account only the one it manages.
/// `managed_agency` is the viewer's own `agency_id`.
pub fn can_edit_agency(role: Role, managed_agency: Option<&str>, agency_id: &str) -> bool {
    match role {
        Role::Admin => true,
        Role::Agency => managed_agency == Some(agency_id),
        Role::Visitor => false,
    }
}
