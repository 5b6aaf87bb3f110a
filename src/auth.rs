use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;

use crate::{
    access::{self, AuthSnapshot, GateOutcome, RouteGuard},
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Header carrying the signed-in account id. The browser sets it after a mock
/// login; there is no token exchange behind it.
pub const SESSION_HEADER: &str = "x-user-id";

/// AuthUser Extractor Result
///
/// The viewer resolved for a request. Handlers use it for role checks and
/// for ownership checks against `agency_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub agency_id: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            agency_id: user.agency_id,
        }
    }
}

impl AuthUser {
    /// resolve
    ///
    /// Reads the session header and looks the account up. A missing header,
    /// an unreadable value or an unknown id all mean "not signed in".
    async fn resolve<S>(parts: &Parts, state: &S) -> Option<Self>
    where
        S: Send + Sync,
        RepositoryState: FromRef<S>,
    {
        let repo = RepositoryState::from_ref(state);
        let user_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|id| !id.is_empty())?;

        repo.get_user(user_id).await.map(AuthUser::from)
    }

    /// The session as the access gate sees it. A resolved extractor is never loading.
    pub fn snapshot(viewer: Option<&AuthUser>) -> AuthSnapshot {
        match viewer {
            Some(user) => AuthSnapshot::authenticated(Some(user.role)),
            None => AuthSnapshot::anonymous(),
        }
    }

    /// authorize
    ///
    /// Runs the access gate for `location` and turns anything but `Render`
    /// into the matching refusal.
    pub fn authorize(&self, guard: &RouteGuard, location: &str) -> Result<(), AppError> {
        let outcome = access::evaluate(&Self::snapshot(Some(self)), guard, location);
        match outcome {
            GateOutcome::Render => Ok(()),
            GateOutcome::RedirectTo { path } => {
                tracing::debug!(user_id = %self.id, role = %self.role, location, redirect = %path, "access denied");
                Err(AppError::Forbidden { redirect: path })
            }
            GateOutcome::Loading | GateOutcome::RedirectToLogin { .. } => {
                Err(AppError::Unauthenticated)
            }
        }
    }

    pub fn can_edit_agency(&self, agency_id: &str) -> bool {
        access::can_edit_agency(self.role, self.agency_id.as_deref(), agency_id)
    }

    /// Refusal for a failed ownership check, pointing at this viewer's home.
    pub fn forbidden(&self) -> AppError {
        AppError::Forbidden {
            redirect: access::role_home(Some(self.role)).to_string(),
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Required-session form: rejects with 401 when no account resolves.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Self::resolve(parts, state)
            .await
            .ok_or(AppError::Unauthenticated)
    }
}

/// Optional-session form, for routes that answer anonymous viewers too
/// (`Option<AuthUser>` in a handler signature).
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::resolve(parts, state).await)
    }
}
