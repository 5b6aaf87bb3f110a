/// Router Module Index
///
/// Routes are split by who may reach them. The split only decides which
/// layers wrap a route; per-role checks still happen inside the handlers.

/// Routes open to anonymous viewers.
pub mod public;

/// Routes behind the session check.
pub mod authenticated;

/// Routes for the admin role, nested under `/admin`.
pub mod admin;
