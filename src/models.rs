use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// empty_as_none
///
/// Collapses an empty string into the absent state. Browser forms and URL query
/// strings send `""` for "nothing selected"; inside the crate that is always `None`.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// clearable
///
/// For partial updates of optional fields. A missing key stays `None` (leave
/// untouched, via `#[serde(default)]`); `null` or `""` becomes `Some(None)`
/// (clear); anything else is `Some(Some(value))`.
pub(crate) fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.filter(|s| !s.is_empty())))
}

// --- Identity ---

/// Role
///
/// The closed set of viewer roles. Route authorization and the role-home
/// redirect table are both keyed on this enum, so adding a role is a
/// compile-time visible change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Agency,
    Visitor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agency => "agency",
            Role::Visitor => "visitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is outside the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "agency" => Ok(Role::Agency),
            "visitor" => Ok(Role::Visitor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User
///
/// A viewer account. `agency_id` is only meaningful for `Role::Agency` and
/// names the single agency record that account manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Agencies ---

/// SocialMedia
///
/// Optional profile links. Each one, when present, must be a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct SocialMedia {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub facebook: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub linkedin: Option<String>,
}

/// Agency
///
/// A directory listing. Only `name`, `description`, `city`, `country` and
/// `category` take part in filtering; the rest is display and contact data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: String,
    /// Set semantics: membership is what matters, order is display only.
    pub category: Vec<String>,
    pub social_media: SocialMedia,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// AgencyRequest
///
/// Full payload for creating an agency (POST /agencies).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct AgencyRequest {
    #[validate(length(min = 2, message = "Agency name must be at least 2 characters."))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "Please enter a valid URL."))]
    pub website: Option<String>,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 5, message = "Please enter a valid phone number."))]
    pub phone: String,
    #[validate(length(min = 5, message = "Address is required."))]
    pub address: String,
    #[validate(length(min = 2, message = "City is required."))]
    pub city: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub zip_code: Option<String>,
    #[validate(length(min = 2, message = "Country is required."))]
    pub country: String,
    #[validate(length(min = 1, message = "Select at least one category."))]
    pub category: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub social_media: SocialMedia,
}

/// UpdateAgencyRequest
///
/// Partial update payload (PUT /agencies/{id}). Absent fields are left untouched;
/// the optional contact fields are cleared by sending `null` or `""`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UpdateAgencyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Agency name must be at least 2 characters."))]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub logo: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(url(message = "Please enter a valid URL."))]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub website: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, message = "Please enter a valid phone number."))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, message = "Address is required."))]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "City is required."))]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub state: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub zip_code: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Country is required."))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Select at least one category."))]
    pub category: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub social_media: Option<SocialMedia>,
}

// --- Search ---

/// SearchFilters
///
/// The listing page's filter snapshot. Every field is either present or absent;
/// an empty string from the URL is read as absent.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, IntoParams,
)]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct SearchFilters {
    /// Exact category name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<String>,
    /// Exact country name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub country: Option<String>,
    /// Free text matched against name, description and city.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub query: Option<String>,
}

/// FilterKey
///
/// Identifies which facet a chip removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FilterKey {
    Category,
    Country,
}

/// FilterChip
///
/// One active facet filter as shown above the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilterChip {
    pub label: String,
    pub remove: FilterKey,
    /// Query string of the listing with only this facet cleared.
    pub remove_query: String,
}

/// AgencyListing
///
/// Response for GET /agencies: the visible subset plus everything the page
/// needs to render and edit the active filters.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AgencyListing {
    pub agencies: Vec<Agency>,
    pub total: usize,
    pub filters: SearchFilters,
    pub active_filters: Vec<FilterChip>,
    /// Query string after "clear all"; keeps the free-text search.
    pub reset_query: String,
}

// --- Accounts ---

/// LoginRequest
///
/// Mock credentials. Only the email is used to resolve the account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// RegisterRequest
///
/// New account payload (POST /register). `role` defaults to visitor.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// UpdateProfileRequest
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters."))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: Option<String>,
}

/// UserSearch
///
/// Query parameters for the admin user table.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearch {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub query: Option<String>,
}

// --- Categories ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryRequest {
    pub name: String,
}

// --- Messaging ---

/// Message
///
/// A single line in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

/// Conversation
///
/// A thread between one viewer and one agency. The agency side is answered by
/// whichever account manages `agency_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Conversation {
    pub id: String,
    pub viewer_id: String,
    pub agency_id: String,
    pub agency_name: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct StartConversationRequest {
    pub agency_id: String,
    #[validate(length(max = 2000, message = "Message is too long."))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct SendMessageRequest {
    #[validate(length(max = 2000, message = "Message is too long."))]
    pub text: String,
}

// --- Dashboard & Settings ---

/// DashboardStats
///
/// Counters for the dashboard landing page (GET /dashboard/stats).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardStats {
    pub total_agencies: usize,
    /// Agencies whose `created_at` falls in the current calendar month (UTC).
    pub new_agencies_this_month: usize,
    pub total_categories: usize,
    pub total_users: usize,
}

/// PlatformSettings
///
/// Admin-managed platform switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlatformSettings {
    pub platform_name: String,
    pub contact_email: String,
    pub allow_signups: bool,
    pub require_approval: bool,
    /// Upper bound on `Agency::category` length.
    pub max_categories: usize,
    pub enable_analytics: bool,
    pub primary_color: String,
    pub logo_url: String,
    pub enable_dark_mode: bool,
}

/// UpdateSettingsRequest
///
/// Partial settings update (PUT /admin/settings).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UpdateSettingsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Platform name cannot be empty."))]
    pub platform_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address."))]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_signups: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 20, message = "Must be between 1 and 20."))]
    pub max_categories: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_analytics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_dark_mode: Option<bool>,
}
