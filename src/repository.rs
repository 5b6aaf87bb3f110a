use crate::fixtures;
use crate::models::{
    Agency, AgencyRequest, Conversation, DashboardStats, Message, PlatformSettings,
    UpdateAgencyRequest, UpdateProfileRequest, UpdateSettingsRequest, User,
};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepoError
///
/// Failures the data source reports for mutations that can conflict with
/// existing records.
#[derive(Debug, Error, PartialEq)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Duplicate(String),
}

/// Repository Trait
///
/// The data-source collaborator. Handlers only see this contract, so the
/// in-memory store can be swapped for a remote one without touching them.
///
/// Listing calls return snapshots; filtering is applied by the caller.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Agencies ---
    async fn list_agencies(&self) -> Vec<Agency>;
    async fn get_agency(&self, id: &str) -> Option<Agency>;
    // Links the new record to `owner_id` when given; an owner may manage only one agency.
    async fn create_agency(
        &self,
        req: AgencyRequest,
        owner_id: Option<String>,
    ) -> Result<Agency, RepoError>;
    async fn update_agency(&self, id: &str, req: UpdateAgencyRequest) -> Option<Agency>;
    // Also unlinks the owning account.
    async fn delete_agency(&self, id: &str) -> bool;

    // --- Categories ---
    async fn list_categories(&self) -> Vec<String>;
    async fn add_category(&self, name: String) -> Result<Vec<String>, RepoError>;
    // Rename and delete cascade into every agency's category set.
    async fn rename_category(&self, current: &str, name: String)
    -> Result<Vec<String>, RepoError>;
    async fn delete_category(&self, name: &str) -> Result<Vec<String>, RepoError>;

    // --- Users ---
    async fn get_user(&self, id: &str) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    async fn create_user(&self, user: User) -> Result<User, RepoError>;
    async fn update_user(&self, id: &str, req: UpdateProfileRequest) -> Result<User, RepoError>;

    // --- Dashboard & Settings ---
    async fn get_stats(&self) -> DashboardStats;
    async fn get_settings(&self) -> PlatformSettings;
    async fn update_settings(&self, req: UpdateSettingsRequest) -> PlatformSettings;

    // --- Messaging ---
    // Conversations where the caller is the viewer or manages the agency side.
    async fn conversations_for(
        &self,
        user_id: &str,
        managed_agency: Option<&str>,
    ) -> Vec<Conversation>;
    // Appends to the existing viewer/agency thread or opens a new one.
    async fn start_conversation(
        &self,
        viewer_id: &str,
        agency_id: &str,
        text: String,
    ) -> Result<Conversation, RepoError>;
    async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        managed_agency: Option<&str>,
        text: String,
    ) -> Result<Message, RepoError>;
}

/// RepositoryState
///
/// Shared handle to the data source held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// Store
///
/// Everything the in-memory repository holds. Public so tests can build exact
/// starting states.
#[derive(Debug, Clone)]
pub struct Store {
    pub agencies: Vec<Agency>,
    pub categories: Vec<String>,
    pub users: Vec<User>,
    pub conversations: Vec<Conversation>,
    pub settings: PlatformSettings,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            agencies: Vec::new(),
            categories: Vec::new(),
            users: Vec::new(),
            conversations: Vec::new(),
            settings: fixtures::default_settings(),
        }
    }

    pub fn seeded() -> Self {
        Self {
            agencies: fixtures::agencies(),
            categories: fixtures::categories(),
            users: fixtures::users(),
            conversations: fixtures::conversations(),
            settings: fixtures::default_settings(),
        }
    }
}

/// InMemoryRepository
///
/// `Repository` over a process-local `Store`. Nothing survives a restart.
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new(store: Store) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Store::seeded())
    }

    pub fn empty() -> Self {
        Self::new(Store::empty())
    }
}

fn new_message(sender_id: &str, text: String) -> Message {
    Message {
        id: Uuid::new_v4().to_string(),
        sender_id: sender_id.to_string(),
        text,
        timestamp: Utc::now(),
    }
}

fn participates(conv: &Conversation, user_id: &str, managed_agency: Option<&str>) -> bool {
    conv.viewer_id == user_id || managed_agency == Some(conv.agency_id.as_str())
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_agencies(&self) -> Vec<Agency> {
        self.store.read().await.agencies.clone()
    }

    async fn get_agency(&self, id: &str) -> Option<Agency> {
        let store = self.store.read().await;
        store.agencies.iter().find(|a| a.id == id).cloned()
    }

    async fn create_agency(
        &self,
        req: AgencyRequest,
        owner_id: Option<String>,
    ) -> Result<Agency, RepoError> {
        let mut store = self.store.write().await;

        let owner_index = match owner_id {
            Some(owner_id) => {
                let index = store
                    .users
                    .iter()
                    .position(|u| u.id == owner_id)
                    .ok_or(RepoError::NotFound("user"))?;
                if store.users[index].agency_id.is_some() {
                    return Err(RepoError::Duplicate(
                        "This account already manages an agency".to_string(),
                    ));
                }
                Some(index)
            }
            None => None,
        };

        let now = Utc::now();
        let agency = Agency {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            description: req.description,
            logo: req.logo,
            website: req.website,
            email: req.email,
            phone: req.phone,
            address: req.address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            country: req.country,
            category: req.category,
            social_media: req.social_media,
            created_at: now,
            updated_at: now,
        };

        if let Some(index) = owner_index {
            store.users[index].agency_id = Some(agency.id.clone());
        }
        store.agencies.push(agency.clone());
        Ok(agency)
    }

    async fn update_agency(&self, id: &str, req: UpdateAgencyRequest) -> Option<Agency> {
        let mut store = self.store.write().await;
        let agency = store.agencies.iter_mut().find(|a| a.id == id)?;

        if let Some(name) = req.name {
            agency.name = name;
        }
        if let Some(description) = req.description {
            agency.description = description;
        }
        if let Some(logo) = req.logo {
            agency.logo = logo;
        }
        if let Some(website) = req.website {
            agency.website = website;
        }
        if let Some(email) = req.email {
            agency.email = email;
        }
        if let Some(phone) = req.phone {
            agency.phone = phone;
        }
        if let Some(address) = req.address {
            agency.address = address;
        }
        if let Some(city) = req.city {
            agency.city = city;
        }
        if let Some(state) = req.state {
            agency.state = state;
        }
        if let Some(zip_code) = req.zip_code {
            agency.zip_code = zip_code;
        }
        if let Some(country) = req.country {
            agency.country = country;
        }
        if let Some(category) = req.category {
            agency.category = category;
        }
        if let Some(social_media) = req.social_media {
            agency.social_media = social_media;
        }
        agency.updated_at = Utc::now();

        Some(agency.clone())
    }

    async fn delete_agency(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.agencies.len();
        store.agencies.retain(|a| a.id != id);
        if store.agencies.len() == before {
            return false;
        }
        for user in store
            .users
            .iter_mut()
            .filter(|u| u.agency_id.as_deref() == Some(id))
        {
            user.agency_id = None;
        }
        true
    }

    async fn list_categories(&self) -> Vec<String> {
        self.store.read().await.categories.clone()
    }

    async fn add_category(&self, name: String) -> Result<Vec<String>, RepoError> {
        let mut store = self.store.write().await;
        if store.categories.contains(&name) {
            return Err(RepoError::Duplicate("Category already exists".to_string()));
        }
        store.categories.push(name);
        Ok(store.categories.clone())
    }

    async fn rename_category(
        &self,
        current: &str,
        name: String,
    ) -> Result<Vec<String>, RepoError> {
        let mut store = self.store.write().await;
        let index = store
            .categories
            .iter()
            .position(|c| c == current)
            .ok_or(RepoError::NotFound("category"))?;
        if name == current {
            return Ok(store.categories.clone());
        }
        if store.categories.contains(&name) {
            return Err(RepoError::Duplicate("Category already exists".to_string()));
        }

        store.categories[index] = name.clone();
        for agency in store.agencies.iter_mut() {
            // Category sets never hold the same name twice.
            if agency.category.contains(&name) {
                agency.category.retain(|c| c != current);
            } else {
                for category in agency.category.iter_mut().filter(|c| c.as_str() == current) {
                    *category = name.clone();
                }
            }
        }
        Ok(store.categories.clone())
    }

    async fn delete_category(&self, name: &str) -> Result<Vec<String>, RepoError> {
        let mut store = self.store.write().await;
        let index = store
            .categories
            .iter()
            .position(|c| c == name)
            .ok_or(RepoError::NotFound("category"))?;

        store.categories.remove(index);
        for agency in store.agencies.iter_mut() {
            agency.category.retain(|c| c != name);
        }
        Ok(store.categories.clone())
    }

    async fn get_user(&self, id: &str) -> Option<User> {
        let store = self.store.read().await;
        store.users.iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let store = self.store.read().await;
        store
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        self.store.read().await.users.clone()
    }

    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::Duplicate(
                "An account with this email already exists.".to_string(),
            ));
        }
        store.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, req: UpdateProfileRequest) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if let Some(email) = req.email.as_deref() {
            if store
                .users
                .iter()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(RepoError::Duplicate(
                    "An account with this email already exists.".to_string(),
                ));
            }
        }

        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound("user"))?;
        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(email) = req.email {
            user.email = email;
        }
        Ok(user.clone())
    }

    async fn get_stats(&self) -> DashboardStats {
        let store = self.store.read().await;
        let now = Utc::now();
        let new_agencies_this_month = store
            .agencies
            .iter()
            .filter(|a| a.created_at.year() == now.year() && a.created_at.month() == now.month())
            .count();

        DashboardStats {
            total_agencies: store.agencies.len(),
            new_agencies_this_month,
            total_categories: store.categories.len(),
            total_users: store.users.len(),
        }
    }

    async fn get_settings(&self) -> PlatformSettings {
        self.store.read().await.settings.clone()
    }

    async fn update_settings(&self, req: UpdateSettingsRequest) -> PlatformSettings {
        let mut store = self.store.write().await;
        let settings = &mut store.settings;

        if let Some(v) = req.platform_name {
            settings.platform_name = v;
        }
        if let Some(v) = req.contact_email {
            settings.contact_email = v;
        }
        if let Some(v) = req.allow_signups {
            settings.allow_signups = v;
        }
        if let Some(v) = req.require_approval {
            settings.require_approval = v;
        }
        if let Some(v) = req.max_categories {
            settings.max_categories = v;
        }
        if let Some(v) = req.enable_analytics {
            settings.enable_analytics = v;
        }
        if let Some(v) = req.primary_color {
            settings.primary_color = v;
        }
        if let Some(v) = req.logo_url {
            settings.logo_url = v;
        }
        if let Some(v) = req.enable_dark_mode {
            settings.enable_dark_mode = v;
        }
        settings.clone()
    }

    async fn conversations_for(
        &self,
        user_id: &str,
        managed_agency: Option<&str>,
    ) -> Vec<Conversation> {
        let store = self.store.read().await;
        store
            .conversations
            .iter()
            .filter(|c| participates(c, user_id, managed_agency))
            .cloned()
            .collect()
    }

    async fn start_conversation(
        &self,
        viewer_id: &str,
        agency_id: &str,
        text: String,
    ) -> Result<Conversation, RepoError> {
        let mut store = self.store.write().await;
        let agency_name = store
            .agencies
            .iter()
            .find(|a| a.id == agency_id)
            .map(|a| a.name.clone())
            .ok_or(RepoError::NotFound("agency"))?;

        let message = new_message(viewer_id, text);
        if let Some(conv) = store
            .conversations
            .iter_mut()
            .find(|c| c.viewer_id == viewer_id && c.agency_id == agency_id)
        {
            conv.messages.push(message);
            return Ok(conv.clone());
        }

        let conv = Conversation {
            id: Uuid::new_v4().to_string(),
            viewer_id: viewer_id.to_string(),
            agency_id: agency_id.to_string(),
            agency_name,
            messages: vec![message],
        };
        store.conversations.push(conv.clone());
        Ok(conv)
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        managed_agency: Option<&str>,
        text: String,
    ) -> Result<Message, RepoError> {
        let mut store = self.store.write().await;
        // Non-participants get the same answer as a missing thread.
        let conv = store
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id && participates(c, sender_id, managed_agency))
            .ok_or(RepoError::NotFound("conversation"))?;

        let message = new_message(sender_id, text);
        conv.messages.push(message.clone());
        Ok(message)
    }
}
