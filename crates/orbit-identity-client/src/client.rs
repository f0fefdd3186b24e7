//! Public operation surface of the remote identity client.
//!
//! Composes the connection manager, the user cache and the error translator.
//! All operations run to completion and never silently lose a caller-visible
//! error.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{user_key, UserCache};
use crate::config::AuthorityConfig;
use crate::connection::ConnectionManager;
use crate::error::{IdentityError, IdentityResult};
use crate::proto;
use crate::transport::{AuthorityConnector, TlsAuthorityConnector};

/// How to look a user up: by authority-assigned id or by an alternate
/// identifier.
#[derive(Debug, Clone)]
pub enum UserSelector {
    Id(i64),
    NationalId(String),
    Username(String),
    Email(String),
    Phone(String),
}

/// Criteria for a remote membership filter. Empty criteria match every user.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub national_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.national_id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.department.is_none()
    }
}

/// Fields for a create request. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub is_verified: Option<bool>,
    pub sub_services: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub departments: Option<Vec<String>>,
}

/// Fields for an update request. Unset fields mean "no change", never
/// "set to empty".
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: i64,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub is_verified: Option<bool>,
    pub sub_services: Option<Vec<String>>,
    pub roles: Option<Vec<String>>,
    pub departments: Option<Vec<String>>,
}

impl UserUpdate {
    /// An update touching nothing yet.
    #[must_use]
    pub fn for_id(id: i64) -> Self {
        Self {
            id,
            national_id: None,
            phone: None,
            email: None,
            first_name: None,
            last_name: None,
            username: None,
            image: None,
            is_verified: None,
            sub_services: None,
            roles: None,
            departments: None,
        }
    }
}

/// Client for the remote identity authority.
///
/// One instance per process, shared by reference across tasks. Holds the
/// shared connection and the record cache.
pub struct IdentityClient {
    connection: ConnectionManager,
    cache: UserCache,
    service_name: String,
    sub_service_name: String,
}

impl IdentityClient {
    /// Build a client for the configured authority over a TLS channel.
    #[must_use]
    pub fn new(config: &AuthorityConfig) -> Self {
        let connector = TlsAuthorityConnector::new(config);
        Self::with_connector(
            Box::new(connector),
            &config.service_name,
            &config.sub_service_name,
            config.cache_ttl_secs,
        )
    }

    /// Build a client over an arbitrary connector (used by tests to inject
    /// scripted transports).
    #[must_use]
    pub fn with_connector(
        connector: Box<dyn AuthorityConnector>,
        service_name: &str,
        sub_service_name: &str,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            connection: ConnectionManager::new(connector),
            cache: UserCache::new(cache_ttl_secs),
            service_name: service_name.to_string(),
            sub_service_name: sub_service_name.to_string(),
        }
    }

    /// Fetch one user record.
    ///
    /// Id lookups consult the cache first and return hits without a remote
    /// call. Misses and alternate-identifier lookups issue a remote fetch
    /// and refresh the cache entry for the returned id.
    pub async fn fetch_user(&self, selector: &UserSelector) -> IdentityResult<proto::UserRecord> {
        if let UserSelector::Id(id) = selector {
            if let Some(hit) = self.cache.get(&user_key(*id)).await {
                debug!(user_id = id, "user record served from cache");
                return Ok((*hit).clone());
            }
        }

        let query = self.selector_query(selector);
        let record = self
            .connection
            .invoke("GetUserData", move |t| {
                let query = query.clone();
                Box::pin(async move { t.get_user_data(query).await })
            })
            .await?;

        self.cache
            .set(user_key(record.id), Arc::new(record.clone()))
            .await;
        Ok(record)
    }

    /// Fetch several users by id, resolving as many as possible from the
    /// cache and issuing one remote lookup per miss.
    pub async fn fetch_users(
        &self,
        ids: &[i64],
    ) -> IdentityResult<HashMap<i64, proto::UserRecord>> {
        let mut found = HashMap::with_capacity(ids.len());
        for &id in ids {
            if found.contains_key(&id) {
                continue;
            }
            let record = self.fetch_user(&UserSelector::Id(id)).await?;
            found.insert(id, record);
        }
        Ok(found)
    }

    /// Filter the authority's user set. Always a remote call; result sets
    /// vary by criteria and are never cached.
    pub async fn filter_users(
        &self,
        criteria: &FilterCriteria,
    ) -> IdentityResult<HashMap<String, Vec<i64>>> {
        let query = self.criteria_query(criteria);
        let response = self
            .connection
            .invoke("FilterUser", move |t| {
                let query = query.clone();
                Box::pin(async move { t.filter_user(query).await })
            })
            .await?;

        Ok(response
            .matches
            .into_iter()
            .map(|(criterion, list)| (criterion, list.ids))
            .collect())
    }

    /// Filter variant returning the authority's pre-serialized payload.
    pub async fn filter_users_serialized(
        &self,
        criteria: &FilterCriteria,
    ) -> IdentityResult<serde_json::Value> {
        let query = self.criteria_query(criteria);
        let response = self
            .connection
            .invoke("FilterUserSerialized", move |t| {
                let query = query.clone();
                Box::pin(async move { t.filter_user_serialized(query).await })
            })
            .await?;

        serde_json::from_str(&response.payload).map_err(|e| IdentityError::Decode {
            detail: format!("serialized filter payload is not valid JSON: {e}"),
        })
    }

    /// Verify a login token with the authority and return the user id it
    /// belongs to. The authority, not this client, is the source of truth
    /// for token validity.
    pub async fn verify_login(&self, token: &str) -> IdentityResult<i64> {
        let request = proto::VerifyLoginRequest {
            service_name: self.service_name.clone(),
            sub_service_name: self.sub_service_name.clone(),
            token: token.to_string(),
        };
        let response = self
            .connection
            .invoke("VerifyLogin", move |t| {
                let request = request.clone();
                Box::pin(async move { t.verify_login(request).await })
            })
            .await?;
        Ok(response.user_id)
    }

    /// Create a user on the authority, sending only the fields the caller
    /// set.
    pub async fn create_user(&self, user: &NewUser) -> IdentityResult<proto::UserRecord> {
        validate_profile_fields(user.national_id.as_deref(), user.email.as_deref())?;

        let request = proto::CreateUserRequest {
            service_name: self.service_name.clone(),
            sub_service_name: self.sub_service_name.clone(),
            national_id: user.national_id.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            image: user.image.clone(),
            is_verified: user.is_verified,
            sub_services: string_list(user.sub_services.clone()),
            roles: string_list(user.roles.clone()),
            departments: string_list(user.departments.clone()),
        };

        self.connection
            .invoke("CreateUser", move |t| {
                let request = request.clone();
                Box::pin(async move { t.create_user(request).await })
            })
            .await
    }

    /// Update a user on the authority, sending only the fields the caller
    /// set, and synchronously refresh the cache entry for that id.
    pub async fn update_user(&self, update: &UserUpdate) -> IdentityResult<proto::UserRecord> {
        validate_profile_fields(update.national_id.as_deref(), update.email.as_deref())?;

        let request = proto::UpdateUserRequest {
            service_name: self.service_name.clone(),
            sub_service_name: self.sub_service_name.clone(),
            id: update.id,
            national_id: update.national_id.clone(),
            phone: update.phone.clone(),
            email: update.email.clone(),
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            username: update.username.clone(),
            image: update.image.clone(),
            is_verified: update.is_verified,
            sub_services: string_list(update.sub_services.clone()),
            roles: string_list(update.roles.clone()),
            departments: string_list(update.departments.clone()),
        };

        let record = self
            .connection
            .invoke("UpdateUser", move |t| {
                let request = request.clone();
                Box::pin(async move { t.update_user(request).await })
            })
            .await?;

        // Refresh, not merely invalidate, so a fetch inside the TTL window
        // observes the new values without a remote round-trip.
        self.cache
            .set(user_key(record.id), Arc::new(record.clone()))
            .await;
        Ok(record)
    }

    /// The authority's canonical role vocabulary. Not cached.
    pub async fn list_roles(&self) -> IdentityResult<Vec<String>> {
        let request = self.vocabulary_request();
        let response = self
            .connection
            .invoke("GetRoles", move |t| {
                let request = request.clone();
                Box::pin(async move { t.get_roles(request).await })
            })
            .await?;
        Ok(response.roles)
    }

    /// The authority's canonical department vocabulary. Not cached.
    pub async fn list_departments(&self) -> IdentityResult<Vec<String>> {
        let request = self.vocabulary_request();
        let response = self
            .connection
            .invoke("GetDepartments", move |t| {
                let request = request.clone();
                Box::pin(async move { t.get_departments(request).await })
            })
            .await?;
        Ok(response.departments)
    }

    /// Drop the cached record for one user.
    pub async fn invalidate_user(&self, id: i64) {
        self.cache.delete(&user_key(id)).await;
    }

    /// Drop the cached records for several users.
    pub async fn invalidate_users(&self, ids: &[i64]) {
        for &id in ids {
            self.invalidate_user(id).await;
        }
    }

    /// Release the authority connection. Safe to call more than once; a
    /// later operation reconnects lazily.
    pub async fn close(&self) {
        self.connection.close().await;
    }

    fn base_query(&self) -> proto::UserQuery {
        proto::UserQuery {
            service_name: self.service_name.clone(),
            sub_service_name: self.sub_service_name.clone(),
            ..Default::default()
        }
    }

    fn selector_query(&self, selector: &UserSelector) -> proto::UserQuery {
        let mut query = self.base_query();
        match selector {
            UserSelector::Id(id) => query.id = Some(*id),
            UserSelector::NationalId(value) => query.national_id = Some(value.clone()),
            UserSelector::Username(value) => query.username = Some(value.clone()),
            UserSelector::Email(value) => query.email = Some(value.clone()),
            UserSelector::Phone(value) => query.phone = Some(value.clone()),
        }
        query
    }

    fn criteria_query(&self, criteria: &FilterCriteria) -> proto::UserQuery {
        let mut query = self.base_query();
        query.national_id = criteria.national_id.clone();
        query.username = criteria.username.clone();
        query.email = criteria.email.clone();
        query.phone = criteria.phone.clone();
        query.role = criteria.role.clone();
        query.department = criteria.department.clone();
        query
    }

    fn vocabulary_request(&self) -> proto::VocabularyRequest {
        proto::VocabularyRequest {
            service_name: self.service_name.clone(),
            sub_service_name: self.sub_service_name.clone(),
        }
    }
}

fn string_list(values: Option<Vec<String>>) -> Option<proto::StringList> {
    values.map(|values| proto::StringList { values })
}

/// Validate caller-supplied profile fields before they reach the wire.
fn validate_profile_fields(
    national_id: Option<&str>,
    email: Option<&str>,
) -> IdentityResult<()> {
    if let Some(national_id) = national_id {
        let valid = !national_id.is_empty()
            && national_id.len() <= 10
            && national_id.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(IdentityError::from_validation(format!(
                "value for \"national_id\" must be 1-10 digits, got {national_id:?}"
            )));
        }
    }
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(IdentityError::from_validation(format!(
                "value for \"email\" is not a valid address: {email:?}"
            )));
        }
    }
    Ok(())
}
