//! Scripted in-memory authority for tests.
//!
//! [`FakeAuthority`] holds a mutable user set, a token table and a queue of
//! scripted failures, and counts every call and every connection
//! establishment so tests can assert on cache hits and reconnect behavior.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tonic::{Code, Status};

use crate::error::IdentityError;
use crate::proto;
use crate::transport::{AuthorityConnector, AuthorityTransport};

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub get_user_data: AtomicUsize,
    pub filter_user: AtomicUsize,
    pub filter_user_serialized: AtomicUsize,
    pub verify_login: AtomicUsize,
    pub create_user: AtomicUsize,
    pub update_user: AtomicUsize,
    pub get_roles: AtomicUsize,
    pub get_departments: AtomicUsize,
}

impl CallCounts {
    /// Total remote calls across all operations.
    pub fn total(&self) -> usize {
        self.get_user_data.load(Ordering::SeqCst)
            + self.filter_user.load(Ordering::SeqCst)
            + self.filter_user_serialized.load(Ordering::SeqCst)
            + self.verify_login.load(Ordering::SeqCst)
            + self.create_user.load(Ordering::SeqCst)
            + self.update_user.load(Ordering::SeqCst)
            + self.get_roles.load(Ordering::SeqCst)
            + self.get_departments.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the remote identity authority.
#[derive(Default)]
pub struct FakeAuthority {
    users: RwLock<HashMap<i64, proto::UserRecord>>,
    tokens: RwLock<HashMap<String, i64>>,
    roles: RwLock<Vec<String>>,
    departments: RwLock<Vec<String>>,
    failures: Mutex<VecDeque<Code>>,
    next_id: AtomicI64,
    /// Calls observed, by operation.
    pub calls: CallCounts,
    /// Connections established through the connector.
    pub connects: AtomicUsize,
}

impl FakeAuthority {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    /// A connector producing transports bound to this authority.
    pub fn connector(self: &Arc<Self>) -> Box<dyn AuthorityConnector> {
        Box::new(FakeConnector {
            authority: Arc::clone(self),
        })
    }

    /// Seed a user record (id must be set by the caller).
    pub fn add_user(&self, record: proto::UserRecord) {
        let mut users = self.users.write().unwrap();
        let floor = record.id + 1;
        self.next_id.fetch_max(floor, Ordering::SeqCst);
        users.insert(record.id, record);
    }

    /// Register a valid login token.
    pub fn grant_token(&self, token: &str, user_id: i64) {
        self.tokens.write().unwrap().insert(token.to_string(), user_id);
    }

    pub fn set_roles(&self, roles: Vec<String>) {
        *self.roles.write().unwrap() = roles;
    }

    pub fn set_departments(&self, departments: Vec<String>) {
        *self.departments.write().unwrap() = departments;
    }

    /// Script the next call (any operation) to fail with `code`. Queued
    /// failures are consumed in order, one per call.
    pub fn fail_next(&self, code: Code) {
        self.failures.lock().unwrap().push_back(code);
    }

    /// Current state of a user record, if any.
    pub fn user(&self, id: i64) -> Option<proto::UserRecord> {
        self.users.read().unwrap().get(&id).cloned()
    }

    /// All user ids known to the authority, ascending.
    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.users.read().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn take_failure(&self) -> Option<Status> {
        self.failures
            .lock()
            .unwrap()
            .pop_front()
            .map(|code| Status::new(code, "scripted failure"))
    }

    fn matching_ids(&self, query: &proto::UserQuery) -> Vec<i64> {
        let users = self.users.read().unwrap();
        let mut ids: Vec<i64> = users
            .values()
            .filter(|user| {
                query.id.is_none_or(|id| user.id == id)
                    && query
                        .national_id
                        .as_ref()
                        .is_none_or(|v| &user.national_id == v)
                    && query.username.as_ref().is_none_or(|v| &user.username == v)
                    && query.email.as_ref().is_none_or(|v| &user.email == v)
                    && query.phone.as_ref().is_none_or(|v| &user.phone == v)
                    && query.role.as_ref().is_none_or(|v| user.roles.contains(v))
                    && query
                        .department
                        .as_ref()
                        .is_none_or(|v| user.departments.contains(v))
            })
            .map(|user| user.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

struct FakeConnector {
    authority: Arc<FakeAuthority>,
}

#[async_trait]
impl AuthorityConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn AuthorityTransport>, IdentityError> {
        self.authority.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeTransport {
            authority: Arc::clone(&self.authority),
        }))
    }
}

struct FakeTransport {
    authority: Arc<FakeAuthority>,
}

#[async_trait]
impl AuthorityTransport for FakeTransport {
    async fn get_user_data(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::UserRecord, Status> {
        self.authority.calls.get_user_data.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        let ids = self.authority.matching_ids(&query);
        match ids.first() {
            Some(id) => Ok(self.authority.user(*id).expect("matched user exists")),
            None => Err(Status::not_found("user not found")),
        }
    }

    async fn filter_user(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserResponse, Status> {
        self.authority.calls.filter_user.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        let ids = self.authority.matching_ids(&query);
        let mut matches = HashMap::new();
        matches.insert("user_id".to_string(), proto::UserIdList { ids });
        Ok(proto::FilterUserResponse { matches })
    }

    async fn filter_user_serialized(
        &self,
        query: proto::UserQuery,
    ) -> Result<proto::FilterUserSerializedResponse, Status> {
        self.authority
            .calls
            .filter_user_serialized
            .fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        let ids = self.authority.matching_ids(&query);
        let payload = serde_json::json!({ "user_id": ids }).to_string();
        Ok(proto::FilterUserSerializedResponse { payload })
    }

    async fn verify_login(
        &self,
        request: proto::VerifyLoginRequest,
    ) -> Result<proto::VerifyLoginResponse, Status> {
        self.authority.calls.verify_login.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        match self.authority.tokens.read().unwrap().get(&request.token) {
            Some(user_id) => Ok(proto::VerifyLoginResponse { user_id: *user_id }),
            None => Err(Status::unauthenticated("token is invalid or expired")),
        }
    }

    async fn create_user(
        &self,
        request: proto::CreateUserRequest,
    ) -> Result<proto::UserRecord, Status> {
        self.authority.calls.create_user.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }

        if let Some(national_id) = &request.national_id {
            let taken = self
                .authority
                .users
                .read()
                .unwrap()
                .values()
                .any(|u| !u.national_id.is_empty() && &u.national_id == national_id);
            if taken {
                return Err(Status::already_exists(format!(
                    "field \"national_id\" already exists: {national_id}"
                )));
            }
        }

        let id = self.authority.next_id.fetch_add(1, Ordering::SeqCst);
        let record = proto::UserRecord {
            id,
            national_id: request.national_id.unwrap_or_default(),
            phone: request.phone.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            username: request.username.unwrap_or_default(),
            service: request.service_name,
            sub_services: request.sub_services.map(|l| l.values).unwrap_or_default(),
            roles: request.roles.map(|l| l.values).unwrap_or_default(),
            departments: request.departments.map(|l| l.values).unwrap_or_default(),
            image: request.image.unwrap_or_default(),
            is_verified: request.is_verified.unwrap_or_default(),
            is_staff: false,
            is_superuser: false,
        };
        self.authority
            .users
            .write()
            .unwrap()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn update_user(
        &self,
        request: proto::UpdateUserRequest,
    ) -> Result<proto::UserRecord, Status> {
        self.authority.calls.update_user.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }

        let mut users = self.authority.users.write().unwrap();
        let record = users
            .get_mut(&request.id)
            .ok_or_else(|| Status::not_found("user not found"))?;

        if let Some(value) = request.national_id {
            record.national_id = value;
        }
        if let Some(value) = request.phone {
            record.phone = value;
        }
        if let Some(value) = request.email {
            record.email = value;
        }
        if let Some(value) = request.first_name {
            record.first_name = value;
        }
        if let Some(value) = request.last_name {
            record.last_name = value;
        }
        if let Some(value) = request.username {
            record.username = value;
        }
        if let Some(value) = request.image {
            record.image = value;
        }
        if let Some(value) = request.is_verified {
            record.is_verified = value;
        }
        if let Some(list) = request.sub_services {
            record.sub_services = list.values;
        }
        if let Some(list) = request.roles {
            record.roles = list.values;
        }
        if let Some(list) = request.departments {
            record.departments = list.values;
        }
        Ok(record.clone())
    }

    async fn get_roles(
        &self,
        _request: proto::VocabularyRequest,
    ) -> Result<proto::RoleList, Status> {
        self.authority.calls.get_roles.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        Ok(proto::RoleList {
            roles: self.authority.roles.read().unwrap().clone(),
        })
    }

    async fn get_departments(
        &self,
        _request: proto::VocabularyRequest,
    ) -> Result<proto::DepartmentList, Status> {
        self.authority
            .calls
            .get_departments
            .fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.authority.take_failure() {
            return Err(status);
        }
        Ok(proto::DepartmentList {
            departments: self.authority.departments.read().unwrap().clone(),
        })
    }
}

/// A ready-made user record for tests.
#[must_use]
pub fn sample_user(id: i64) -> proto::UserRecord {
    proto::UserRecord {
        id,
        national_id: format!("{:010}", id),
        phone: format!("+1555000{id:04}"),
        email: format!("user{id}@example.com"),
        first_name: "Test".into(),
        last_name: format!("User{id}"),
        username: format!("user{id}"),
        service: "billing".into(),
        sub_services: vec!["billing-api".into()],
        roles: vec!["member".into()],
        departments: vec!["engineering".into()],
        image: String::new(),
        is_verified: true,
        is_staff: false,
        is_superuser: false,
    }
}
