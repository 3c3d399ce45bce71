//! In-memory stand-in for the Lost & Found API and its database, following
//! the API contract closely enough to drive full runs in unit tests.

use crate::client::{ApiClient, ApiRequest, ApiResponse, Endpoint, Method};
use crate::db::Database;
use crate::error::{HarnessError, Result, TransportError};
use crate::utils::{Config, TestData};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

pub fn sample_config() -> Config {
    serde_json::from_value(json!({
        "base_url": "http://mock.local/api/v1",
        "users": {
            "admin": {
                "email": "admin@lnf.io",
                "password": "admin-pass",
                "first_name": "Ada",
                "last_name": "Admin"
            },
            "regular": {
                "email": "john@lnf.io",
                "password": "john-pass",
                "first_name": "John",
                "last_name": "Doe"
            }
        },
        "db_config": {
            "host": "localhost",
            "port": "5432",
            "db_name": "lostfound",
            "user": "postgres",
            "password": "postgres"
        },
        "request_timeout_ms": 2000
    }))
    .expect("sample config is valid")
}

pub fn sample_data() -> TestData {
    serde_json::from_value(json!({
        "lost_items": [
            {"title": "Black wallet", "category": "accessories", "location": "Library"},
            {"title": "Blue umbrella", "category": "other", "location": "Cafeteria"},
            {"title": "Laptop charger", "category": "electronics", "location": "Lab 2"}
        ],
        "lost_item_updates": [
            {"target": 2, "title": "Navy umbrella"}
        ],
        "found_items": [
            {"title": "Keys on a red lanyard", "category": "keys", "location": "Gym"},
            {"title": "Student ID card", "category": "documents", "location": "Parking lot"}
        ],
        "found_item_updates": [
            {"target": 1, "location": "Gym entrance"}
        ],
        "search_queries": [
            {"type": "lost", "keyword": "wallet"}
        ]
    }))
    .expect("sample data is valid")
}

#[derive(Debug)]
struct MockUser {
    id: i64,
    email: String,
    password: String,
    is_admin: bool,
    is_banned: bool,
}

#[derive(Debug)]
struct MockItem {
    owner: i64,
    fields: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, MockItem>,
    next_id: i64,
}

impl Table {
    fn insert(&mut self, owner: i64, fields: Map<String, Value>) -> i64 {
        self.next_id += 1;
        self.rows.insert(self.next_id, MockItem { owner, fields });
        self.next_id
    }
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    lost: Table,
    found: Table,

    offline: bool,
    delay: Option<Duration>,
    /// Resets that succeed before every further one fails
    reset_budget: Option<u32>,
    panic_on_search: bool,
    fail_status: Option<u16>,
    reset_count: u32,
    closed: bool,
}

/// Serves both seams of the harness: [`ApiClient`] and [`Database`]
#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

fn envelope(status: u16, message: &str, data: Value) -> ApiResponse {
    let outcome = if status < 400 { "success" } else { "error" };
    ApiResponse::new(
        status,
        Some(json!({ "status": outcome, "message": message, "data": data })),
    )
}

fn error(status: u16, message: &str) -> ApiResponse {
    envelope(status, message, Value::Null)
}

fn item_json(id: i64, item: &MockItem) -> Value {
    let mut data = item.fields.clone();
    data.insert("id".into(), Value::from(id));
    data.insert("user_id".into(), Value::from(item.owner));
    Value::Object(data)
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Every call fails at the transport level
    pub fn go_offline(&self) {
        self.state().offline = true;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn fail_resets(&self) {
        self.fail_resets_after(0);
    }

    /// Let the first `n` resets succeed, fail the rest
    pub fn fail_resets_after(&self, n: u32) {
        self.state().reset_budget = Some(n);
    }

    pub fn panic_on_search(&self) {
        self.state().panic_on_search = true;
    }

    /// Answer every API call with `status`
    pub fn fail_status(&self, status: u16) {
        self.state().fail_status = Some(status);
    }

    pub fn reset_count(&self) -> u32 {
        self.state().reset_count
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl MockState {
    fn user_for(&self, token: Option<&str>) -> std::result::Result<&MockUser, ApiResponse> {
        let id = token
            .and_then(|t| self.tokens.get(t))
            .ok_or_else(|| error(401, "Unauthorized"))?;
        let user = self
            .users
            .iter()
            .find(|u| u.id == *id)
            .ok_or_else(|| error(401, "Unauthorized"))?;
        if user.is_banned {
            return Err(error(403, "Account is banned"));
        }
        Ok(user)
    }

    fn admin_for(&self, token: Option<&str>) -> std::result::Result<&MockUser, ApiResponse> {
        let user = self.user_for(token)?;
        if !user.is_admin {
            return Err(error(403, "Admin access required"));
        }
        Ok(user)
    }

    fn table(&mut self, lost: bool) -> &mut Table {
        if lost {
            &mut self.lost
        } else {
            &mut self.found
        }
    }

    fn route(&mut self, request: &ApiRequest) -> ApiResponse {
        let token = request.token.as_deref();
        let body = request.body.clone().unwrap_or(Value::Null);

        let outcome = match (request.method, &request.endpoint) {
            (Method::Post, Endpoint::Signup) => Ok(self.signup(&body)),
            (Method::Post, Endpoint::Login(_)) => Ok(self.login(&body)),

            (Method::Post, Endpoint::CreateLostItem) => self.create_item(true, token, &body),
            (Method::Post, Endpoint::CreateFoundItem) => self.create_item(false, token, &body),
            (method, Endpoint::LostItem(id)) => self.item(true, method, *id, token, &body),
            (method, Endpoint::FoundItem(id)) => self.item(false, method, *id, token, &body),

            (Method::Patch, Endpoint::AdminUser(id)) => self.set_banned(*id, token, &body),
            (Method::Patch, Endpoint::AdminItem(id)) => self.moderate(*id, token, &body),
            (Method::Get, Endpoint::AdminReports) => self.admin_for(token).map(|_| {
                envelope(
                    200,
                    "Reports",
                    json!({
                        "users": self.users.len(),
                        "lost_items": self.lost.rows.len(),
                        "found_items": self.found.rows.len()
                    }),
                )
            }),

            (Method::Get, Endpoint::Search) | (Method::Get, Endpoint::Items) => {
                Ok(envelope(200, "Items", json!([])))
            }
            (Method::Get, Endpoint::ItemStats) => Ok(envelope(
                200,
                "Statistics",
                json!({ "lost": self.lost.rows.len(), "found": self.found.rows.len() }),
            )),

            _ => Err(error(405, "Method not allowed")),
        };
        outcome.unwrap_or_else(|response| response)
    }

    fn signup(&mut self, body: &Value) -> ApiResponse {
        let (Some(email), Some(password)) = (
            body.get("email").and_then(Value::as_str),
            body.get("password").and_then(Value::as_str),
        ) else {
            return error(400, "email and password are required");
        };
        if self.users.iter().any(|u| u.email == email) {
            return error(400, "Email already registered");
        }

        let id = self.users.len() as i64 + 1;
        self.users.push(MockUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            is_admin: false,
            is_banned: false,
        });
        envelope(201, "User registered", json!({ "id": id, "email": email }))
    }

    fn login(&mut self, body: &Value) -> ApiResponse {
        let email = body.get("email").and_then(Value::as_str);
        let password = body.get("password").and_then(Value::as_str);
        let Some(user) = self
            .users
            .iter()
            .find(|u| Some(u.email.as_str()) == email && Some(u.password.as_str()) == password)
        else {
            return error(401, "Invalid credentials");
        };

        let token = format!("mock-token-{}-{}", user.id, self.tokens.len() + 1);
        let id = user.id;
        self.tokens.insert(token.clone(), id);
        envelope(200, "Logged in", json!({ "token": token }))
    }

    fn create_item(
        &mut self,
        lost: bool,
        token: Option<&str>,
        body: &Value,
    ) -> std::result::Result<ApiResponse, ApiResponse> {
        let owner = self.user_for(token)?.id;
        let fields = body
            .as_object()
            .cloned()
            .ok_or_else(|| error(400, "Invalid payload"))?;

        let table = self.table(lost);
        let id = table.insert(owner, fields);
        let data = item_json(id, &table.rows[&id]);
        Ok(envelope(201, "Item created", data))
    }

    fn item(
        &mut self,
        lost: bool,
        method: Method,
        id: i64,
        token: Option<&str>,
        body: &Value,
    ) -> std::result::Result<ApiResponse, ApiResponse> {
        if method == Method::Get {
            let table = self.table(lost);
            let item = table.rows.get(&id).ok_or_else(|| error(404, "Item not found"))?;
            return Ok(envelope(200, "Item", item_json(id, item)));
        }

        let user = self.user_for(token)?;
        let (user_id, is_admin) = (user.id, user.is_admin);
        let table = self.table(lost);
        let item = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| error(404, "Item not found"))?;
        if item.owner != user_id && !is_admin {
            return Err(error(403, "Not the owner of this item"));
        }

        match method {
            Method::Patch => {
                if let Some(fields) = body.as_object() {
                    item.fields.extend(fields.clone());
                }
                let data = item_json(id, item);
                Ok(envelope(200, "Item updated", data))
            }
            Method::Delete => {
                table.rows.remove(&id);
                Ok(envelope(200, "Item deleted", Value::Null))
            }
            _ => Err(error(405, "Method not allowed")),
        }
    }

    fn set_banned(
        &mut self,
        id: i64,
        token: Option<&str>,
        body: &Value,
    ) -> std::result::Result<ApiResponse, ApiResponse> {
        self.admin_for(token)?;
        let banned = body
            .get("is_banned")
            .and_then(Value::as_bool)
            .ok_or_else(|| error(400, "is_banned must be a boolean"))?;
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| error(404, "User not found"))?;
        user.is_banned = banned;
        Ok(envelope(200, "User updated", json!({ "id": id, "is_banned": banned })))
    }

    fn moderate(
        &mut self,
        id: i64,
        token: Option<&str>,
        body: &Value,
    ) -> std::result::Result<ApiResponse, ApiResponse> {
        self.admin_for(token)?;
        let lost = match body.get("type").and_then(Value::as_str) {
            Some("lost") => true,
            Some("found") => false,
            _ => return Err(error(400, "type must be 'lost' or 'found'")),
        };
        let status = body
            .get("status")
            .cloned()
            .ok_or_else(|| error(400, "status is required"))?;
        let item = self
            .table(lost)
            .rows
            .get_mut(&id)
            .ok_or_else(|| error(404, "Item not found"))?;
        item.fields.insert("status".into(), status);
        Ok(envelope(200, "Status updated", item_json(id, item)))
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let (delay, offline, panic_on_search) = {
            let state = self.state();
            (state.delay, state.offline, state.panic_on_search)
        };

        // Outside the lock so teardown can still use the state
        if panic_on_search && request.endpoint == Endpoint::Search {
            panic!("mock search endpoint exploded");
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if offline {
            return Err(TransportError::Connect("connection refused".into()));
        }

        let mut state = self.state();
        if let Some(status) = state.fail_status {
            return Ok(error(status, "Internal server error"));
        }
        Ok(state.route(&request))
    }
}

#[async_trait]
impl Database for MockApi {
    async fn set_admin_role(&self, email: &str) -> Result<()> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| HarnessError::Setup(format!("no user with email {}", email)))?;
        user.is_admin = true;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state();
        if state.reset_budget.is_some_and(|budget| state.reset_count >= budget) {
            return Err(HarnessError::Setup("permission denied for TRUNCATE".into()));
        }
        state.users.clear();
        state.tokens.clear();
        state.lost = Table::default();
        state.found = Table::default();
        state.reset_count += 1;
        Ok(())
    }

    async fn close(&self) {
        self.state().closed = true;
    }
}
