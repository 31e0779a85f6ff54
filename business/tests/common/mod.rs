//! Shared fixtures: an in-memory directory served over wiremock.
//!
//! `FakeDirectory` answers every `/api/v1` endpoint the console uses, keeps
//! its own user tables, and enforces the same rules as the real directory
//! (unique emails, known roles and clients, bearer auth).

#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};
use staffdesk_business::{
    ClientPortalUser, Confirmer, Console, ConsoleConfig, InFlightPolicy, Notification, Role,
    StaticToken, TeamStats, TeamUser, UserId,
};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "test-token";
const PREFIX: &str = "/api/v1";
const CLIENTS: [(u64, &str); 2] = [(1, "Globex"), (2, "Initech")];

#[derive(Default)]
struct FakeState {
    users: Vec<TeamUser>,
    client_users: Vec<ClientPortalUser>,
    next_id: u64,
    delay: Option<Duration>,
    fail_next: Option<(u16, Option<String>)>,
    reply_next: Option<ResponseTemplate>,
    current_admin: Option<UserId>,
}

impl FakeState {
    fn allocate_id(&mut self) -> UserId {
        self.next_id += 1;
        UserId(self.next_id)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .filter(|u| Some(u.id) != except)
            .any(|u| u.email == email)
            || self.client_users.iter().any(|u| u.email == email)
    }

    fn team_index(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }
}

#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<FakeState>>,
}

fn detail(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": message }))
}

fn body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_team_user(self, name: &str, email: &str, role: Role, active: bool) -> Self {
        {
            let mut state = self.state();
            let id = state.allocate_id();
            state.users.push(TeamUser {
                id,
                email: email.to_owned(),
                full_name: name.to_owned(),
                role,
                is_active: active,
                created_at: format!("2026-01-{:02}T09:00:00", id.0),
            });
        }
        self
    }

    pub fn with_client_user(self, name: &str, email: &str, client_id: u64, active: bool) -> Self {
        {
            let mut state = self.state();
            let id = state.allocate_id();
            let client_name = CLIENTS
                .iter()
                .find(|(cid, _)| *cid == client_id)
                .map_or("Unknown", |(_, name)| *name);
            state.client_users.push(ClientPortalUser {
                id,
                client_id: Some(client_id),
                client_name: client_name.to_owned(),
                email: email.to_owned(),
                full_name: name.to_owned(),
                is_active: active,
                created_at: Some(format!("2026-02-{:02}T09:00:00", id.0 % 28 + 1)),
            });
        }
        self
    }

    /// The signed-in admin; the directory refuses to disable or delete it.
    pub fn signed_in_as(self, id: UserId) -> Self {
        self.state().current_admin = Some(id);
        self
    }

    /// Every response is held back this long.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// The next non-GET request fails with `status` and optional `detail`.
    pub fn fail_next_mutation(&self, status: u16, detail: Option<&str>) {
        self.state().fail_next = Some((status, detail.map(str::to_owned)));
    }

    /// The next non-GET request is applied as usual, but answered with
    /// `reply` instead of the normal body.
    pub fn reply_next_mutation_with(&self, reply: ResponseTemplate) {
        self.state().reply_next = Some(reply);
    }

    pub fn team_users(&self) -> Vec<TeamUser> {
        self.state().users.clone()
    }

    pub fn team_user(&self, id: UserId) -> Option<TeamUser> {
        self.state().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn client_users(&self) -> Vec<ClientPortalUser> {
        self.state().client_users.clone()
    }

    fn route(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {TOKEN}").as_str());
        if !authorized {
            return detail(401, "Not authenticated");
        }

        let method = request.method.as_str();
        let mut state = self.state();

        if method != "GET" {
            if let Some((status, message)) = state.fail_next.take() {
                return match message {
                    Some(message) => detail(status, &message),
                    None => ResponseTemplate::new(status),
                };
            }
        }

        let path = request.url.path().trim_start_matches(PREFIX);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            ("GET", ["admin", "team", "stats"]) => {
                ResponseTemplate::new(200).set_body_json(TeamStats::from_users(&state.users))
            }
            ("GET", ["admin", "team", "users"]) => {
                let newest_first: Vec<&TeamUser> = state.users.iter().rev().collect();
                ResponseTemplate::new(200).set_body_json(newest_first)
            }
            ("POST", ["admin", "team", "users"]) => create_team_user(&mut state, &body(request)),
            ("GET", ["admin", "team", "users", raw]) => match parse_id(raw)
                .and_then(|id| state.team_index(id))
            {
                Some(index) => ResponseTemplate::new(200).set_body_json(&state.users[index]),
                None => detail(404, "User not found"),
            },
            ("PATCH", ["admin", "team", "users", raw]) => match parse_id(raw) {
                Some(id) => update_team_user(&mut state, id, &body(request)),
                None => detail(404, "User not found"),
            },
            ("DELETE", ["admin", "team", "users", raw]) => match parse_id(raw) {
                Some(id) => delete_team_user(&mut state, id),
                None => detail(404, "User not found"),
            },
            ("PATCH", ["admin", "team", "users", raw, "toggle"]) => match parse_id(raw) {
                Some(id) => toggle_team_user(&mut state, id),
                None => detail(404, "User not found"),
            },
            ("POST", ["admin", "team", "users", raw, "reset-password"]) => {
                match parse_id(raw).and_then(|id| state.team_index(id)) {
                    Some(_) => ResponseTemplate::new(200).set_body_json(json!({
                        "success": true,
                        "message": "Password reset successfully. New password has been sent to the user's email."
                    })),
                    None => detail(404, "User not found"),
                }
            }
            ("GET", ["client-portal", "admin", "users"]) => {
                ResponseTemplate::new(200).set_body_json(&state.client_users)
            }
            ("POST", ["client-portal", "admin", "users"]) => {
                create_client_user(&mut state, &body(request))
            }
            ("PATCH", ["client-portal", "admin", "users", raw, "toggle"]) => {
                let found = match parse_id(raw) {
                    Some(id) => state.client_users.iter_mut().find(|u| u.id == id),
                    None => None,
                };
                match found {
                    Some(user) => {
                        user.is_active = !user.is_active;
                        toggle_ack(user.is_active)
                    }
                    None => detail(404, "Client user not found"),
                }
            }
            _ => detail(404, "Not Found"),
        }
    }
}

fn parse_id(raw: &str) -> Option<UserId> {
    raw.parse().ok().map(UserId)
}

fn toggle_ack(is_active: bool) -> ResponseTemplate {
    let verb = if is_active { "enabled" } else { "disabled" };
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "is_active": is_active,
        "message": format!("User {verb} successfully"),
    }))
}

fn parse_role(value: &Value) -> Option<Role> {
    value.as_str().and_then(|raw| raw.parse().ok())
}

fn create_team_user(state: &mut FakeState, payload: &Value) -> ResponseTemplate {
    let Some(role) = parse_role(&payload["role"]) else {
        return detail(
            400,
            "Invalid role. Must be one of: recruiter, account_manager, bd_sales, finance, admin",
        );
    };
    let email = payload["email"].as_str().unwrap_or_default().to_owned();
    if state.email_taken(&email, None) {
        return detail(400, "This email is already registered in the system");
    }

    let id = state.allocate_id();
    let user = TeamUser {
        id,
        email,
        full_name: payload["full_name"].as_str().unwrap_or_default().to_owned(),
        role,
        is_active: true,
        created_at: format!("2026-04-01T10:00:{:02}", id.0 % 60),
    };
    state.users.push(user.clone());
    ResponseTemplate::new(201).set_body_json(user)
}

fn update_team_user(state: &mut FakeState, id: UserId, payload: &Value) -> ResponseTemplate {
    let Some(index) = state.team_index(id) else {
        return detail(404, "User not found");
    };

    if let Some(email) = payload.get("email").and_then(Value::as_str) {
        if state.email_taken(email, Some(id)) {
            return detail(400, "Email already in use");
        }
    }
    if payload.get("is_active") == Some(&Value::Bool(false)) && state.current_admin == Some(id) {
        return detail(400, "You cannot deactivate your own account");
    }
    let role = match payload.get("role") {
        Some(raw) => match parse_role(raw) {
            Some(role) => Some(role),
            None => return detail(400, "Invalid role"),
        },
        None => None,
    };

    let user = &mut state.users[index];
    if let Some(name) = payload.get("full_name").and_then(Value::as_str) {
        name.clone_into(&mut user.full_name);
    }
    if let Some(email) = payload.get("email").and_then(Value::as_str) {
        email.clone_into(&mut user.email);
    }
    if let Some(role) = role {
        user.role = role;
    }
    if let Some(active) = payload.get("is_active").and_then(Value::as_bool) {
        user.is_active = active;
    }
    ResponseTemplate::new(200).set_body_json(user.clone())
}

fn toggle_team_user(state: &mut FakeState, id: UserId) -> ResponseTemplate {
    let Some(index) = state.team_index(id) else {
        return detail(404, "User not found");
    };
    if state.current_admin == Some(id) {
        return detail(400, "You cannot disable your own account");
    }
    let user = &mut state.users[index];
    user.is_active = !user.is_active;
    toggle_ack(user.is_active)
}

fn delete_team_user(state: &mut FakeState, id: UserId) -> ResponseTemplate {
    let Some(index) = state.team_index(id) else {
        return detail(404, "User not found");
    };
    if state.current_admin == Some(id) {
        return detail(400, "You cannot delete your own account");
    }
    let user = state.users.remove(index);
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "message": format!("User {} ({}) deleted successfully", user.full_name, user.email),
    }))
}

fn create_client_user(state: &mut FakeState, payload: &Value) -> ResponseTemplate {
    let client_id = payload["client_id"].as_u64().unwrap_or_default();
    let Some((_, client_name)) = CLIENTS.iter().find(|(id, _)| *id == client_id) else {
        return detail(404, "Client not found");
    };
    let email = payload["email"].as_str().unwrap_or_default().to_owned();
    if state.email_taken(&email, None) {
        return detail(400, "Email already registered");
    }

    let id = state.allocate_id();
    let user = ClientPortalUser {
        id,
        client_id: Some(client_id),
        client_name: (*client_name).to_owned(),
        email,
        full_name: payload["full_name"].as_str().unwrap_or_default().to_owned(),
        is_active: true,
        created_at: None,
    };
    state.client_users.push(user.clone());
    ResponseTemplate::new(200).set_body_json(user)
}

impl Respond for FakeDirectory {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let delay = self.state().delay;
        let routed = self.route(request);
        let replaced = if request.method.as_str() == "GET" {
            None
        } else {
            self.state().reply_next.take()
        };
        let response = replaced.unwrap_or(routed);
        match delay {
            Some(delay) => response.set_delay(delay),
            None => response,
        }
    }
}

/// A console wired to a fresh mock server running `fake`.
pub struct TestConsole {
    pub server: MockServer,
    pub fake: FakeDirectory,
    pub console: Console,
    pub notifications: flume::Receiver<Notification>,
}

impl TestConsole {
    pub async fn start(fake: FakeDirectory, confirmer: Arc<dyn Confirmer>) -> Self {
        Self::start_with(fake, confirmer, InFlightPolicy::LetComplete, Some(TOKEN)).await
    }

    pub async fn start_with(
        fake: FakeDirectory,
        confirmer: Arc<dyn Confirmer>,
        policy: InFlightPolicy,
        token: Option<&str>,
    ) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let server = MockServer::start().await;
        Mock::given(path_regex("^/api/v1/.*"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;

        let config = ConsoleConfig::new(server.uri()).with_in_flight_policy(policy);
        let credentials = match token {
            Some(token) => StaticToken::new(token),
            None => StaticToken::signed_out(),
        };
        let (console, notifications) = Console::new(&config, Arc::new(credentials), confirmer)
            .expect("console should build");

        Self {
            server,
            fake,
            console,
            notifications,
        }
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests matching `method` and a path relative to `/api/v1`.
    pub async fn count(&self, method: &str, path: &str) -> usize {
        let full = format!("{PREFIX}{path}");
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() == method && r.url.path() == full)
            .count()
    }

    pub async fn mutating_requests(&self) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() != "GET")
            .count()
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.try_iter().collect()
    }
}
