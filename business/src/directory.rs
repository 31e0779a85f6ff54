//! Wire and domain types for the user directory.
//!
//! Two populations live in the directory and never share a record shape:
//! [`TeamUser`] for internal staff and [`ClientPortalUser`] for hiring-client
//! contacts. [`DirectoryUser`] is the closed variant used where either may
//! appear.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Team roles. Client-portal accounts are not a team role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    AccountManager,
    BdSales,
    Finance,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Recruiter,
        Role::AccountManager,
        Role::BdSales,
        Role::Finance,
    ];

    /// Wire name, e.g. `account_manager`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Recruiter => "recruiter",
            Self::AccountManager => "account_manager",
            Self::BdSales => "bd_sales",
            Self::Finance => "finance",
        }
    }

    /// Human label for tables and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Recruiter => "Recruiter",
            Self::AccountManager => "Account Manager",
            Self::BdSales => "BD Sales",
            Self::Finance => "Finance",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        write!(
            f,
            "unknown role `{}`, expected one of: {}",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUser {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    /// ISO 8601, as reported by the directory.
    pub created_at: String,
}

impl TeamUser {
    /// Day the account was created, if `created_at` parses.
    pub fn created_on(&self) -> Option<NaiveDate> {
        parse_created_at(&self.created_at)
    }
}

/// Accepts RFC 3339 and the offset-less ISO form the directory emits for
/// naive timestamps.
fn parse_created_at(raw: &str) -> Option<NaiveDate> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|at| at.date())
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPortalUser {
    pub id: UserId,
    /// `None` when the directory cannot resolve the owning client.
    #[serde(default)]
    pub client_id: Option<u64>,
    pub client_name: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    #[serde(default)]
    pub by_role: BTreeMap<Role, u64>,
}

impl TeamStats {
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a TeamUser>) -> Self {
        let mut stats = Self::default();
        for user in users {
            stats.total_users += 1;
            if user.is_active {
                stats.active_users += 1;
            } else {
                stats.inactive_users += 1;
            }
            *stats.by_role.entry(user.role).or_default() += 1;
        }
        stats
    }

    /// Totals add up and every user is counted under exactly one role.
    pub fn is_consistent(&self) -> bool {
        self.total_users == self.active_users + self.inactive_users
            && self.by_role.values().sum::<u64>() == self.total_users
    }

    pub fn count_for(&self, role: Role) -> u64 {
        self.by_role.get(&role).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub send_welcome_email: bool,
}

impl CreateUserRequest {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            role,
            send_welcome_email: true,
        }
    }
}

/// Partial update. Absent fields are left untouched by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateClientUserRequest {
    pub client_id: u64,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub send_welcome_email: bool,
}

/// Result of a toggle.
///
/// The directory answers with `{success, is_active, message}`; a full user
/// record is accepted as well and counts as success.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToggleOutcome {
    #[serde(default = "accepted")]
    pub success: bool,
    pub is_active: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn accepted() -> bool {
    true
}

/// `{success, message}` acknowledgement for delete and password reset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Confirmation {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryUser {
    Team(TeamUser),
    Client(ClientPortalUser),
}

impl ClientPortalUser {
    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_created_at)
    }
}

impl DirectoryUser {
    pub fn id(&self) -> UserId {
        match self {
            Self::Team(user) => user.id,
            Self::Client(user) => user.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Team(user) => &user.full_name,
            Self::Client(user) => &user.full_name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Team(user) => &user.email,
            Self::Client(user) => &user.email,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::Team(user) => user.is_active,
            Self::Client(user) => user.is_active,
        }
    }
}

impl From<TeamUser> for DirectoryUser {
    fn from(user: TeamUser) -> Self {
        Self::Team(user)
    }
}

impl From<ClientPortalUser> for DirectoryUser {
    fn from(user: ClientPortalUser) -> Self {
        Self::Client(user)
    }
}

#[cfg(test)]
pub(crate) fn team_user(id: u64, name: &str, email: &str, role: Role, active: bool) -> TeamUser {
    TeamUser {
        id: UserId(id),
        email: email.to_owned(),
        full_name: name.to_owned(),
        role,
        is_active: active,
        created_at: "2026-01-01T00:00:00".to_owned(),
    }
}
