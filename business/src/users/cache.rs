//! Cache coordinator for directory views.
//!
//! Each logical view (`users`, `stats`, `client-users`) is a [`QuerySlot`].
//! Mutations never touch the slots directly: they report what succeeded and
//! the coordinator invalidates the keys listed for it in
//! [`Mutation::invalidates`], then refetches them in the background.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use staffdesk_states::{Freshness, QuerySlot};
use tokio::task::JoinSet;

use crate::directory::{ClientPortalUser, TeamStats, TeamUser};
use crate::error::DirectoryError;
use crate::users::api::{ApiResult, DirectoryClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Users,
    Stats,
    ClientUsers,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [CacheKey::Users, CacheKey::Stats, CacheKey::ClientUsers];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Stats => "stats",
            Self::ClientUsers => "client-users",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every mutating action the console can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateUser,
    UpdateUser,
    ToggleUser,
    ResetPassword,
    DeleteUser,
    CreateClientUser,
    ToggleClientUser,
}

impl Mutation {
    /// Keys made stale by a confirmed success.
    ///
    /// `users` and `stats` always travel together: stats are an aggregate of
    /// the list and must never be shown against a different version of it.
    pub fn invalidates(self) -> &'static [CacheKey] {
        match self {
            Self::CreateUser | Self::UpdateUser | Self::ToggleUser | Self::DeleteUser => {
                &[CacheKey::Users, CacheKey::Stats]
            }
            Self::ResetPassword => &[],
            Self::CreateClientUser | Self::ToggleClientUser => &[CacheKey::ClientUsers],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CreateUser => "Create user",
            Self::UpdateUser => "Update user",
            Self::ToggleUser => "Toggle user",
            Self::ResetPassword => "Reset password",
            Self::DeleteUser => "Delete user",
            Self::CreateClientUser => "Create client user",
            Self::ToggleClientUser => "Toggle client user",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::CreateUser => "User created",
            Self::UpdateUser => "User updated",
            Self::ToggleUser => "User status changed",
            Self::ResetPassword => "Password reset",
            Self::DeleteUser => "User deleted",
            Self::CreateClientUser => "Client user created",
            Self::ToggleClientUser => "Client user status changed",
        }
    }

    /// Shown when the directory gives no `detail`.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::CreateUser => "Failed to create user",
            Self::UpdateUser => "Failed to update user",
            Self::ToggleUser => "Failed to change user status",
            Self::ResetPassword => "Failed to reset password",
            Self::DeleteUser => "Failed to delete user",
            Self::CreateClientUser => "Failed to create client user",
            Self::ToggleClientUser => "Failed to change client user status",
        }
    }
}

type Slot<T> = Arc<QuerySlot<T, DirectoryError>>;

/// Owns the cached directory views. Cheap to clone; clones share the cache.
#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    api: DirectoryClient,
    users: Slot<Vec<TeamUser>>,
    stats: Slot<TeamStats>,
    client_users: Slot<Vec<ClientPortalUser>>,
    refetches: Arc<Mutex<JoinSet<()>>>,
}

impl CacheCoordinator {
    pub fn new(api: DirectoryClient) -> Self {
        Self {
            api,
            users: Arc::new(QuerySlot::new("users")),
            stats: Arc::new(QuerySlot::new("stats")),
            client_users: Arc::new(QuerySlot::new("client-users")),
            refetches: Arc::default(),
        }
    }

    pub fn users(&self) -> &QuerySlot<Vec<TeamUser>, DirectoryError> {
        &self.users
    }

    pub fn stats(&self) -> &QuerySlot<TeamStats, DirectoryError> {
        &self.stats
    }

    pub fn client_users(&self) -> &QuerySlot<Vec<ClientPortalUser>, DirectoryError> {
        &self.client_users
    }

    pub fn freshness(&self, key: CacheKey) -> Freshness {
        match key {
            CacheKey::Users => self.users.freshness(),
            CacheKey::Stats => self.stats.freshness(),
            CacheKey::ClientUsers => self.client_users.freshness(),
        }
    }

    /// How many times `key` has been invalidated.
    pub fn epoch(&self, key: CacheKey) -> u64 {
        match key {
            CacheKey::Users => self.users.epoch(),
            CacheKey::Stats => self.stats.epoch(),
            CacheKey::ClientUsers => self.client_users.epoch(),
        }
    }

    /// Cached list when clean, otherwise fetched (or joined if a fetch is
    /// already running).
    pub async fn load_users(&self) -> ApiResult<Arc<Vec<TeamUser>>> {
        self.users.get_or_fetch(|| self.api.list_users()).await
    }

    pub async fn load_stats(&self) -> ApiResult<Arc<TeamStats>> {
        self.stats.get_or_fetch(|| self.api.get_stats()).await
    }

    pub async fn load_client_users(&self) -> ApiResult<Arc<Vec<ClientPortalUser>>> {
        self.client_users
            .get_or_fetch(|| self.api.list_client_users())
            .await
    }

    /// Fetches `key` regardless of freshness. Concurrent refetches of the
    /// same key share one request.
    pub async fn refetch(&self, key: CacheKey) -> ApiResult<()> {
        match key {
            CacheKey::Users => {
                self.users.fetch_with(|| self.api.list_users()).await?;
            }
            CacheKey::Stats => {
                self.stats.fetch_with(|| self.api.get_stats()).await?;
            }
            CacheKey::ClientUsers => {
                self.client_users
                    .fetch_with(|| self.api.list_client_users())
                    .await?;
            }
        }
        Ok(())
    }

    /// Marks `key` stale and schedules its refetch. Readers keep seeing the
    /// previous data until the refetch lands.
    pub fn invalidate(&self, key: CacheKey) {
        self.mark_stale(key);
        self.spawn_refetch(key);
    }

    /// Invalidates the whole dependency set of a confirmed mutation.
    ///
    /// Every key is marked stale before any refetch starts, so no refetch can
    /// observe a half-invalidated set.
    pub fn invalidate_for(&self, mutation: Mutation) {
        let keys = mutation.invalidates();
        if keys.is_empty() {
            return;
        }

        info!(
            "{} confirmed, invalidating [{}]",
            mutation.label(),
            keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        );
        for &key in keys {
            self.mark_stale(key);
        }
        for &key in keys {
            self.spawn_refetch(key);
        }
    }

    /// Waits for every scheduled refetch, including ones scheduled while
    /// waiting.
    pub async fn settled(&self) {
        loop {
            let mut pending = {
                let mut guard = self.refetches.lock().unwrap_or_else(PoisonError::into_inner);
                mem::take(&mut *guard)
            };
            if pending.is_empty() {
                return;
            }
            while let Some(joined) = pending.join_next().await {
                if let Err(err) = joined {
                    warn!("refetch task did not finish: {err}");
                }
            }
        }
    }

    /// `stats` describes exactly the population in `users`.
    ///
    /// Only meaningful when both are clean and idle; mid-refetch the answer
    /// is `true` by definition.
    pub fn views_agree(&self) -> bool {
        if self.users.is_fetching() || self.stats.is_fetching() {
            return true;
        }
        let users = self.users.snapshot();
        let stats = self.stats.snapshot();
        match (users.freshness, stats.freshness, users.data, stats.data) {
            (Freshness::Clean, Freshness::Clean, Some(users), Some(stats)) => {
                stats.is_consistent() && TeamStats::from_users(users.iter()) == *stats
            }
            _ => true,
        }
    }

    fn mark_stale(&self, key: CacheKey) {
        let epoch = match key {
            CacheKey::Users => self.users.invalidate(),
            CacheKey::Stats => self.stats.invalidate(),
            CacheKey::ClientUsers => self.client_users.invalidate(),
        };
        debug!("{key} marked stale (epoch {epoch})");
    }

    fn spawn_refetch(&self, key: CacheKey) {
        let cache = self.clone();
        let mut tasks = self.refetches.lock().unwrap_or_else(PoisonError::into_inner);
        // Reap finished refetches so the set does not grow unbounded.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if let Err(err) = cache.refetch(key).await {
                warn!("refetch of {key} failed: {err}");
            }
        });
    }
}
