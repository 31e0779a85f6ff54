//! Client-side data layer of the staffdesk admin console.
//!
//! Mutations against the remote user directory go through
//! [`MutationOrchestrator`], which only touches the cached views held by
//! [`CacheCoordinator`] after the directory confirms success. Destructive
//! actions wait on a [`ConfirmationGate`] first.

mod auth;
mod config;
mod confirm;
mod console;
mod directory;
mod error;
mod http;
mod notify;
pub mod users;

pub use auth::{CredentialSource, StaticToken};
pub use config::{ConfigError, ConsoleConfig, InFlightPolicy};
pub use confirm::{
    AutoConfirm, ConfirmationGate, ConfirmationQueue, ConfirmationRequest, Confirmer, Decider,
    Decision, DestructiveAction,
};
pub use console::Console;
pub use directory::{
    ClientPortalUser, Confirmation, CreateClientUserRequest, CreateUserRequest, DirectoryUser,
    Role, TeamStats, TeamUser, ToggleOutcome, UnknownRole, UserId, UserPatch,
};
pub use error::{DirectoryError, MutationError, ValidationError};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use users::{
    ActionStatus, CacheCoordinator, CacheKey, DirectoryClient, Mutation, MutationOrchestrator,
    RoleFilter, UserAction, UserForm, UsersPanelState, filter_client_users, filter_users,
};

pub use staffdesk_states::{Freshness, Snapshot};
