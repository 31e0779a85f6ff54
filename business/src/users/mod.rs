//! Team and client-portal user management.
//!
//! - `api`: typed calls against the directory
//! - `cache`: cached views and the mutation → invalidation table
//! - `mutations`: validate / confirm / call / invalidate sequencing
//! - `filter`, `validate`: pure helpers
//! - `panel`: what the users screen keeps between renders

pub mod api;
pub mod cache;
pub mod filter;
pub mod mutations;
pub mod panel;
pub mod validate;

pub use api::{ApiResult, DirectoryClient};
pub use cache::{CacheCoordinator, CacheKey, Mutation};
pub use filter::{RoleFilter, filter_client_users, filter_users};
pub use mutations::MutationOrchestrator;
pub use panel::{ActionStatus, UserAction, UserForm, UsersPanelState};
