//! Subcommand implementations, one module per directory population.

pub mod clients;
pub mod completions;
pub mod team;

pub use clients::{run_client_create, run_client_toggle, run_client_users};
pub use completions::generate_completions;
pub use team::{
    run_create, run_delete, run_reset_password, run_stats, run_toggle, run_update, run_user,
    run_users,
};
