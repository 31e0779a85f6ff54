use clap::{Parser, Subcommand};
use clap_complete::Shell;
use staffdesk_business::{Role, RoleFilter, UserId};

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "Admin console for the staff directory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory base URL (without `/api/v1`)
    #[arg(long, global = true, env = "STAFFDESK_API_BASE_URL")]
    pub api_url: Option<String>,

    /// Bearer token used for every request
    #[arg(long, global = true, env = "STAFFDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Team headcount by status and role
    Stats,
    /// List team users
    Users {
        /// Match against name or email
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// Only show one role (`all` for every role)
        #[arg(long, short = 'r', default_value_t = RoleFilter::All)]
        role: RoleFilter,
    },
    /// Show one team user
    User { id: UserId },
    /// Create a team user
    Create {
        #[arg(long)]
        email: String,

        /// Full name
        #[arg(long)]
        name: String,

        #[arg(long)]
        role: Role,

        /// Do not send the welcome email
        #[arg(long)]
        no_welcome_email: bool,
    },
    /// Change name, email, role or status of a team user
    Update {
        id: UserId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        active: Option<bool>,
    },
    /// Enable or disable a team user
    Toggle { id: UserId },
    /// Email a new password to a team user
    ResetPassword { id: UserId },
    /// Delete a team user
    Delete { id: UserId },
    /// List client portal users
    ClientUsers {
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// Hide disabled accounts
        #[arg(long)]
        active_only: bool,
    },
    /// Create a client portal user
    ClientCreate {
        #[arg(long)]
        client_id: u64,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// Initial password
        #[arg(long)]
        password: String,

        #[arg(long)]
        no_welcome_email: bool,
    },
    /// Enable or disable a client portal user
    ClientToggle { id: UserId },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
