//! `staffdesk`: command-line admin console for the staff directory.

mod cli;
mod commands;
mod confirm;
mod context;
mod output;
mod tables;
mod timing;

use anyhow::Result;
use clap::Parser as _;
use staffdesk_business::{CreateClientUserRequest, CreateUserRequest, UserPatch};

use crate::cli::{Cli, Commands};
use crate::commands::{
    generate_completions, run_client_create, run_client_toggle, run_client_users, run_create,
    run_delete, run_reset_password, run_stats, run_toggle, run_update, run_user, run_users,
};
use crate::context::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    timing::init_tracing(cli.verbose, cli.timing);

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let session = Session::from_cli(&cli)?;

    match cli.command {
        Commands::Stats => run_stats(&session).await,
        Commands::Users { search, role } => run_users(&session, &search, role).await,
        Commands::User { id } => run_user(&session, id).await,
        Commands::Create {
            email,
            name,
            role,
            no_welcome_email,
        } => {
            let request = CreateUserRequest {
                send_welcome_email: !no_welcome_email,
                ..CreateUserRequest::new(email, name, role)
            };
            run_create(&session, request).await
        }
        Commands::Update {
            id,
            name,
            email,
            role,
            active,
        } => {
            let patch = UserPatch {
                full_name: name,
                email,
                role,
                is_active: active,
            };
            run_update(&session, id, patch).await
        }
        Commands::Toggle { id } => run_toggle(&session, id).await,
        Commands::ResetPassword { id } => run_reset_password(&session, id).await,
        Commands::Delete { id } => run_delete(&session, id).await,
        Commands::ClientUsers {
            search,
            active_only,
        } => run_client_users(&session, &search, active_only).await,
        Commands::ClientCreate {
            client_id,
            email,
            name,
            password,
            no_welcome_email,
        } => {
            let request = CreateClientUserRequest {
                client_id,
                email,
                full_name: name,
                password,
                send_welcome_email: !no_welcome_email,
            };
            run_client_create(&session, request).await
        }
        Commands::ClientToggle { id } => run_client_toggle(&session, id).await,
        Commands::Completions { .. } => Ok(()),
    }
}
