//! Client-portal user commands.

use anyhow::{Context as _, Result, anyhow};
use staffdesk_business::{CreateClientUserRequest, Mutation, UserId, filter_client_users};
use tracing::instrument;

use crate::context::Session;
use crate::tables::client_table;

#[instrument(skip_all, name = "client_users", fields(search = %search, active_only = active_only))]
pub async fn run_client_users(session: &Session, search: &str, active_only: bool) -> Result<()> {
    let users = session
        .console
        .cache()
        .load_client_users()
        .await
        .context("Failed to load client users")?;

    let visible = filter_client_users(&users, search, active_only);
    if visible.is_empty() {
        session.out.dim("No client users match.");
        return Ok(());
    }

    session.out.newline();
    session.out.print(client_table(&visible));
    session.out.total("Total", visible.len(), "client user");
    Ok(())
}

#[instrument(skip_all, name = "client_create", fields(client_id = request.client_id))]
pub async fn run_client_create(session: &Session, request: CreateClientUserRequest) -> Result<()> {
    let result = session.console.mutations().create_client_user(request).await;
    if let Some(user) = session.conclude(Mutation::CreateClientUser, result)? {
        session.out.labeled("ID", user.id);
        session.out.labeled("Client", &user.client_name);
    }
    Ok(())
}

/// The directory has no single-record endpoint for client users, so the
/// record comes from the cached list.
#[instrument(skip_all, name = "client_toggle", fields(%id))]
pub async fn run_client_toggle(session: &Session, id: UserId) -> Result<()> {
    let users = session
        .console
        .cache()
        .load_client_users()
        .await
        .context("Failed to load client users")?;
    let user = users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| anyhow!("No client user with id {id}"))?;

    let result = session.console.mutations().toggle_client_user(user).await;
    session.conclude(Mutation::ToggleClientUser, result)?;
    Ok(())
}
