//! Team-user commands.

use anyhow::{Context as _, Result};
use staffdesk_business::{
    CreateUserRequest, Mutation, RoleFilter, TeamUser, UserId, UserPatch, filter_users,
};
use tracing::instrument;

use crate::context::Session;
use crate::tables::{role_table, team_table};

async fn fetch_user(session: &Session, id: UserId) -> Result<TeamUser> {
    session
        .console
        .api()
        .get_user(id)
        .await
        .with_context(|| format!("Failed to load user {id}"))
}

#[instrument(skip_all, name = "stats")]
pub async fn run_stats(session: &Session) -> Result<()> {
    let stats = session
        .console
        .cache()
        .load_stats()
        .await
        .context("Failed to load team stats")?;

    let out = &session.out;
    out.labeled("Total", stats.total_users);
    out.labeled("Active", stats.active_users);
    out.labeled("Disabled", stats.inactive_users);
    out.newline();
    out.print(role_table(&stats));
    Ok(())
}

#[instrument(skip_all, name = "users", fields(search = %search, role = %role))]
pub async fn run_users(session: &Session, search: &str, role: RoleFilter) -> Result<()> {
    let users = session
        .console
        .cache()
        .load_users()
        .await
        .context("Failed to load team users")?;

    let visible = filter_users(&users, search, role);
    if visible.is_empty() {
        session.out.dim("No users match.");
        return Ok(());
    }

    session.out.newline();
    session.out.print(team_table(&visible));
    session.out.total("Total", visible.len(), "user");
    Ok(())
}

#[instrument(skip_all, name = "user", fields(%id))]
pub async fn run_user(session: &Session, id: UserId) -> Result<()> {
    let user = fetch_user(session, id).await?;

    let out = &session.out;
    out.labeled("ID", user.id);
    out.labeled("Name", &user.full_name);
    out.labeled("Email", &user.email);
    out.labeled("Role", user.role.label());
    out.labeled("Status", if user.is_active { "active" } else { "disabled" });
    if let Some(day) = user.created_on() {
        out.labeled("Created", day);
    }
    Ok(())
}

#[instrument(skip_all, name = "create", fields(email = %request.email))]
pub async fn run_create(session: &Session, request: CreateUserRequest) -> Result<()> {
    let result = session.console.mutations().create_user(request).await;
    if let Some(user) = session.conclude(Mutation::CreateUser, result)? {
        session.out.labeled("ID", user.id);
    }
    Ok(())
}

#[instrument(skip_all, name = "update", fields(%id))]
pub async fn run_update(session: &Session, id: UserId, patch: UserPatch) -> Result<()> {
    let result = session.console.mutations().update_user(id, patch).await;
    session.conclude(Mutation::UpdateUser, result)?;
    Ok(())
}

#[instrument(skip_all, name = "toggle", fields(%id))]
pub async fn run_toggle(session: &Session, id: UserId) -> Result<()> {
    let user = fetch_user(session, id).await?;
    let result = session.console.mutations().toggle_user(&user).await;
    session.conclude(Mutation::ToggleUser, result)?;
    Ok(())
}

#[instrument(skip_all, name = "reset_password", fields(%id))]
pub async fn run_reset_password(session: &Session, id: UserId) -> Result<()> {
    let user = fetch_user(session, id).await?;
    let result = session.console.mutations().reset_password(&user).await;
    session.conclude(Mutation::ResetPassword, result)?;
    Ok(())
}

#[instrument(skip_all, name = "delete", fields(%id))]
pub async fn run_delete(session: &Session, id: UserId) -> Result<()> {
    let user = fetch_user(session, id).await?;
    let result = session.console.mutations().delete_user(&user).await;
    session.conclude(Mutation::DeleteUser, result)?;
    Ok(())
}
