//! Table rendering for directory records.

use staffdesk_business::{ClientPortalUser, Role, TeamStats, TeamUser};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const NAME_WIDTH: usize = 28;

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Users")]
    users: u64,
}

fn status(is_active: bool) -> &'static str {
    if is_active { "active" } else { "disabled" }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

fn render<R: Tabled>(rows: &[R]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn team_table(users: &[&TeamUser]) -> String {
    let rows: Vec<TeamRow> = users
        .iter()
        .map(|user| TeamRow {
            id: user.id.0,
            name: truncate_str(&user.full_name, NAME_WIDTH),
            email: user.email.clone(),
            role: user.role.label(),
            status: status(user.is_active),
            created: user
                .created_on()
                .map(|day| day.to_string())
                .unwrap_or_default(),
        })
        .collect();
    render(&rows)
}

pub fn client_table(users: &[&ClientPortalUser]) -> String {
    let rows: Vec<ClientRow> = users
        .iter()
        .map(|user| ClientRow {
            id: user.id.0,
            name: truncate_str(&user.full_name, NAME_WIDTH),
            email: user.email.clone(),
            client: truncate_str(&user.client_name, NAME_WIDTH),
            status: status(user.is_active),
        })
        .collect();
    render(&rows)
}

/// One row per role, zero counts included, in the directory's role order.
pub fn role_table(stats: &TeamStats) -> String {
    let rows: Vec<RoleRow> = Role::ALL
        .iter()
        .map(|&role| RoleRow {
            role: role.label(),
            users: stats.count_for(role),
        })
        .collect();
    render(&rows)
}
