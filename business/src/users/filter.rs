//! Local search and role filtering over the cached lists.
//!
//! Every call is a full scan of the snapshot. That is fine for a directory of
//! a few thousand accounts; there is no index to keep in sync.

use std::fmt;
use std::str::FromStr;

use crate::directory::{ClientPortalUser, Role, TeamUser, UnknownRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Only(Role),
}

impl RoleFilter {
    pub fn matches(self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == role,
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(role) => fmt::Display::fmt(role, f),
        }
    }
}

impl FromStr for RoleFilter {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<Role> for RoleFilter {
    fn from(role: Role) -> Self {
        Self::Only(role)
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Users whose name or email contains `search` (case-insensitive) and whose
/// role passes `role`. Order is preserved.
///
/// Leading and trailing whitespace in `search` is ignored, so a padded or
/// blank search box behaves like its trimmed text. Inner spaces still have
/// to match literally.
pub fn filter_users<'a>(users: &'a [TeamUser], search: &str, role: RoleFilter) -> Vec<&'a TeamUser> {
    let needle = search.trim().to_lowercase();
    users
        .iter()
        .filter(|user| role.matches(user.role))
        .filter(|user| {
            needle.is_empty()
                || contains_ignore_case(&user.full_name, &needle)
                || contains_ignore_case(&user.email, &needle)
        })
        .collect()
}

/// Client-portal counterpart: also matches the client's name. `search` is
/// trimmed the same way.
pub fn filter_client_users<'a>(
    users: &'a [ClientPortalUser],
    search: &str,
    active_only: bool,
) -> Vec<&'a ClientPortalUser> {
    let needle = search.trim().to_lowercase();
    users
        .iter()
        .filter(|user| !active_only || user.is_active)
        .filter(|user| {
            needle.is_empty()
                || contains_ignore_case(&user.full_name, &needle)
                || contains_ignore_case(&user.email, &needle)
                || contains_ignore_case(&user.client_name, &needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::directory::{UserId, team_user};

    fn roster() -> Vec<TeamUser> {
        vec![
            team_user(1, "John Doe", "john@acme.io", Role::Admin, true),
            team_user(2, "Mary Jones", "mary@acme.io", Role::Recruiter, true),
            team_user(3, "Ann Lee", "ann.jo@acme.io", Role::Admin, false),
            team_user(4, "Joanna Smith", "js@acme.io", Role::Finance, true),
            team_user(5, "Bo Park", "bo@acme.io", Role::Admin, true),
        ]
    }

    fn ids(users: &[&TeamUser]) -> Vec<u64> {
        users.iter().map(|u| u.id.0).collect()
    }

    #[test]
    fn empty_search_and_all_roles_is_identity() {
        let users = roster();
        let visible = filter_users(&users, "", RoleFilter::All);
        assert_eq!(ids(&visible), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn search_and_role_are_conjunctive() {
        let users = roster();
        let visible = filter_users(&users, "jo", RoleFilter::Only(Role::Admin));

        // Mary Jones and Joanna Smith match "jo" but are not admins.
        assert_eq!(ids(&visible), [1, 3]);
        for user in visible {
            assert_eq!(user.role, Role::Admin);
            let haystack = format!("{} {}", user.full_name, user.email).to_lowercase();
            assert!(haystack.contains("jo"));
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let users = roster();
        assert_eq!(ids(&filter_users(&users, "JOANNA", RoleFilter::All)), [4]);
        assert_eq!(ids(&filter_users(&users, "ACME.IO", RoleFilter::All)).len(), 5);
    }

    #[test]
    fn surrounding_whitespace_in_search_is_ignored() {
        let users = roster();
        assert_eq!(
            ids(&filter_users(&users, "  jo\t", RoleFilter::All)),
            ids(&filter_users(&users, "jo", RoleFilter::All))
        );
        assert_eq!(ids(&filter_users(&users, "   ", RoleFilter::All)), [1, 2, 3, 4, 5]);
        assert_eq!(ids(&filter_users(&users, " n d ", RoleFilter::All)), [1]);
    }

    #[test]
    fn role_filter_parses_all_and_roles() {
        assert_eq!("all".parse::<RoleFilter>(), Ok(RoleFilter::All));
        assert_eq!(
            "bd_sales".parse::<RoleFilter>(),
            Ok(RoleFilter::Only(Role::BdSales))
        );
        assert!("client".parse::<RoleFilter>().is_err());
        assert_eq!(RoleFilter::Only(Role::Finance).to_string(), "finance");
    }

    #[test]
    fn client_filter_matches_company_and_activity() {
        let users = vec![
            ClientPortalUser {
                id: UserId(10),
                client_id: Some(1),
                client_name: "Globex".to_owned(),
                email: "hank@globex.com".to_owned(),
                full_name: "Hank Scorpio".to_owned(),
                is_active: true,
                created_at: None,
            },
            ClientPortalUser {
                id: UserId(11),
                client_id: None,
                client_name: "Unknown".to_owned(),
                email: "old@initech.com".to_owned(),
                full_name: "Bill Lumbergh".to_owned(),
                is_active: false,
                created_at: None,
            },
        ];

        let by_company = filter_client_users(&users, "globex", false);
        assert_eq!(by_company.len(), 1);
        assert_eq!(by_company[0].id, UserId(10));

        assert_eq!(filter_client_users(&users, "", true).len(), 1);
        assert_eq!(filter_client_users(&users, "", false).len(), 2);
    }

    /// Linear scan: ten thousand accounts is still well inside a keystroke
    /// budget, but nothing here gets faster as the directory grows.
    #[test]
    fn full_scan_over_large_population() {
        let users: Vec<TeamUser> = (0..10_000)
            .map(|i| {
                let role = Role::ALL[i % Role::ALL.len()];
                team_user(
                    i as u64,
                    &format!("User {i}"),
                    &format!("user{i}@acme.io"),
                    role,
                    i % 3 != 0,
                )
            })
            .collect();

        let started = Instant::now();
        let visible = filter_users(&users, "user 99", RoleFilter::All);
        let elapsed = started.elapsed();

        // "User 99", "User 990".."User 999", "User 9900".."User 9999"
        assert_eq!(visible.len(), 111);
        assert!(
            elapsed < Duration::from_secs(1),
            "filtering 10k users took {elapsed:?}"
        );
    }
}
