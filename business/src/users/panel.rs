//! State behind the team-users screen.
//!
//! Holds what the operator typed and which dialog is open. Rendering reads
//! from here and from the cache; nothing in this module talks to the network.

use crate::directory::{CreateUserRequest, Role, TeamUser, UserId, UserPatch};
use crate::error::ValidationError;
use crate::notify::{Notification, NotificationLevel};
use crate::users::cache::Mutation;
use crate::users::filter::{RoleFilter, filter_users};
use crate::users::validate::{validate_create, validate_patch};

/// Which dialog, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserAction {
    #[default]
    None,
    Create,
    Edit(UserId),
    ConfirmDelete(UserId),
    ConfirmReset(UserId),
    ConfirmDisable(UserId),
}

impl UserAction {
    pub fn target(self) -> Option<UserId> {
        match self {
            Self::None | Self::Create => None,
            Self::Edit(id)
            | Self::ConfirmDelete(id)
            | Self::ConfirmReset(id)
            | Self::ConfirmDisable(id) => Some(id),
        }
    }
}

/// Outcome of the last mutation started from the panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionStatus {
    #[default]
    Idle,
    InFlight(Mutation),
    Succeeded {
        mutation: Mutation,
        message: String,
    },
    Failed {
        mutation: Mutation,
        message: String,
    },
}

/// Inputs of the create/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub send_welcome_email: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            full_name: String::new(),
            role: Role::Recruiter,
            is_active: true,
            send_welcome_email: true,
        }
    }
}

impl UserForm {
    pub fn from_user(user: &TeamUser) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            is_active: user.is_active,
            send_welcome_email: false,
        }
    }

    pub fn to_create_request(&self) -> Result<CreateUserRequest, ValidationError> {
        let request = CreateUserRequest {
            email: self.email.trim().to_owned(),
            full_name: self.full_name.trim().to_owned(),
            role: self.role,
            send_welcome_email: self.send_welcome_email,
        };
        validate_create(&request)?;
        Ok(request)
    }

    /// Only the fields that differ from `original`.
    pub fn to_patch(&self, original: &TeamUser) -> Result<UserPatch, ValidationError> {
        let full_name = self.full_name.trim();
        let email = self.email.trim();
        let patch = UserPatch {
            full_name: (full_name != original.full_name).then(|| full_name.to_owned()),
            email: (email != original.email).then(|| email.to_owned()),
            role: (self.role != original.role).then_some(self.role),
            is_active: (self.is_active != original.is_active).then_some(self.is_active),
        };
        validate_patch(&patch)?;
        Ok(patch)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsersPanelState {
    pub search_text: String,
    pub role_filter: RoleFilter,
    pub action: UserAction,
    pub form: UserForm,
    pub status: ActionStatus,
}

impl UsersPanelState {
    pub fn visible_users<'a>(&self, users: &'a [TeamUser]) -> Vec<&'a TeamUser> {
        filter_users(users, &self.search_text, self.role_filter)
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_role_filter(&mut self, filter: RoleFilter) {
        self.role_filter = filter;
    }

    pub fn begin_create(&mut self) {
        self.form = UserForm::default();
        self.action = UserAction::Create;
    }

    pub fn begin_edit(&mut self, user: &TeamUser) {
        self.form = UserForm::from_user(user);
        self.action = UserAction::Edit(user.id);
    }

    pub fn request_delete(&mut self, id: UserId) {
        self.action = UserAction::ConfirmDelete(id);
    }

    pub fn request_reset(&mut self, id: UserId) {
        self.action = UserAction::ConfirmReset(id);
    }

    /// Disabling needs confirmation; enabling does not open a dialog.
    pub fn request_toggle(&mut self, user: &TeamUser) -> bool {
        if user.is_active {
            self.action = UserAction::ConfirmDisable(user.id);
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.action = UserAction::None;
    }

    pub fn mark_in_flight(&mut self, mutation: Mutation) {
        self.status = ActionStatus::InFlight(mutation);
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, ActionStatus::InFlight(_))
    }

    /// Folds a notification into the panel. A success closes the open
    /// dialog; a failure leaves it open so the operator can retry.
    pub fn apply(&mut self, notification: &Notification) {
        let Notification {
            level,
            mutation,
            message,
        } = notification;

        self.status = match level {
            NotificationLevel::Success => {
                self.close();
                ActionStatus::Succeeded {
                    mutation: *mutation,
                    message: message.clone(),
                }
            }
            NotificationLevel::Error => ActionStatus::Failed {
                mutation: *mutation,
                message: message.clone(),
            },
        };
    }
}
