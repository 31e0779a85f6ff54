//! Mutation orchestrator.
//!
//! Every action follows the same pessimistic sequence:
//!
//! 1. validate locally (create/update), or ask the confirmation gate
//!    (delete, password reset, disabling);
//! 2. call the directory;
//! 3. on confirmed success only, invalidate the action's dependency set and
//!    notify; on failure, notify and leave every cached view untouched.
//!    A 2xx whose body cannot be read still counts as confirmed for
//!    invalidation, then surfaces as an error.
//!
//! Nothing is written to the cache speculatively. Multiple mutations on the
//! same account are not serialized here; the directory decides, and the
//! cache slots only ever apply the newest confirmed refetch.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};
use staffdesk_states::{TaskHandle, TaskId};
use tokio_util::sync::CancellationToken;

use crate::config::InFlightPolicy;
use crate::confirm::{
    ConfirmationGate, ConfirmationRequest, Confirmer, Decision, DestructiveAction,
};
use crate::directory::{
    ClientPortalUser, Confirmation, CreateClientUserRequest, CreateUserRequest, DirectoryUser,
    TeamUser, ToggleOutcome, UserId, UserPatch,
};
use crate::error::{DirectoryError, MutationError};
use crate::notify::Notifier;
use crate::users::api::DirectoryClient;
use crate::users::cache::{CacheCoordinator, Mutation};
use crate::users::validate::{validate_client_create, validate_create, validate_patch};

const NAVIGATION_SCOPE: &str = "users-view";

pub struct MutationOrchestrator {
    api: DirectoryClient,
    cache: CacheCoordinator,
    notifier: Notifier,
    confirmer: Arc<dyn Confirmer>,
    policy: InFlightPolicy,
    navigation: Mutex<TaskHandle>,
}

impl std::fmt::Debug for MutationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationOrchestrator")
            .field("policy", &self.policy)
            .field("navigation", &self.current_view().id())
            .finish_non_exhaustive()
    }
}

impl MutationOrchestrator {
    pub fn new(
        api: DirectoryClient,
        cache: CacheCoordinator,
        notifier: Notifier,
        confirmer: Arc<dyn Confirmer>,
        policy: InFlightPolicy,
    ) -> Self {
        let navigation = TaskHandle::new(TaskId::new(NAVIGATION_SCOPE, 0), CancellationToken::new());
        Self {
            api,
            cache,
            notifier,
            confirmer,
            policy,
            navigation: Mutex::new(navigation),
        }
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    /// The operator left the view. Under [`InFlightPolicy::CancelOnNavigation`]
    /// every mutation still waiting on the directory is abandoned; under
    /// [`InFlightPolicy::LetComplete`] this only starts a new view generation.
    pub fn navigate_away(&self) {
        let mut current = self.navigation.lock().unwrap_or_else(PoisonError::into_inner);
        if self.policy == InFlightPolicy::CancelOnNavigation {
            current.cancel();
        }
        *current = TaskHandle::new(current.id().next(), CancellationToken::new());
    }

    fn current_view(&self) -> TaskHandle {
        self.navigation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Asks the operator through a fresh gate.
    pub async fn confirm(
        &self,
        action: DestructiveAction,
        subject: impl Into<DirectoryUser>,
    ) -> Result<(), MutationError> {
        let request = ConfirmationRequest::new(action, subject);
        let (gate, decider) = ConfirmationGate::open(request.clone());
        self.confirmer.present(&request, decider);

        match gate.decision().await {
            Decision::Proceed => Ok(()),
            Decision::Abort => {
                info!(
                    "{action:?} on {} aborted at confirmation",
                    request.subject.id()
                );
                Err(MutationError::Aborted)
            }
        }
    }

    /// Runs `call` and applies its outcome: invalidation and a success
    /// notification after confirmation, an error notification otherwise.
    async fn execute<T, Fut>(
        &self,
        mutation: Mutation,
        call: Fut,
        success_message: impl FnOnce(&T) -> String,
    ) -> Result<T, MutationError>
    where
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        let view = self.current_view();
        let result = match self.policy {
            InFlightPolicy::LetComplete => call.await,
            InFlightPolicy::CancelOnNavigation => match view.run(call).await {
                Ok(result) => result,
                Err(cancelled) => {
                    info!("{} abandoned: {cancelled}", mutation.label());
                    return Err(MutationError::Cancelled);
                }
            },
        };

        match result {
            Ok(value) => {
                self.cache.invalidate_for(mutation);
                self.notifier.success(mutation, success_message(&value));
                Ok(value)
            }
            Err(err) => {
                if err.is_confirmed() {
                    self.cache.invalidate_for(mutation);
                }
                let err = MutationError::from(err);
                let message = err.operator_message(mutation);
                warn!("{} failed: {err} ({message})", mutation.label());
                self.notifier.error(mutation, message);
                Err(err)
            }
        }
    }

    fn reject(&self, mutation: Mutation, err: MutationError) -> MutationError {
        warn!("{} rejected before sending: {err}", mutation.label());
        err
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<TeamUser, MutationError> {
        let mutation = Mutation::CreateUser;
        validate_create(&request).map_err(|e| self.reject(mutation, e.into()))?;

        self.execute(mutation, self.api.create_user(&request), |_| {
            mutation.success_message().to_owned()
        })
        .await
    }

    pub async fn update_user(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<TeamUser, MutationError> {
        let mutation = Mutation::UpdateUser;
        validate_patch(&patch).map_err(|e| self.reject(mutation, e.into()))?;

        self.execute(mutation, self.api.update_user(id, &patch), |_| {
            mutation.success_message().to_owned()
        })
        .await
    }

    /// Flips `is_active`. Disabling an active account is confirmed first;
    /// enabling is not.
    pub async fn toggle_user(&self, user: &TeamUser) -> Result<ToggleOutcome, MutationError> {
        if user.is_active {
            self.confirm(DestructiveAction::Disable, user.clone())
                .await?;
        }

        self.execute(Mutation::ToggleUser, self.api.toggle_user(user.id), |outcome| {
            status_message("User", outcome)
        })
        .await
    }

    pub async fn reset_password(&self, user: &TeamUser) -> Result<Confirmation, MutationError> {
        self.confirm(DestructiveAction::ResetPassword, user.clone())
            .await?;

        self.execute(
            Mutation::ResetPassword,
            self.api.reset_password(user.id),
            |_| Mutation::ResetPassword.success_message().to_owned(),
        )
        .await
    }

    pub async fn delete_user(&self, user: &TeamUser) -> Result<Confirmation, MutationError> {
        self.confirm(DestructiveAction::Delete, user.clone()).await?;

        self.execute(Mutation::DeleteUser, self.api.delete_user(user.id), |_| {
            Mutation::DeleteUser.success_message().to_owned()
        })
        .await
    }

    pub async fn create_client_user(
        &self,
        request: CreateClientUserRequest,
    ) -> Result<ClientPortalUser, MutationError> {
        let mutation = Mutation::CreateClientUser;
        validate_client_create(&request).map_err(|e| self.reject(mutation, e.into()))?;

        self.execute(mutation, self.api.create_client_user(&request), |_| {
            mutation.success_message().to_owned()
        })
        .await
    }

    pub async fn toggle_client_user(
        &self,
        user: &ClientPortalUser,
    ) -> Result<ToggleOutcome, MutationError> {
        if user.is_active {
            self.confirm(DestructiveAction::Disable, user.clone())
                .await?;
        }

        self.execute(
            Mutation::ToggleClientUser,
            self.api.toggle_client_user(user.id),
            |outcome| status_message("Client user", outcome),
        )
        .await
    }
}

fn status_message(subject: &str, outcome: &ToggleOutcome) -> String {
    if outcome.is_active {
        format!("{subject} enabled")
    } else {
        format!("{subject} disabled")
    }
}
