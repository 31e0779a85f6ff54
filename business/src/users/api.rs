//! Directory API client.
//!
//! One async method per directory operation. This layer builds requests,
//! attaches the bearer credential and decodes responses; it never caches and
//! never retries.
//!
//! Team endpoints live under `/admin/team/*`, client-portal endpoints under
//! `/client-portal/admin/*`, both relative to [`ConsoleConfig::api_url`].

use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use ustr::Ustr;

use crate::auth::CredentialSource;
use crate::config::ConsoleConfig;
use crate::directory::{
    ClientPortalUser, Confirmation, CreateClientUserRequest, CreateUserRequest, TeamStats,
    TeamUser, ToggleOutcome, UserId, UserPatch,
};
use crate::error::DirectoryError;
use crate::http::{Request, Response};

pub type ApiResult<T> = Result<T, DirectoryError>;

/// Handle to the directory's admin API.
///
/// Cheap to clone: the connection pool and credential source are shared.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    api_url: Ustr,
    credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl DirectoryClient {
    /// Builds the HTTP client with the configured request timeout. No request
    /// is made here; a missing token only shows up on the first call.
    pub fn new(config: &ConsoleConfig, credentials: Arc<dyn CredentialSource>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DirectoryError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url(),
            credentials,
        })
    }

    /// Versioned API root every endpoint path is appended to, without a
    /// trailing slash.
    pub fn api_url(&self) -> Ustr {
        self.api_url
    }

    /// GET `/admin/team/stats`
    pub async fn get_stats(&self) -> ApiResult<TeamStats> {
        let request = Request::get(self.url("/admin/team/stats"));
        let response = self.execute(request).await?;
        decode(&response, "TeamStats")
    }

    /// GET `/admin/team/users`
    pub async fn list_users(&self) -> ApiResult<Vec<TeamUser>> {
        let request = Request::get(self.url("/admin/team/users"));
        let response = self.execute(request).await?;
        decode(&response, "TeamUser list")
    }

    /// GET `/admin/team/users/{id}`
    pub async fn get_user(&self, id: UserId) -> ApiResult<TeamUser> {
        let request = Request::get(self.url(&format!("/admin/team/users/{id}")));
        let response = self.execute(request).await?;
        decode(&response, "TeamUser")
    }

    /// POST `/admin/team/users`
    ///
    /// The directory generates the initial password and mails it when
    /// `send_welcome_email` is set.
    pub async fn create_user(&self, payload: &CreateUserRequest) -> ApiResult<TeamUser> {
        let request = with_json(Request::post(self.url("/admin/team/users")), payload)?;
        let response = self.execute(request).await?;
        decode(&response, "TeamUser")
    }

    /// PATCH `/admin/team/users/{id}`
    /// Body: any subset of `{full_name, email, role, is_active}`.
    pub async fn update_user(&self, id: UserId, patch: &UserPatch) -> ApiResult<TeamUser> {
        let request = with_json(
            Request::patch(self.url(&format!("/admin/team/users/{id}"))),
            patch,
        )?;
        let response = self.execute(request).await?;
        decode(&response, "TeamUser")
    }

    /// PATCH `/admin/team/users/{id}/toggle`
    pub async fn toggle_user(&self, id: UserId) -> ApiResult<ToggleOutcome> {
        let request = with_json(
            Request::patch(self.url(&format!("/admin/team/users/{id}/toggle"))),
            &serde_json::json!({}),
        )?;
        let response = self.execute(request).await?;
        toggled(&response)
    }

    /// POST `/admin/team/users/{id}/reset-password`
    pub async fn reset_password(&self, id: UserId) -> ApiResult<Confirmation> {
        let request = with_json(
            Request::post(self.url(&format!("/admin/team/users/{id}/reset-password"))),
            &serde_json::json!({}),
        )?;
        let response = self.execute(request).await?;
        acknowledged(&response)
    }

    /// DELETE `/admin/team/users/{id}`
    pub async fn delete_user(&self, id: UserId) -> ApiResult<Confirmation> {
        let request = Request::delete(self.url(&format!("/admin/team/users/{id}")));
        let response = self.execute(request).await?;
        acknowledged(&response)
    }

    /// GET `/client-portal/admin/users`
    pub async fn list_client_users(&self) -> ApiResult<Vec<ClientPortalUser>> {
        let request = Request::get(self.url("/client-portal/admin/users"));
        let response = self.execute(request).await?;
        decode(&response, "ClientPortalUser list")
    }

    /// POST `/client-portal/admin/users`
    ///
    /// Unlike team accounts, the initial password is chosen by the caller.
    pub async fn create_client_user(
        &self,
        payload: &CreateClientUserRequest,
    ) -> ApiResult<ClientPortalUser> {
        let request = with_json(Request::post(self.url("/client-portal/admin/users")), payload)?;
        let response = self.execute(request).await?;
        decode(&response, "ClientPortalUser")
    }

    /// PATCH `/client-portal/admin/users/{id}/toggle`
    pub async fn toggle_client_user(&self, id: UserId) -> ApiResult<ToggleOutcome> {
        let request = with_json(
            Request::patch(self.url(&format!("/client-portal/admin/users/{id}/toggle"))),
            &serde_json::json!({}),
        )?;
        let response = self.execute(request).await?;
        toggled(&response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Attaches credentials, sends, and turns non-2xx answers into
    /// [`DirectoryError::Request`]. Fails before touching the network when
    /// there is no token.
    async fn execute(&self, request: Request) -> ApiResult<Response> {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(DirectoryError::Unauthenticated)?;
        let request = request.bearer_auth(&token);

        debug!("{} {}", request.method().as_str(), request.url());
        let response = request
            .send(&self.http)
            .await
            .map_err(|e| DirectoryError::Transport(e.message))?;

        if !response.is_success() {
            let detail = response.detail();
            debug!(
                "directory answered {} ({})",
                response.status,
                detail.as_deref().unwrap_or("no detail")
            );
            return Err(DirectoryError::rejected(response.status, detail));
        }

        Ok(response)
    }
}

fn with_json<T: serde::Serialize>(request: Request, body: &T) -> ApiResult<Request> {
    request
        .json(body)
        .map_err(|e| DirectoryError::Encode(format!("Failed to serialize request: {e}")))
}

fn decode<T: DeserializeOwned>(response: &Response, what: &str) -> ApiResult<T> {
    response
        .json()
        .map_err(|e| DirectoryError::Decode(format!("Failed to parse {what}: {e}")))
}

/// A 2xx answer that still says `success: false` is a rejection. An empty
/// body (e.g. `204 No Content`) is a plain success.
fn acknowledged(response: &Response) -> ApiResult<Confirmation> {
    if response.is_empty() {
        return Ok(Confirmation {
            success: true,
            message: None,
        });
    }
    let confirmation: Confirmation = decode(response, "confirmation")?;
    if !confirmation.success {
        return Err(DirectoryError::rejected(
            response.status,
            confirmation.message,
        ));
    }
    Ok(confirmation)
}

fn toggled(response: &Response) -> ApiResult<ToggleOutcome> {
    let outcome: ToggleOutcome = decode(response, "toggle result")?;
    if !outcome.success {
        return Err(DirectoryError::rejected(response.status, outcome.message));
    }
    Ok(outcome)
}
