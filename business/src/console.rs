use std::sync::Arc;

use log::info;

use crate::auth::CredentialSource;
use crate::config::ConsoleConfig;
use crate::confirm::Confirmer;
use crate::error::DirectoryError;
use crate::notify::{Notification, Notifier};
use crate::users::{CacheCoordinator, DirectoryClient, MutationOrchestrator};

/// Everything one admin session needs, wired together once.
///
/// The cache is created here and handed to the orchestrator explicitly;
/// there is no global instance.
#[derive(Debug)]
pub struct Console {
    api: DirectoryClient,
    cache: CacheCoordinator,
    mutations: MutationOrchestrator,
}

impl Console {
    pub fn new(
        config: &ConsoleConfig,
        credentials: Arc<dyn CredentialSource>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Result<(Self, flume::Receiver<Notification>), DirectoryError> {
        info!(
            "Starting console against {} ({:?})",
            config.api_url(),
            config.in_flight_policy
        );

        let api = DirectoryClient::new(config, credentials)?;
        let cache = CacheCoordinator::new(api.clone());
        let (notifier, notifications) = Notifier::channel();
        let mutations = MutationOrchestrator::new(
            api.clone(),
            cache.clone(),
            notifier,
            confirmer,
            config.in_flight_policy,
        );

        Ok((
            Self {
                api,
                cache,
                mutations,
            },
            notifications,
        ))
    }

    pub fn api(&self) -> &DirectoryClient {
        &self.api
    }

    pub fn cache(&self) -> &CacheCoordinator {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationOrchestrator {
        &self.mutations
    }
}
