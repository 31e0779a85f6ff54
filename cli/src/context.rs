//! Console construction from command-line flags and environment.

use std::io::IsTerminal as _;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use inquire::Password;
use staffdesk_business::{
    AutoConfirm, Confirmer, Console, ConsoleConfig, Decision, Mutation, MutationError,
    Notification, StaticToken,
};
use tracing::{instrument, warn};

use crate::cli::Cli;
use crate::confirm::InquireConfirmer;
use crate::output::Output;

/// A console plus somewhere to print what it reports.
pub struct Session {
    pub console: Console,
    pub out: Output,
    notifications: flume::Receiver<Notification>,
}

impl Session {
    #[instrument(skip_all, name = "session")]
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config =
            ConsoleConfig::from_env().context("Failed to read STAFFDESK_* configuration")?;
        if let Some(api_url) = &cli.api_url {
            config.api_base_url.clone_from(api_url);
        }

        let interactive = std::io::stdin().is_terminal();
        let token = resolve_token(cli.token.as_deref(), interactive)?;
        let confirmer = pick_confirmer(cli.yes, interactive);

        let (console, notifications) =
            Console::new(&config, Arc::new(StaticToken::new(token)), confirmer)
                .context("Failed to set up the directory client")?;

        Ok(Self {
            console,
            out: Output::new(),
            notifications,
        })
    }

    /// Prints every notification raised so far.
    pub fn report(&self) {
        for notification in self.notifications.try_iter() {
            self.out.notification(&notification);
        }
    }

    /// Reports the outcome of `mutation` and turns it into the command result.
    ///
    /// An operator abort is not an error; `Ok(None)` is returned.
    pub fn conclude<T>(
        &self,
        mutation: Mutation,
        result: Result<T, MutationError>,
    ) -> Result<Option<T>> {
        self.report();
        match result {
            Ok(value) => Ok(Some(value)),
            Err(MutationError::Aborted) => {
                self.out.warning(format!("{} aborted", mutation.label()));
                Ok(None)
            }
            Err(err) => {
                let message = err.operator_message(mutation);
                Err(err).context(message)
            }
        }
    }
}

fn resolve_token(flag: Option<&str>, interactive: bool) -> Result<String> {
    match flag.map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_owned()),
        _ if interactive => Password::new("Bearer token:")
            .without_confirmation()
            .prompt()
            .context("Failed to read token"),
        _ => bail!("No token given; pass --token or set STAFFDESK_TOKEN"),
    }
}

fn pick_confirmer(yes: bool, interactive: bool) -> Arc<dyn Confirmer> {
    if yes {
        Arc::new(AutoConfirm(Decision::Proceed))
    } else if interactive {
        Arc::new(InquireConfirmer)
    } else {
        warn!("stdin is not a terminal and --yes was not given; destructive actions will abort");
        Arc::new(AutoConfirm(Decision::Abort))
    }
}
