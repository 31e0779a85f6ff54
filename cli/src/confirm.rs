//! Confirmation prompts on the terminal.

use inquire::Confirm;
use staffdesk_business::{ConfirmationRequest, Confirmer, Decider};
use tracing::warn;

/// Asks on the terminal. The question defaults to "no", and an interrupted
/// prompt aborts.
#[derive(Debug, Clone, Copy)]
pub struct InquireConfirmer;

impl Confirmer for InquireConfirmer {
    fn present(&self, request: &ConfirmationRequest, decider: Decider) {
        let question = request.prompt();
        // inquire blocks on stdin; keep it off the async workers.
        drop(tokio::task::spawn_blocking(move || {
            match Confirm::new(&question).with_default(false).prompt() {
                Ok(true) => decider.proceed(),
                Ok(false) => decider.abort(),
                Err(err) => {
                    warn!("confirmation prompt failed: {err}");
                    decider.abort();
                }
            }
        }));
    }
}
