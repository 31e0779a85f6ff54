//! Yes/no checkpoint in front of destructive mutations.
//!
//! Each invocation opens a fresh [`ConfirmationGate`]. The gate waits in
//! `awaiting-decision` until its [`Decider`] resolves it to proceed or abort;
//! both outcomes are final. A decider dropped without answering counts as an
//! abort, so a closed prompt never lets a deletion through.

use log::debug;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::directory::DirectoryUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructiveAction {
    Delete,
    ResetPassword,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub action: DestructiveAction,
    pub subject: DirectoryUser,
}

impl ConfirmationRequest {
    pub fn new(action: DestructiveAction, subject: impl Into<DirectoryUser>) -> Self {
        Self {
            action,
            subject: subject.into(),
        }
    }

    /// The question put to the operator, naming the affected account.
    pub fn prompt(&self) -> String {
        let name = self.subject.display_name();
        match self.action {
            DestructiveAction::Delete => {
                format!("Delete {name}? This cannot be undone.")
            }
            DestructiveAction::ResetPassword => format!(
                "Reset the password for {name}? A new password will be emailed to {}.",
                self.subject.email()
            ),
            DestructiveAction::Disable => {
                format!("Disable {name}? The account will no longer be able to sign in.")
            }
        }
    }
}

#[derive(Debug)]
pub struct ConfirmationGate {
    request: ConfirmationRequest,
    rx: oneshot::Receiver<Decision>,
}

/// The answering half of a gate. Consumed by the answer.
#[derive(Debug)]
pub struct Decider {
    tx: oneshot::Sender<Decision>,
}

impl ConfirmationGate {
    pub fn open(request: ConfirmationRequest) -> (Self, Decider) {
        let (tx, rx) = oneshot::channel();
        (Self { request, rx }, Decider { tx })
    }

    pub fn request(&self) -> &ConfirmationRequest {
        &self.request
    }

    /// Non-blocking peek. `None` while still awaiting a decision.
    pub fn try_decision(&mut self) -> Option<Decision> {
        match self.rx.try_recv() {
            Ok(decision) => Some(decision),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Decision::Abort),
        }
    }

    pub async fn decision(self) -> Decision {
        let decision = self.rx.await.unwrap_or(Decision::Abort);
        debug!(
            "confirmation for {:?} on {} resolved to {decision:?}",
            self.request.action,
            self.request.subject.id()
        );
        decision
    }
}

impl Decider {
    pub fn decide(self, decision: Decision) {
        // The gate may already be gone; nothing left to tell.
        drop(self.tx.send(decision));
    }

    pub fn proceed(self) {
        self.decide(Decision::Proceed);
    }

    pub fn abort(self) {
        self.decide(Decision::Abort);
    }
}

/// Presents confirmation requests to the operator.
///
/// Implementations resolve the decider now or later, from any thread.
pub trait Confirmer: Send + Sync {
    fn present(&self, request: &ConfirmationRequest, decider: Decider);
}

/// Answers every request the same way. `--yes` on the command line.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Decision);

impl Confirmer for AutoConfirm {
    fn present(&self, _request: &ConfirmationRequest, decider: Decider) {
        decider.decide(self.0);
    }
}

/// Hands requests to an interactive surface over a channel.
#[derive(Debug, Clone)]
pub struct ConfirmationQueue {
    tx: flume::Sender<(ConfirmationRequest, Decider)>,
}

impl ConfirmationQueue {
    pub fn channel() -> (Self, flume::Receiver<(ConfirmationRequest, Decider)>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }
}

impl Confirmer for ConfirmationQueue {
    fn present(&self, request: &ConfirmationRequest, decider: Decider) {
        // If the surface is gone the decider is dropped with the message,
        // which aborts.
        drop(self.tx.send((request.clone(), decider)));
    }
}
