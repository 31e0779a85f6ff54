//! Task identity and cooperative cancellation.
//!
//! - `TaskId`: a scope name plus a generation counter
//! - `TaskHandle`: a `TaskId` paired with the `CancellationToken` that governs it
//!
//! A scope (for example "users-panel") gets a new generation every time it is
//! re-entered, so work belonging to an older generation can be told apart
//! from current work and cancelled as a group.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::Error;

/// Unique identifier for a spawned unit of work.
///
/// Higher generations are more recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    scope: &'static str,
    generation: u64,
}

impl TaskId {
    pub fn new(scope: &'static str, generation: u64) -> Self {
        Self { scope, generation }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The id for the next generation of the same scope.
    pub fn next(&self) -> Self {
        Self {
            scope: self.scope,
            generation: self.generation + 1,
        }
    }
}

/// Handle to a scope of async work with cooperative cancellation support.
///
/// Cloned handles share one token: cancelling any clone cancels them all.
///
/// ```ignore
/// let handle = TaskHandle::new(TaskId::new("users-panel", 1), CancellationToken::new());
/// let result = handle.run(async { 42 }).await;
/// assert_eq!(result, Ok(42));
/// ```
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Requests cancellation. Work already past its last await point is not
    /// interrupted.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Drives `fut` until it completes or the handle is cancelled, whichever
    /// comes first. A cancelled future is dropped.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Error> {
        self.cancel_token
            .run_until_cancelled(fut)
            .await
            .ok_or(Error::cancelled(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_new_and_accessors() {
        let task_id = TaskId::new("users-panel", 42);

        assert_eq!(task_id.scope(), "users-panel");
        assert_eq!(task_id.generation(), 42);
    }

    #[test]
    fn task_id_next_bumps_generation_only() {
        let id = TaskId::new("users-panel", 1);
        let next = id.next();

        assert_eq!(next.scope(), id.scope());
        assert_eq!(next.generation(), 2);
        assert_ne!(id, next);
    }

    #[test]
    fn task_id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(TaskId::new("a", 1));
        set.insert(TaskId::new("a", 2));
        set.insert(TaskId::new("a", 1));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn task_handle_clone_shares_token() {
        let handle1 = TaskHandle::new(TaskId::new("a", 1), CancellationToken::new());
        let handle2 = handle1.clone();
        let token = handle2.cancellation_token();

        assert!(!handle2.is_cancelled());
        handle1.cancel();

        assert!(handle2.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn run_returns_output_when_not_cancelled() {
        let handle = TaskHandle::new(TaskId::new("a", 1), CancellationToken::new());

        assert_eq!(handle.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn run_reports_cancellation() {
        let id = TaskId::new("a", 3);
        let handle = TaskHandle::new(id, CancellationToken::new());
        handle.cancel();

        let result = handle.run(std::future::pending::<()>()).await;

        assert_eq!(result, Err(Error::cancelled(id)));
    }
}
