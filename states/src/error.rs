use thiserror::Error;

use crate::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("task {id:?} was cancelled before it finished")]
    Cancelled { id: TaskId },
}

impl Error {
    pub fn cancelled(id: TaskId) -> Self {
        Self::Cancelled { id }
    }
}
