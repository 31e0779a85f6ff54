use thiserror::Error;

use crate::users::Mutation;

/// Failure of a single directory call.
///
/// `Clone` so a de-duplicated fetch can hand the same error to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The directory answered with a non-success status.
    #[error("directory rejected the request with status {status}")]
    Request { status: u16, detail: Option<String> },
    /// No response at all: connection refused, timeout, reset.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A 2xx answer whose body could not be read. The directory has already
    /// applied the change.
    #[error("unexpected response body: {0}")]
    Decode(String),
    /// The request body could not be serialized; nothing was sent.
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("no credential available for the directory")]
    Unauthenticated,
}

impl DirectoryError {
    pub fn rejected(status: u16, detail: Option<String>) -> Self {
        Self::Request { status, detail }
    }

    /// Server-supplied explanation, when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Request { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The directory accepted the call even though the result is unusable.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Pre-flight check failures. Nothing is sent when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("nothing to update")]
    EmptyPatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The operator declined the confirmation prompt.
    #[error("aborted by operator")]
    Aborted,
    /// Abandoned because the operator navigated away.
    #[error("cancelled by navigation")]
    Cancelled,
}

impl MutationError {
    /// Text shown to the operator: the directory's `detail` verbatim when it
    /// sent one, the per-action generic message otherwise.
    pub fn operator_message(&self, mutation: Mutation) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Directory(err) if err.is_confirmed() => format!(
                "{}, but the directory's reply could not be read",
                mutation.success_message()
            ),
            Self::Directory(err) => err
                .detail()
                .map_or_else(|| mutation.failure_message().to_owned(), str::to_owned),
            Self::Aborted => format!("{} aborted", mutation.label()),
            Self::Cancelled => format!("{} cancelled", mutation.label()),
        }
    }

    /// The directory answered and said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Directory(DirectoryError::Request { .. }))
    }
}
