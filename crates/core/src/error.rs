//! Error taxonomy shared by the registries, routers and handlers.

use thiserror::Error;

use crate::kind::KindId;

/// Result type used for value construction (identifiers, names).
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by command executors and command routers.
pub type CommandOutcome<T> = Result<T, CommandError>;

/// Value-level error.
///
/// Raised when an identifier or name cannot be constructed from its raw input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty or blank input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Construction-time and lookup failures of a handler registry.
///
/// Everything except [`RegistryError::NotFound`] is a configuration mistake and is
/// surfaced once, when a registry or router is built. Nothing here is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The handler collection was empty.
    #[error("registration of '{what}' requires at least one entry")]
    EmptyRegistration { what: &'static str },

    /// A slot in the handler collection was unset.
    #[error("entry {index} of '{what}' is not set")]
    NullEntry { what: &'static str, index: usize },

    /// A handler declared no kind at all.
    #[error("entry {index} of '{what}' declares no kinds")]
    NoDeclaredKinds { what: &'static str, index: usize },

    /// Two command handlers declared the same kind.
    #[error("multiple handlers registered for kind '{kind}'")]
    DuplicateHandler { kind: KindId },

    /// Two member routers of a composite router cover the same kind.
    #[error("kind '{kind}' is covered by more than one router")]
    KindCollision { kind: KindId },

    /// No handler is registered for the kind.
    #[error("no handler registered for kind '{kind}'")]
    NotFound { kind: KindId },
}

/// Failure of a command dispatch.
///
/// The router itself only ever produces [`CommandError::Unroutable`]. All other
/// variants originate in executors and reach the caller unchanged.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No executor covers the command's kind.
    #[error("no executor found for command kind '{kind}'")]
    Unroutable { kind: KindId },

    /// The aggregate targeted by the command does not exist.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(String),

    /// The aggregate targeted by the command was deleted.
    #[error("aggregate deleted: {0}")]
    AggregateDeleted(String),

    /// The aggregate the command wants to create already exists.
    #[error("aggregate already exists: {0}")]
    AggregateAlreadyExists(String),

    /// Optimistic concurrency check failed.
    #[error("aggregate version conflict (expected: {expected}, actual: {actual})")]
    VersionConflict { expected: u64, actual: u64 },

    /// The requested aggregate version does not exist.
    #[error("aggregate version {0} not found")]
    VersionNotFound(u64),

    /// The command was rejected by the executor's business rules.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// Any other failure, carried with its original cause.
    #[error("command execution failed: {0}")]
    ExecutionFailed(#[source] anyhow::Error),
}

impl CommandError {
    pub fn unroutable(kind: KindId) -> Self {
        Self::Unroutable { kind }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Wrap an arbitrary failure raised while executing a command.
    pub fn failed(cause: impl Into<anyhow::Error>) -> Self {
        Self::ExecutionFailed(cause.into())
    }

    /// Stable, machine-readable code for result envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Unroutable { .. } => "UNROUTABLE_COMMAND",
            CommandError::AggregateNotFound(_) => "AGGREGATE_NOT_FOUND",
            CommandError::AggregateDeleted(_) => "AGGREGATE_DELETED",
            CommandError::AggregateAlreadyExists(_) => "AGGREGATE_ALREADY_EXISTS",
            CommandError::VersionConflict { .. } => "AGGREGATE_VERSION_CONFLICT",
            CommandError::VersionNotFound(_) => "AGGREGATE_VERSION_NOT_FOUND",
            CommandError::Rejected(_) => "COMMAND_REJECTED",
            CommandError::ExecutionFailed(_) => "COMMAND_EXECUTION_FAILED",
        }
    }
}

/// Failure raised by an event handler while updating its view.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler refused the event (e.g. it violates the view's expectations).
    #[error("event rejected by handler: {0}")]
    Rejected(String),

    /// The view's backing storage or another dependency failed.
    #[error("event handler failed: {0}")]
    Failed(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unroutable_names_the_kind() {
        let err = CommandError::unroutable(KindId::new("Cancel").unwrap());
        assert_eq!(err.to_string(), "no executor found for command kind 'Cancel'");
        assert_eq!(err.code(), "UNROUTABLE_COMMAND");
    }

    #[test]
    fn execution_failed_keeps_the_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = CommandError::failed(cause);

        let source = std::error::Error::source(&err).expect("cause is kept");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn registry_errors_render_their_context() {
        let err = RegistryError::NullEntry { what: "executors", index: 2 };
        assert_eq!(err.to_string(), "entry 2 of 'executors' is not set");

        let err = RegistryError::DuplicateHandler { kind: KindId::new("Open").unwrap() };
        assert_eq!(err.to_string(), "multiple handlers registered for kind 'Open'");
    }
}
