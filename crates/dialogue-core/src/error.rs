use thiserror::Error;

pub type DialogueResult<T> = Result<T, DialogueError>;

/// Everything that can go wrong inside a turn. None of these are fatal: each
/// is recovered locally and turned into something the caller hears.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    #[error("input unusable: {0:?}")]
    InputUnusable(String),

    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),
}
