use thiserror::Error;

/// Typed data-access failures. Each variant carries enough context for the
/// API layer to build its response detail message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("post with id: {0} was not found")]
    PostNotFound(i64),

    #[error("vote does not exist")]
    VoteNotFound,

    #[error("user {user_id} has already voted on post {post_id}")]
    DuplicateVote { post_id: i64, user_id: i64 },

    /// Caller is not the owner of the post it tried to mutate.
    #[error("not the owner of the post")]
    NotOwner,

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// True when the underlying SQLite error is a constraint violation,
    /// used to translate unique-index failures into domain errors.
    pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
