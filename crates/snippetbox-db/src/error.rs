/// Store error taxonomy. Callers branch on the variant, never on the message.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The snippet does not exist or has expired.
    #[error("no matching record found")]
    NoRecord,

    #[error("duplicate email")]
    DuplicateEmail,

    /// Unknown email or wrong password. The two are deliberately
    /// indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<argon2::password_hash::Error> for DbError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(e.to_string())
    }
}
