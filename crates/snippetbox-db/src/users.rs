use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};
use rusqlite::Connection;
use tracing::debug;

use crate::{Database, DbError, NOW, OptionalExt, Result};

/// Hash verified when the email is unknown, so a miss costs the same as a
/// wrong password.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("snippetbox-timing-equalizer").expect("dummy password should hash")
});

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create an account. The password is hashed with Argon2id before it
    /// reaches the table. A second account with the same email fails with
    /// [`DbError::DuplicateEmail`].
    pub fn insert_user(&self, name: &str, email: &str, password: &str) -> Result<i64> {
        let hashed_password = hash_password(password)?;

        self.with_conn(|conn| {
            let inserted = conn.execute(
                &format!(
                    "INSERT INTO users (name, email, hashed_password, created)
                     VALUES (?1, ?2, ?3, {NOW})"
                ),
                (name, email, &hashed_password),
            );

            match inserted {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(e) if is_duplicate_email(&e) => Err(DbError::DuplicateEmail),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Check an email/password pair and return the user id.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        let row = self.with_conn(|conn| query_credentials(conn, email))?;

        match row {
            Some((id, hashed_password)) => {
                if verify_password(password, &hashed_password)? {
                    Ok(id)
                } else {
                    Err(DbError::InvalidCredentials)
                }
            }
            None => {
                debug!("authentication attempt for unknown email");
                verify_password(password, &DUMMY_HASH)?;
                Err(DbError::InvalidCredentials)
            }
        }
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }
}

fn query_credentials(conn: &Connection, email: &str) -> Result<Option<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT id, hashed_password FROM users WHERE email = ?1")?;

    stmt.query_row([email], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()
}

fn is_duplicate_email(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg.contains("users.email")
        }
        _ => false,
    }
}
