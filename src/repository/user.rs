use crate::{db::DbPool, model::User};
use anyhow::Result;
use rusqlite::{params, ErrorCode, OptionalExtension};

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> UserRepository {
        UserRepository { pool }
    }

    /// Returns `None` if the username is already taken.
    pub fn insert(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let query = "INSERT INTO user (username, password_hash) VALUES (?, ?)";

        match conn.execute(query, params![username, password_hash]) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Some(User {
            id: conn.last_insert_rowid(),
            username: username.into(),
            password_hash: password_hash.into(),
        }))
    }

    pub fn select_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .pool
            .get()?
            .query_row(
                "SELECT id, username, password_hash FROM user WHERE username = ?",
                params![username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }
}
