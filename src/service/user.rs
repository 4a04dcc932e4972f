use crate::{
    model::User,
    repository::UserRepository,
    serializer::{LoginData, ValidationError},
};
use anyhow::{Error, Result};
use argon2::Config;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] Error),
}

const USERNAME_TAKEN: &str = "A user with that username already exists.";

pub fn register(data: &LoginData, repo: &UserRepository) -> Result<User, ValidationError> {
    if repo.select_by_username(&data.username)?.is_some() {
        return Err(ValidationError::single("username", USERNAME_TAKEN));
    }

    let salt: [u8; 16] = rand::thread_rng().gen();
    let password_hash = argon2::hash_encoded(data.password.as_bytes(), &salt, &Config::default())
        .map_err(Error::new)?;
    store(&data.username, &password_hash, repo)
}

/// The username may have been taken since the check in `register`, the
/// unique constraint has the final say.
fn store(
    username: &str,
    password_hash: &str,
    repo: &UserRepository,
) -> Result<User, ValidationError> {
    match repo.insert(username, password_hash)? {
        Some(user) => {
            info!(id = user.id, username = %user.username, "Registered user");
            Ok(user)
        }
        None => {
            warn!(%username, "Username was taken during registration");
            Err(ValidationError::single("username", USERNAME_TAKEN))
        }
    }
}

/// Checks the credentials against the stored hash. An unknown username and
/// a wrong password fail the same way.
pub fn authenticate(data: &LoginData, repo: &UserRepository) -> Result<User, AuthError> {
    let user = match repo.select_by_username(&data.username)? {
        Some(user) => user,
        None => {
            warn!(username = %data.username, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let matches = argon2::verify_encoded(&user.password_hash, data.password.as_bytes())
        .map_err(Error::new)?;

    if !matches {
        warn!(username = %data.username, "Login attempt with invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}
