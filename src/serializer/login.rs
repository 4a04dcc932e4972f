use super::{Fields, ValidationError, NON_FIELD_ERRORS};
use serde_json::Value;
use std::fmt;

/// Credentials as submitted by the client. Checking them is up to
/// `service::user::authenticate`.
pub struct LoginData {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub struct LoginSerializer;

impl LoginSerializer {
    pub fn validate(data: &Value) -> Result<LoginData, ValidationError> {
        let mut fields = Fields::new(data, false)?;
        let username = fields.string("username");
        let password = fields.string("password");
        fields.finish()?;

        match (username, password) {
            (Some(username), Some(password)) => Ok(LoginData { username, password }),
            _ => Err(ValidationError::single(NON_FIELD_ERRORS, "Incomplete data.")),
        }
    }
}

pub struct RefreshSerializer;

impl RefreshSerializer {
    /// Returns the raw refresh token.
    pub fn validate(data: &Value) -> Result<String, ValidationError> {
        let mut fields = Fields::new(data, false)?;
        let refresh = fields.string("refresh");
        fields.finish()?;
        refresh.ok_or_else(|| ValidationError::single("refresh", super::REQUIRED))
    }
}
