use crate::{
    serializer::{FieldErrors, ValidationError},
    service::user::AuthError,
    token::TokenError,
};
use anyhow::Error;
use rocket::{
    http::{ContentType, Status},
    request::Request,
    response::{self, Responder, Response},
};
use serde::Serialize;
use std::io::Cursor;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing)]
    pub error: Option<Error>,
}

impl ApiError {
    pub fn new(code: u16, error: Error) -> ApiError {
        ApiError {
            code,
            message: reason(code),
            errors: None,
            error: Some(error),
        }
    }

    pub fn custom(code: u16, message: &str) -> ApiError {
        ApiError {
            code,
            message: message.to_string(),
            errors: None,
            error: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> ApiError {
        ApiError {
            code: Status::BadRequest.code,
            message: reason(Status::BadRequest.code),
            errors: Some(errors),
            error: None,
        }
    }

    pub fn not_found() -> ApiError {
        Status::NotFound.into()
    }
}

fn reason(code: u16) -> String {
    Status::from_code(code)
        .and_then(|it| it.reason())
        .unwrap_or("")
        .to_string()
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        if let Some(error) = &self.error {
            error!(code = self.code, %error, "Error from controller");
        }

        let body = serde_json::to_string(&self).map_err(|e| {
            error!(%e, "Failed to serialize error body");
            Status::InternalServerError
        })?;

        Response::build()
            .header(ContentType::JSON)
            .status(Status::new(self.code))
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl From<Status> for ApiError {
    fn from(s: Status) -> Self {
        ApiError {
            code: s.code,
            message: s.reason().unwrap_or("").to_string(),
            errors: None,
            error: None,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::new(Status::InternalServerError.code, e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Invalid(errors) => ApiError::invalid(errors),
            ValidationError::Internal(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                ApiError::custom(Status::Unauthorized.code, &e.to_string())
            }
            AuthError::Internal(e) => e.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid(_) | TokenError::WrongType => {
                ApiError::custom(Status::Unauthorized.code, &e.to_string())
            }
            _ => ApiError::new(Status::InternalServerError.code, e.into()),
        }
    }
}
