use super::ApiError;
use rocket::{
    http::Status,
    request::Request,
    response::{self, Responder},
    serde::json::Json,
};
use serde::Serialize;

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn new(code: u16, body: T) -> ApiResponse<T> {
        ApiResponse {
            status: Status::new(code),
            body,
        }
    }

    pub fn ok(body: T) -> ApiResult<T> {
        Ok(ApiResponse::new(Status::Ok.code, body))
    }

    pub fn created(body: T) -> ApiResult<T> {
        Ok(ApiResponse::new(Status::Created.code, body))
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for ApiResponse<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.body)).respond_to(req)
    }
}
