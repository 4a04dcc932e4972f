use crate::{
    model::{ApiError, ApiResponse, ApiResult},
    repository::{AnnotationRepository, TextRepository},
    serializer::{TextSerializer, TextView},
    service::text,
};
use rocket::{delete, get, http::Status, patch, post, put, serde::json::Json, State};
use serde_json::Value;

#[get("/texts")]
pub async fn list(repo: &State<TextRepository>) -> ApiResult<Vec<TextView>> {
    let texts = text::list(repo)?;
    ApiResponse::ok(texts.iter().map(TextSerializer::serialize).collect())
}

#[post("/texts", data = "<input>")]
pub async fn post(
    input: Json<Value>,
    repo: &State<TextRepository>,
    annotation_repo: &State<AnnotationRepository>,
) -> ApiResult<TextView> {
    let data = TextSerializer::validate(&input, annotation_repo.inner())?;
    let text = text::create(data, repo)?;
    ApiResponse::created(TextSerializer::serialize(&text))
}

#[get("/texts/<id>")]
pub async fn get(id: i64, repo: &State<TextRepository>) -> ApiResult<TextView> {
    match text::get(id, repo)? {
        Some(text) => ApiResponse::ok(TextSerializer::serialize(&text)),
        None => Err(ApiError::not_found()),
    }
}

#[put("/texts/<id>", data = "<input>")]
pub async fn put(
    id: i64,
    input: Json<Value>,
    repo: &State<TextRepository>,
    annotation_repo: &State<AnnotationRepository>,
) -> ApiResult<TextView> {
    if text::get(id, repo)?.is_none() {
        return Err(ApiError::not_found());
    }

    let data = TextSerializer::validate(&input, annotation_repo.inner())?;

    match text::update(id, data.into(), repo)? {
        Some(text) => ApiResponse::ok(TextSerializer::serialize(&text)),
        None => Err(ApiError::not_found()),
    }
}

#[patch("/texts/<id>", data = "<input>")]
pub async fn patch(
    id: i64,
    input: Json<Value>,
    repo: &State<TextRepository>,
    annotation_repo: &State<AnnotationRepository>,
) -> ApiResult<TextView> {
    if text::get(id, repo)?.is_none() {
        return Err(ApiError::not_found());
    }

    let patch = TextSerializer::validate_partial(&input, annotation_repo.inner())?;

    match text::update(id, patch, repo)? {
        Some(text) => ApiResponse::ok(TextSerializer::serialize(&text)),
        None => Err(ApiError::not_found()),
    }
}

#[delete("/texts/<id>")]
pub async fn delete(id: i64, repo: &State<TextRepository>) -> Result<Status, ApiError> {
    if text::delete(id, repo)? {
        Ok(Status::NoContent)
    } else {
        Err(ApiError::not_found())
    }
}
