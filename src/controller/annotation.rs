use crate::{
    model::{ApiError, ApiResponse, ApiResult},
    repository::{AnnotationRepository, TextRepository},
    serializer::{AnnotationSerializer, AnnotationView},
    service::annotation,
};
use rocket::{delete, get, http::Status, patch, post, put, serde::json::Json, State};
use serde_json::Value;

#[get("/annotations?<text>")]
pub async fn list(
    text: Option<i64>,
    repo: &State<AnnotationRepository>,
) -> ApiResult<Vec<AnnotationView>> {
    let annotations = annotation::list(text, repo)?;
    ApiResponse::ok(
        annotations
            .iter()
            .map(AnnotationSerializer::serialize)
            .collect(),
    )
}

#[post("/annotations", data = "<input>")]
pub async fn post(
    input: Json<Value>,
    repo: &State<AnnotationRepository>,
    text_repo: &State<TextRepository>,
) -> ApiResult<AnnotationView> {
    let data = AnnotationSerializer::validate(&input, text_repo.inner())?;
    let annotation = annotation::create(&data, repo)?;
    ApiResponse::created(AnnotationSerializer::serialize(&annotation))
}

#[get("/annotations/<id>")]
pub async fn get(id: i64, repo: &State<AnnotationRepository>) -> ApiResult<AnnotationView> {
    match annotation::get(id, repo)? {
        Some(annotation) => ApiResponse::ok(AnnotationSerializer::serialize(&annotation)),
        None => Err(ApiError::not_found()),
    }
}

#[put("/annotations/<id>", data = "<input>")]
pub async fn put(
    id: i64,
    input: Json<Value>,
    repo: &State<AnnotationRepository>,
    text_repo: &State<TextRepository>,
) -> ApiResult<AnnotationView> {
    if annotation::get(id, repo)?.is_none() {
        return Err(ApiError::not_found());
    }

    let data = AnnotationSerializer::validate(&input, text_repo.inner())?;

    match annotation::update(id, data.into(), repo)? {
        Some(annotation) => ApiResponse::ok(AnnotationSerializer::serialize(&annotation)),
        None => Err(ApiError::not_found()),
    }
}

#[patch("/annotations/<id>", data = "<input>")]
pub async fn patch(
    id: i64,
    input: Json<Value>,
    repo: &State<AnnotationRepository>,
    text_repo: &State<TextRepository>,
) -> ApiResult<AnnotationView> {
    if annotation::get(id, repo)?.is_none() {
        return Err(ApiError::not_found());
    }

    let patch = AnnotationSerializer::validate_partial(&input, text_repo.inner())?;

    match annotation::update(id, patch, repo)? {
        Some(annotation) => ApiResponse::ok(AnnotationSerializer::serialize(&annotation)),
        None => Err(ApiError::not_found()),
    }
}

#[delete("/annotations/<id>")]
pub async fn delete(id: i64, repo: &State<AnnotationRepository>) -> Result<Status, ApiError> {
    if annotation::delete(id, repo)? {
        Ok(Status::NoContent)
    } else {
        Err(ApiError::not_found())
    }
}
