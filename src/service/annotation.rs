use crate::{
    model::Annotation,
    repository::AnnotationRepository,
    serializer::{AnnotationData, AnnotationPatch},
};
use anyhow::Result;
use chrono::Utc;
use tracing::info;

pub fn list(text_id: Option<i64>, repo: &AnnotationRepository) -> Result<Vec<Annotation>> {
    repo.select_all(text_id)
}

pub fn get(id: i64, repo: &AnnotationRepository) -> Result<Option<Annotation>> {
    repo.select_by_id(id)
}

/// Stores a new annotation, stamping `created_at` with the current time.
pub fn create(data: &AnnotationData, repo: &AnnotationRepository) -> Result<Annotation> {
    let annotation = repo.insert(data, Utc::now())?;
    info!(id = annotation.id, text = annotation.text_id, "Created annotation");
    Ok(annotation)
}

pub fn update(
    id: i64,
    patch: AnnotationPatch,
    repo: &AnnotationRepository,
) -> Result<Option<Annotation>> {
    let mut annotation = match repo.select_by_id(id)? {
        Some(annotation) => annotation,
        None => return Ok(None),
    };

    patch.apply(&mut annotation);

    if !repo.update(&annotation)? {
        return Ok(None);
    }

    Ok(Some(annotation))
}

pub fn delete(id: i64, repo: &AnnotationRepository) -> Result<bool> {
    let deleted = repo.delete(id)?;
    if deleted {
        info!(id, "Deleted annotation");
    }
    Ok(deleted)
}
