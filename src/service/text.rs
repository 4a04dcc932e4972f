use crate::{
    model::Text,
    repository::TextRepository,
    serializer::{TextData, TextPatch},
};
use anyhow::Result;
use tracing::info;

pub fn list(repo: &TextRepository) -> Result<Vec<Text>> {
    repo.select_all()
}

pub fn get(id: i64, repo: &TextRepository) -> Result<Option<Text>> {
    repo.select_by_id(id)
}

pub fn create(data: TextData, repo: &TextRepository) -> Result<Text> {
    let annotations = data.annotations.unwrap_or_default();
    let text = repo.insert(&data.content, &annotations)?;
    info!(id = text.id, len = text.content.len(), "Created text");
    Ok(text)
}

/// Full updates arrive here too, converted into a patch with every
/// writable field set.
pub fn update(id: i64, patch: TextPatch, repo: &TextRepository) -> Result<Option<Text>> {
    repo.update(id, patch.content.as_deref(), patch.annotations.as_deref())
}

pub fn delete(id: i64, repo: &TextRepository) -> Result<bool> {
    let deleted = repo.delete(id)?;
    if deleted {
        info!(id, "Deleted text");
    }
    Ok(deleted)
}
