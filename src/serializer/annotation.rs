use super::{Fields, PkLookup, ValidationError, NON_FIELD_ERRORS};
use crate::model::Annotation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_index: i64,
    pub end_index: i64,
    pub text: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Annotation> for AnnotationView {
    fn from(annotation: &Annotation) -> AnnotationView {
        AnnotationView {
            id: annotation.id,
            title: annotation.title.clone(),
            description: annotation.description.clone(),
            start_index: annotation.start_index,
            end_index: annotation.end_index,
            text: annotation.text_id,
            created_at: annotation.created_at,
        }
    }
}

/// Writable fields of an annotation. Offsets are taken as given, they are
/// not checked against each other or against the text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationData {
    pub title: String,
    pub description: String,
    pub start_index: i64,
    pub end_index: i64,
    pub text: i64,
}

#[derive(Debug, Default, PartialEq)]
pub struct AnnotationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    pub text: Option<i64>,
}

impl AnnotationPatch {
    pub fn apply(self, annotation: &mut Annotation) {
        if let Some(title) = self.title {
            annotation.title = title;
        }
        if let Some(description) = self.description {
            annotation.description = description;
        }
        if let Some(start_index) = self.start_index {
            annotation.start_index = start_index;
        }
        if let Some(end_index) = self.end_index {
            annotation.end_index = end_index;
        }
        if let Some(text) = self.text {
            annotation.text_id = text;
        }
    }
}

impl From<AnnotationData> for AnnotationPatch {
    fn from(data: AnnotationData) -> AnnotationPatch {
        AnnotationPatch {
            title: Some(data.title),
            description: Some(data.description),
            start_index: Some(data.start_index),
            end_index: Some(data.end_index),
            text: Some(data.text),
        }
    }
}

pub struct AnnotationSerializer;

impl AnnotationSerializer {
    pub fn serialize(annotation: &Annotation) -> AnnotationView {
        annotation.into()
    }

    pub fn validate(
        data: &Value,
        texts: &dyn PkLookup,
    ) -> Result<AnnotationData, ValidationError> {
        match Self::read(data, false, texts)? {
            AnnotationPatch {
                title: Some(title),
                description: Some(description),
                start_index: Some(start_index),
                end_index: Some(end_index),
                text: Some(text),
            } => Ok(AnnotationData {
                title,
                description,
                start_index,
                end_index,
                text,
            }),
            _ => Err(ValidationError::single(NON_FIELD_ERRORS, "Incomplete data.")),
        }
    }

    pub fn validate_partial(
        data: &Value,
        texts: &dyn PkLookup,
    ) -> Result<AnnotationPatch, ValidationError> {
        Self::read(data, true, texts)
    }

    fn read(
        data: &Value,
        partial: bool,
        texts: &dyn PkLookup,
    ) -> Result<AnnotationPatch, ValidationError> {
        let mut fields = Fields::new(data, partial)?;
        let patch = AnnotationPatch {
            title: fields.string("title"),
            description: fields.string("description"),
            start_index: fields.integer("start_index"),
            end_index: fields.integer("end_index"),
            text: fields.pk("text", texts)?,
        };
        fields.finish()?;
        Ok(patch)
    }
}
