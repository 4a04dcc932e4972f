use super::{Fields, PkLookup, ValidationError};
use crate::model::Text;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TextView {
    pub id: i64,
    pub content: String,
    pub annotations: Vec<i64>,
}

impl From<&Text> for TextView {
    fn from(text: &Text) -> TextView {
        TextView {
            id: text.id,
            content: text.content.clone(),
            annotations: text.annotations.clone(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct TextData {
    pub content: String,
    /// Annotations to move onto this text.
    pub annotations: Option<Vec<i64>>,
}

#[derive(Debug, Default, PartialEq)]
pub struct TextPatch {
    pub content: Option<String>,
    pub annotations: Option<Vec<i64>>,
}

impl From<TextData> for TextPatch {
    fn from(data: TextData) -> TextPatch {
        TextPatch {
            content: Some(data.content),
            annotations: data.annotations,
        }
    }
}

pub struct TextSerializer;

impl TextSerializer {
    pub fn serialize(text: &Text) -> TextView {
        text.into()
    }

    pub fn validate(
        data: &Value,
        annotations: &dyn PkLookup,
    ) -> Result<TextData, ValidationError> {
        match Self::read(data, false, annotations)? {
            TextPatch {
                content: Some(content),
                annotations,
            } => Ok(TextData {
                content,
                annotations,
            }),
            _ => Err(ValidationError::single("content", super::REQUIRED)),
        }
    }

    pub fn validate_partial(
        data: &Value,
        annotations: &dyn PkLookup,
    ) -> Result<TextPatch, ValidationError> {
        Self::read(data, true, annotations)
    }

    fn read(
        data: &Value,
        partial: bool,
        annotations: &dyn PkLookup,
    ) -> Result<TextPatch, ValidationError> {
        let mut fields = Fields::new(data, partial)?;
        let patch = TextPatch {
            content: fields.string("content"),
            annotations: fields.pk_list("annotations", annotations)?,
        };
        fields.finish()?;
        Ok(patch)
    }
}
