//! Mapping between stored records and their JSON representation.
//!
//! Output goes through `Serialize` view structs, so the exposed key set is
//! fixed by the type. Input is validated field by field from a raw JSON
//! value, collecting every problem into a [`FieldErrors`] map keyed by the
//! wire field name.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod annotation;
pub use annotation::{AnnotationData, AnnotationPatch, AnnotationSerializer, AnnotationView};
pub mod login;
pub use login::{LoginData, LoginSerializer, RefreshSerializer};
pub mod text;
pub use text::{TextData, TextPatch, TextSerializer, TextView};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NULL: &str = "This field may not be null.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|it| it.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid input: {0:?}")]
    Invalid(FieldErrors),
    /// The input could not be checked, e.g. a relation lookup hit a broken
    /// database. Not the client's fault.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> ValidationError {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        ValidationError::Invalid(errors)
    }
}

/// Existence check for primary keys referenced from inbound data.
pub trait PkLookup {
    fn exists(&self, pk: i64) -> anyhow::Result<bool>;
}

/// Name of a JSON value's type, as shown in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Field-by-field reader over an inbound JSON object.
///
/// In partial mode a missing field is skipped instead of reported. Fields
/// that are not read are ignored, which is how read-only fields such as
/// `id` and `created_at` are dropped.
pub(crate) struct Fields<'a> {
    data: &'a Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn new(data: &'a Value, partial: bool) -> Result<Fields<'a>, ValidationError> {
        match data {
            Value::Object(data) => Ok(Fields {
                data,
                partial,
                errors: FieldErrors::default(),
            }),
            other => Err(ValidationError::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(other)
                ),
            )),
        }
    }

    /// Looks up a field, reporting it as missing or null when it must be
    /// present.
    fn present(&mut self, name: &str, required: bool) -> Option<&'a Value> {
        match self.data.get(name) {
            None => {
                if required && !self.partial {
                    self.errors.add(name, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    pub fn string(&mut self, name: &str) -> Option<String> {
        match self.present(name, true)? {
            Value::String(s) if s.trim().is_empty() => {
                self.errors.add(name, BLANK);
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.add(name, INVALID_STRING);
                None
            }
        }
    }

    pub fn integer(&mut self, name: &str) -> Option<i64> {
        let int = as_integer(self.present(name, true)?);

        if int.is_none() {
            self.errors.add(name, INVALID_INTEGER);
        }

        int
    }

    /// Reads a required reference to another record.
    pub fn pk(
        &mut self,
        name: &str,
        lookup: &dyn PkLookup,
    ) -> Result<Option<i64>, ValidationError> {
        let value = match self.present(name, true) {
            Some(value) => value,
            None => return Ok(None),
        };

        match self.check_pk(value, lookup)? {
            Ok(pk) => Ok(Some(pk)),
            Err(message) => {
                self.errors.add(name, message);
                Ok(None)
            }
        }
    }

    /// Reads an optional list of references to other records.
    pub fn pk_list(
        &mut self,
        name: &str,
        lookup: &dyn PkLookup,
    ) -> Result<Option<Vec<i64>>, ValidationError> {
        let items = match self.present(name, false) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                let message = format!(
                    "Expected a list of items but got type \"{}\".",
                    type_name(other)
                );
                self.errors.add(name, message);
                return Ok(None);
            }
            None => return Ok(None),
        };

        let mut pks = Vec::with_capacity(items.len());
        let mut valid = true;

        for item in items {
            match self.check_pk(item, lookup)? {
                Ok(pk) => pks.push(pk),
                Err(message) => {
                    self.errors.add(name, message);
                    valid = false;
                }
            }
        }

        Ok(if valid { Some(pks) } else { None })
    }

    fn check_pk(
        &self,
        value: &Value,
        lookup: &dyn PkLookup,
    ) -> Result<Result<i64, String>, ValidationError> {
        let pk = match as_integer(value) {
            Some(pk) => pk,
            None => {
                return Ok(Err(format!(
                    "Incorrect type. Expected pk value, received {}.",
                    type_name(value)
                )))
            }
        };

        if lookup.exists(pk)? {
            Ok(Ok(pk))
        } else {
            Ok(Err(format!("Invalid pk \"{}\" - object does not exist.", pk)))
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(self.errors))
        }
    }
}

/// JSON integers, and floats with no fractional part.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{type_name, Fields, PkLookup, ValidationError, BLANK, NULL, REQUIRED};
    use serde_json::json;

    /// Keys that exist, for serializers that check relations.
    pub struct Pks(pub Vec<i64>);

    impl PkLookup for Pks {
        fn exists(&self, pk: i64) -> anyhow::Result<bool> {
            Ok(self.0.contains(&pk))
        }
    }

    pub fn errors_of<T: std::fmt::Debug>(
        res: Result<T, ValidationError>,
    ) -> super::FieldErrors {
        match res {
            Err(ValidationError::Invalid(errors)) => errors,
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn type_names() {
        assert_eq!("NoneType", type_name(&json!(null)));
        assert_eq!("bool", type_name(&json!(true)));
        assert_eq!("int", type_name(&json!(5)));
        assert_eq!("float", type_name(&json!(5.5)));
        assert_eq!("str", type_name(&json!("5")));
        assert_eq!("list", type_name(&json!([5])));
        assert_eq!("dict", type_name(&json!({})));
    }

    #[test]
    fn rejects_non_object() {
        let data = json!(["content"]);
        let errors = errors_of(Fields::new(&data, false).map(|_| ()));
        assert_eq!(
            Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..]),
            errors.get("non_field_errors")
        );
    }

    #[test]
    fn string_errors() {
        let data = json!({"null": null, "blank": "  ", "number": 1});
        let mut fields = Fields::new(&data, false).unwrap();
        assert_eq!(None, fields.string("missing"));
        assert_eq!(None, fields.string("null"));
        assert_eq!(None, fields.string("blank"));
        assert_eq!(None, fields.string("number"));
        let errors = errors_of(fields.finish());
        assert_eq!(Some(&[REQUIRED.to_string()][..]), errors.get("missing"));
        assert_eq!(Some(&[NULL.to_string()][..]), errors.get("null"));
        assert_eq!(Some(&[BLANK.to_string()][..]), errors.get("blank"));
        assert_eq!(
            Some(&["Not a valid string.".to_string()][..]),
            errors.get("number")
        );
    }

    #[test]
    fn partial_skips_missing() {
        let data = json!({});
        let mut fields = Fields::new(&data, true).unwrap();
        assert_eq!(None, fields.string("title"));
        assert_eq!(None, fields.integer("start_index"));
        assert!(fields.finish().is_ok());
    }

    #[test]
    fn integers() {
        let data = json!({"int": 7, "float": 7.0, "fraction": 7.5, "str": "7", "bool": true});
        let mut fields = Fields::new(&data, false).unwrap();
        assert_eq!(Some(7), fields.integer("int"));
        assert_eq!(Some(7), fields.integer("float"));
        assert_eq!(None, fields.integer("fraction"));
        assert_eq!(None, fields.integer("str"));
        assert_eq!(None, fields.integer("bool"));
        let errors = errors_of(fields.finish());
        assert!(!errors.contains("int"));
        assert!(!errors.contains("float"));
        assert!(errors.contains("fraction"));
        assert!(errors.contains("str"));
        assert!(errors.contains("bool"));
    }

    #[test]
    fn pk_list_reports_each_bad_item() {
        let data = json!({"items": [1, 9, "x"]});
        let mut fields = Fields::new(&data, false).unwrap();
        assert_eq!(None, fields.pk_list("items", &Pks(vec![1])).unwrap());
        let errors = errors_of(fields.finish());
        assert_eq!(
            Some(
                &[
                    "Invalid pk \"9\" - object does not exist.".to_string(),
                    "Incorrect type. Expected pk value, received str.".to_string(),
                ][..]
            ),
            errors.get("items")
        );
    }

    #[test]
    fn pks_read_like_integers() {
        let data = json!({"int": 1, "float": 1.0, "fraction": 1.5, "items": [1.0, 1]});
        let mut fields = Fields::new(&data, false).unwrap();
        let lookup = Pks(vec![1]);
        assert_eq!(Some(1), fields.pk("int", &lookup).unwrap());
        assert_eq!(Some(1), fields.pk("float", &lookup).unwrap());
        assert_eq!(None, fields.pk("fraction", &lookup).unwrap());
        assert_eq!(Some(vec![1, 1]), fields.pk_list("items", &lookup).unwrap());
        let errors = errors_of(fields.finish());
        assert_eq!(
            Some(&["Incorrect type. Expected pk value, received float.".to_string()][..]),
            errors.get("fraction")
        );
        assert!(!errors.contains("float"));
        assert!(!errors.contains("items"));
    }

    #[test]
    fn pk_list_is_optional() {
        let data = json!({});
        let mut fields = Fields::new(&data, false).unwrap();
        assert_eq!(None, fields.pk_list("items", &Pks(vec![])).unwrap());
        assert!(fields.finish().is_ok());
    }
}
