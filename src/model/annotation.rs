use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_index: i64,
    pub end_index: i64,
    pub text_id: i64,
    pub created_at: DateTime<Utc>,
}
