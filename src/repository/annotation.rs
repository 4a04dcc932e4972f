use crate::{
    db::DbPool,
    model::Annotation,
    serializer::{AnnotationData, PkLookup},
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

const COLUMNS: &str = "id, title, description, start_index, end_index, text_id, created_at";

pub struct AnnotationRepository {
    pool: DbPool,
}

impl AnnotationRepository {
    pub fn new(pool: DbPool) -> AnnotationRepository {
        AnnotationRepository { pool }
    }

    pub fn insert(&self, row: &AnnotationData, created_at: DateTime<Utc>) -> Result<Annotation> {
        let conn = self.pool.get()?;
        let query = "INSERT INTO annotation (title, description, start_index, end_index, text_id, created_at) VALUES (?, ?, ?, ?, ?, ?)";
        let params = params![
            &row.title,
            &row.description,
            row.start_index,
            row.end_index,
            row.text,
            created_at,
        ];
        conn.execute(query, params)?;

        Ok(Annotation {
            id: conn.last_insert_rowid(),
            title: row.title.clone(),
            description: row.description.clone(),
            start_index: row.start_index,
            end_index: row.end_index,
            text_id: row.text,
            created_at,
        })
    }

    pub fn select_all(&self, text_id: Option<i64>) -> Result<Vec<Annotation>> {
        let conn = self.pool.get()?;
        let annotations = match text_id {
            Some(text_id) => {
                let query = format!(
                    "SELECT {} FROM annotation WHERE text_id = ? ORDER BY id",
                    COLUMNS
                );
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(params![text_id], map_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let query = format!("SELECT {} FROM annotation ORDER BY id", COLUMNS);
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map([], map_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(annotations)
    }

    pub fn select_by_id(&self, id: i64) -> Result<Option<Annotation>> {
        let query = format!("SELECT {} FROM annotation WHERE id = ?", COLUMNS);
        Ok(self
            .pool
            .get()?
            .query_row(&query, params![id], map_row)
            .optional()?)
    }

    /// Writes every mutable column. `created_at` is left as stored.
    pub fn update(&self, row: &Annotation) -> Result<bool> {
        let query = "UPDATE annotation SET title = ?, description = ?, start_index = ?, end_index = ?, text_id = ? WHERE id = ?";
        let params = params![
            &row.title,
            &row.description,
            row.start_index,
            row.end_index,
            row.text_id,
            row.id,
        ];
        Ok(self.pool.get()?.execute(query, params)? > 0)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .pool
            .get()?
            .execute("DELETE FROM annotation WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

impl PkLookup for AnnotationRepository {
    fn exists(&self, pk: i64) -> Result<bool> {
        Ok(self
            .pool
            .get()?
            .query_row(
                "SELECT 1 FROM annotation WHERE id = ?",
                params![pk],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }
}

fn map_row(row: &Row) -> rusqlite::Result<Annotation> {
    Ok(Annotation {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_index: row.get(3)?,
        end_index: row.get(4)?,
        text_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}
