use crate::{db::DbPool, model::Text, serializer::PkLookup};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

pub struct TextRepository {
    pool: DbPool,
}

impl TextRepository {
    pub fn new(pool: DbPool) -> TextRepository {
        TextRepository { pool }
    }

    /// Inserts a text and moves the given annotations onto it, atomically.
    pub fn insert(&self, content: &str, annotations: &[i64]) -> Result<Text> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO text (content) VALUES (?)", params![content])?;
        let id = tx.last_insert_rowid();
        reassign_annotations(&tx, id, annotations)?;
        let text = select_by_id(&tx, id)?;
        tx.commit()?;
        text.ok_or_else(|| anyhow::anyhow!("Text {} vanished after insert", id))
    }

    pub fn select_all(&self) -> Result<Vec<Text>> {
        let conn = self.pool.get()?;

        let mut annotations: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut stmt = conn.prepare("SELECT id, text_id FROM annotation ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (id, text_id) = row?;
            annotations.entry(text_id).or_default().push(id);
        }

        let mut stmt = conn.prepare("SELECT id, content FROM text ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Text {
                id: row.get(0)?,
                content: row.get(1)?,
                annotations: vec![],
            })
        })?;

        let mut texts = vec![];
        for row in rows {
            let mut text = row?;
            text.annotations = annotations.remove(&text.id).unwrap_or_default();
            texts.push(text);
        }
        Ok(texts)
    }

    pub fn select_by_id(&self, id: i64) -> Result<Option<Text>> {
        select_by_id(&*self.pool.get()?, id)
    }

    /// Returns the updated text, or `None` if there is no text with this id.
    pub fn update(
        &self,
        id: i64,
        content: Option<&str>,
        annotations: Option<&[i64]>,
    ) -> Result<Option<Text>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        if !exists(&tx, id)? {
            return Ok(None);
        }

        if let Some(content) = content {
            tx.execute(
                "UPDATE text SET content = ? WHERE id = ?",
                params![content, id],
            )?;
        }

        if let Some(annotations) = annotations {
            reassign_annotations(&tx, id, annotations)?;
        }

        let text = select_by_id(&tx, id)?;
        tx.commit()?;
        Ok(text)
    }

    /// Deletes a text together with its annotations.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .pool
            .get()?
            .execute("DELETE FROM text WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}

impl PkLookup for TextRepository {
    fn exists(&self, pk: i64) -> Result<bool> {
        exists(&*self.pool.get()?, pk)
    }
}

fn exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM text WHERE id = ?", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn select_by_id(conn: &Connection, id: i64) -> Result<Option<Text>> {
    let text = conn
        .query_row(
            "SELECT id, content FROM text WHERE id = ?",
            params![id],
            |row| {
                Ok(Text {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    annotations: vec![],
                })
            },
        )
        .optional()?;

    let mut text = match text {
        Some(text) => text,
        None => return Ok(None),
    };

    let mut stmt = conn.prepare("SELECT id FROM annotation WHERE text_id = ? ORDER BY id")?;
    let ids = stmt.query_map(params![id], |row| row.get(0))?;
    text.annotations = ids.collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(Some(text))
}

fn reassign_annotations(conn: &Connection, text_id: i64, annotations: &[i64]) -> Result<()> {
    let mut stmt = conn.prepare("UPDATE annotation SET text_id = ? WHERE id = ?")?;
    for id in annotations {
        stmt.execute(params![text_id, id])?;
    }
    Ok(())
}
