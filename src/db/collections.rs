use super::{Db, DbError, Result, models::Collection, serialize_vector};
use rusqlite::{OptionalExtension, params};

impl Db {
    /// Registers a new collection. Fails if the name is already taken.
    pub fn create_collection(&self, name: &str, dimensions: usize) -> Result<Collection> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO collections (name, dimensions) VALUES (?, ?) RETURNING id",
            params![name, dimensions as i64],
            |row| row.get(0),
        )?;

        Ok(Collection {
            id,
            name: name.to_string(),
            dimensions,
        })
    }

    /// Looks up a collection by name
    pub fn collection(&self, name: &str) -> Result<Option<Collection>> {
        let collection = self
            .conn
            .query_row(
                "SELECT id, name, dimensions FROM collections WHERE name = ?",
                params![name],
                |row| {
                    Ok(Collection {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        dimensions: row.get::<_, i64>(2)? as usize,
                    })
                },
            )
            .optional()?;

        Ok(collection)
    }

    /// Appends passages with their embeddings to a collection.
    ///
    /// Ids increase with insertion, so they also record passage order. Returns
    /// the new passage ids in input order.
    pub fn add_passages(
        &mut self,
        collection: &Collection,
        texts: &[&str],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<i64>> {
        if texts.len() != embeddings.len() {
            return Err(DbError::LengthMismatch {
                texts: texts.len(),
                embeddings: embeddings.len(),
            });
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != collection.dimensions) {
            return Err(DbError::DimensionMismatch {
                expected: collection.dimensions,
                actual: bad.len(),
            });
        }

        let tx = self.conn.transaction()?;

        let mut ids = Vec::with_capacity(texts.len());
        for (text, embedding) in texts.iter().zip(embeddings) {
            tx.execute(
                "INSERT INTO passages (collection_id, content, embedding) VALUES (?, ?, ?)",
                params![collection.id, text, serialize_vector(embedding)],
            )?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok(ids)
    }

    /// Number of passages stored in a collection
    pub fn count_passages(&self, collection: &Collection) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM passages WHERE collection_id = ?",
            params![collection.id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
