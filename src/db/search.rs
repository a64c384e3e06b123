use super::{Db, DbError, Result, models::{Collection, SearchResult}, serialize_vector};
use rusqlite::params;

fn map_search_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchResult> {
    Ok(SearchResult {
        content: row.get(0)?,
        distance: row.get(1)?,
    })
}

impl Db {
    /// Nearest passages of a collection by cosine distance, closest first.
    ///
    /// Ties keep insertion order. Returns at most `top_k` results.
    pub fn search(
        &self,
        collection: &Collection,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if query_vector.len() != collection.dimensions {
            return Err(DbError::DimensionMismatch {
                expected: collection.dimensions,
                actual: query_vector.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                p.content,
                vec_distance_cosine(p.embedding, ?) AS distance
            FROM passages p
            WHERE p.collection_id = ?
            ORDER BY distance ASC, p.id ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![serialize_vector(query_vector), collection.id, top_k as i64],
            map_search_row,
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Db, Collection) {
        let mut db = Db::open_in_memory().unwrap();
        let collection = db.create_collection("docs", 3).unwrap();
        db.add_passages(
            &collection,
            &["far", "near", "middle"],
            &[
                vec![0.0, 0.0, 1.0],
                vec![1.0, 0.1, 0.0],
                vec![1.0, 1.0, 0.0],
            ],
        )
        .unwrap();
        (db, collection)
    }

    #[test]
    fn test_search_orders_by_distance() {
        let (db, collection) = seeded();

        let results = db.search(&collection, &[1.0, 0.0, 0.0], 5).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(texts, vec!["near", "middle", "far"]);

        assert!(results[0].distance < 0.01);
        assert!(results[0].distance <= results[1].distance);
        assert!(results[1].distance <= results[2].distance);
    }

    #[test]
    fn test_search_respects_top_k() {
        let (db, collection) = seeded();

        let results = db.search(&collection, &[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);

        let results = db.search(&collection, &[1.0, 0.0, 0.0], 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_is_scoped_to_collection() {
        let (mut db, docs) = seeded();
        let other = db.create_collection("other", 3).unwrap();
        db.add_passages(&other, &["elsewhere"], &[vec![1.0, 0.0, 0.0]])
            .unwrap();

        let results = db.search(&docs, &[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.content != "elsewhere"));
    }

    #[test]
    fn test_search_empty_collection() {
        let db = Db::open_in_memory().unwrap();
        let collection = db.create_collection("empty", 3).unwrap();
        let results = db.search(&collection, &[1.0, 0.0, 0.0], 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_dimensions() {
        let (db, collection) = seeded();
        let err = db.search(&collection, &[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, DbError::DimensionMismatch { .. }));
    }
}
