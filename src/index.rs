//! Read-only vector index handle and its construct-once cell.
//!
//! A [`VectorIndex`] binds an [`Embedder`] to a named collection in a
//! persisted [`Db`]. The application owns one [`IndexCell`] and hands out the
//! same `Arc<VectorIndex>` on every access.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info};

use crate::db::models::Collection;
use crate::db::{DB_FILENAME, Db, DbError};
use crate::embedder::{Embedder, EmbedderError};

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("persisted index not found at {0}")]
    MissingStore(PathBuf),

    #[error("collection {0:?} does not exist")]
    UnknownCollection(String),

    #[error("embedder produces {embedder} dimensions but collection {collection:?} stores {stored}")]
    DimensionMismatch {
        collection: String,
        embedder: usize,
        stored: usize,
    },

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbedderError),

    #[error("index lock poisoned")]
    Poisoned,
}

/// One passage returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub text: String,
}

pub struct VectorIndex {
    db: Mutex<Db>,
    collection: Collection,
    embedder: Arc<dyn Embedder>,
}

impl VectorIndex {
    /// Open the persisted collection `name` in `persist_dir`.
    ///
    /// Nothing is created: a missing directory, database file or collection is
    /// an error, as is a collection whose dimensionality differs from the
    /// embedder's.
    pub fn open(
        persist_dir: &Path,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, IndexError> {
        if !persist_dir.join(DB_FILENAME).is_file() {
            return Err(IndexError::MissingStore(persist_dir.to_path_buf()));
        }

        let db = Db::open(persist_dir)?;
        Self::from_db(db, name, embedder)
    }

    /// Bind an already opened store.
    pub fn from_db(db: Db, name: &str, embedder: Arc<dyn Embedder>) -> Result<Self, IndexError> {
        let collection = db
            .collection(name)?
            .ok_or_else(|| IndexError::UnknownCollection(name.to_string()))?;

        if collection.dimensions != embedder.dimensions() {
            return Err(IndexError::DimensionMismatch {
                collection: collection.name,
                embedder: embedder.dimensions(),
                stored: collection.dimensions,
            });
        }

        let count = db.count_passages(&collection)?;
        info!(
            "Vector index ready: collection {:?}, {} passages, {} dimensions",
            collection.name, count, collection.dimensions
        );

        Ok(Self {
            db: Mutex::new(db),
            collection,
            embedder,
        })
    }

    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Embed `query` and return up to `k` passages, nearest first.
    pub fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Passage>, IndexError> {
        let vector = self.embedder.embed(query)?;

        let db = self.db.lock().map_err(|_| IndexError::Poisoned)?;
        let results = db.search(&self.collection, &vector, k)?;
        debug!(
            "Retrieved {} passages (k = {k}, nearest distance {:?})",
            results.len(),
            results.first().map(|r| r.distance)
        );

        Ok(results
            .into_iter()
            .map(|r| Passage { text: r.content })
            .collect())
    }
}

/// Construct-once holder for the process's [`VectorIndex`].
#[derive(Default)]
pub struct IndexCell {
    inner: Mutex<Option<Arc<VectorIndex>>>,
}

impl IndexCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle, running `init` only if none has been built yet.
    ///
    /// A failed `init` leaves the cell empty, so a later call retries.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<VectorIndex>, IndexError>
    where
        F: FnOnce() -> Result<VectorIndex, IndexError>,
    {
        let mut slot = self.inner.lock().map_err(|_| IndexError::Poisoned)?;
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(init()?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The handle, if it was already built.
    #[must_use]
    pub fn get(&self) -> Option<Arc<VectorIndex>> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::mock::MockEmbedder;
    use std::cell::Cell;

    fn seeded_store(dir: &Path, dimensions: usize) {
        let mut db = Db::create(dir).unwrap();
        let collection = db.create_collection("my_collection", dimensions).unwrap();
        let embedder = MockEmbedder::new(dimensions);
        let texts = ["alpha", "beta", "gamma", "delta"];
        let vectors: Vec<Vec<f32>> = texts.iter().map(|t| embedder.embed(t).unwrap()).collect();
        db.add_passages(&collection, &texts, &vectors).unwrap();
    }

    #[test]
    fn test_open_missing_dir() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("chroma_db");
        let err = VectorIndex::open(&missing, "my_collection", Arc::new(MockEmbedder::new(8)))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::MissingStore(_)));
    }

    #[test]
    fn test_open_empty_store_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join(DB_FILENAME);
        std::fs::File::create(&file).unwrap();

        let err = VectorIndex::open(temp.path(), "my_collection", Arc::new(MockEmbedder::new(8)))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::Store(DbError::MissingSchema(_))));
        assert_eq!(std::fs::metadata(&file).unwrap().len(), 0);
    }

    #[test]
    fn test_open_unknown_collection() {
        let temp = tempfile::tempdir().unwrap();
        seeded_store(temp.path(), 8);
        let err = VectorIndex::open(temp.path(), "nope", Arc::new(MockEmbedder::new(8)))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::UnknownCollection(name) if name == "nope"));
    }

    #[test]
    fn test_open_dimension_mismatch() {
        let temp = tempfile::tempdir().unwrap();
        seeded_store(temp.path(), 8);
        let err = VectorIndex::open(temp.path(), "my_collection", Arc::new(MockEmbedder::new(16)))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_similarity_search_top_k() {
        let temp = tempfile::tempdir().unwrap();
        seeded_store(temp.path(), 8);
        let index =
            VectorIndex::open(temp.path(), "my_collection", Arc::new(MockEmbedder::new(8)))
                .unwrap();

        let passages = index.similarity_search("gamma", 3).unwrap();
        assert_eq!(passages.len(), 3);
        // Identical text embeds identically, so it is the nearest passage
        assert_eq!(passages[0].text, "gamma");
    }

    #[test]
    fn test_cell_constructs_once() {
        let temp = tempfile::tempdir().unwrap();
        seeded_store(temp.path(), 8);

        let cell = IndexCell::new();
        let calls = Cell::new(0);
        let init = || {
            calls.set(calls.get() + 1);
            VectorIndex::open(temp.path(), "my_collection", Arc::new(MockEmbedder::new(8)))
        };

        let first = cell.get_or_try_init(init).unwrap();
        let second = cell.get_or_try_init(init).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &cell.get().unwrap()));
    }

    #[test]
    fn test_cell_failed_init_stays_empty() {
        let cell = IndexCell::new();
        let result = cell.get_or_try_init(|| Err(IndexError::UnknownCollection("x".into())));
        assert!(result.is_err());
        assert!(cell.get().is_none());
    }
}
