//! Persistent passage store using SQLite and sqlite-vec
use rusqlite::{Connection, OpenFlags};
use sqlite_vec::sqlite3_vec_init;
use std::path::{Path, PathBuf};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info};

pub mod collections;
pub mod models;
pub mod search;

/// File name of the SQLite database inside a persist directory.
pub const DB_FILENAME: &str = "index.sqlite3";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    dimensions INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS passages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_passages_collection ON passages(collection_id);
"#;

/// Tables `SCHEMA_SQL` creates.
const SCHEMA_TABLES: usize = 2;

/// Errors raised by the passage store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create persist directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} has no passage schema")]
    MissingSchema(PathBuf),

    #[error("vector has {actual} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("{texts} texts but {embeddings} embeddings")]
    LengthMismatch { texts: usize, embeddings: usize },
}

pub type Result<T> = std::result::Result<T, DbError>;

static INIT_VEC: Once = Once::new();

/// Initialize the sqlite-vec extension. Safe to call multiple times.
fn init_sqlite_vec() {
    INIT_VEC.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// A SQLite connection initialized with sqlite-vec and the passage schema.
pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    /// Open an existing store inside `dir` for reading.
    ///
    /// Fails if `dir` does not contain a database file with the passage
    /// schema. The file is never created or written.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(DB_FILENAME);
        info!("Opening passage store: {}", path.display());

        init_sqlite_vec();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        check_vec(&conn)?;

        let tables: usize = conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type='table' AND name IN ('collections', 'passages')",
            [],
            |row| row.get(0),
        )?;
        if tables != SCHEMA_TABLES {
            return Err(DbError::MissingSchema(path));
        }

        Ok(Self { conn })
    }

    /// Create (or reuse) a store inside `dir`, creating the directory if needed.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| DbError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(DB_FILENAME);
        info!("Creating passage store: {}", path.display());

        init_sqlite_vec();
        Self::init(Connection::open(&path)?)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        init_sqlite_vec();
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        check_vec(&conn)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self { conn })
    }
}

/// Verify sqlite-vec is loaded
fn check_vec(conn: &Connection) -> Result<()> {
    let vec_version: String = conn.query_row("SELECT vec_version()", [], |row| row.get(0))?;
    debug!("sqlite-vec version: {}", vec_version);
    Ok(())
}

/// Serialize a float32 vector into the little-endian blob sqlite-vec reads.
pub fn serialize_vector(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}
