//! Document store for the `libros` and `autores` collections.
//!
//! [`LibraryStore`] is the seam the HTTP handlers talk to. Two backends
//! implement it: [`MongoStore`] for a real MongoDB deployment and
//! [`InMemoryStore`] for tests and local runs (`memory://`).

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use biblioteca_kernel::settings::DatabaseSettings;
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Collection holding book records.
pub const LIBROS_COLLECTION: &str = "libros";
/// Collection holding author records.
pub const AUTORES_COLLECTION: &str = "autores";

const MEMORY_SCHEME: &str = "memory://";

/// Handle shared by every request for the lifetime of the process.
pub type SharedStore = Arc<dyn LibraryStore>;

/// A stored author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutorRecord {
    pub id: String,
    pub nombre: String,
    pub biografia: i64,
}

/// Fields of an author about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAutor {
    pub nombre: String,
    pub biografia: i64,
}

/// A stored book. `autores` holds references only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibroRecord {
    pub id: String,
    pub titulo: String,
    pub autores: Vec<String>,
    pub copias: i64,
}

/// The replaceable fields of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibroFields {
    pub titulo: String,
    pub autores: Vec<String>,
    pub copias: i64,
}

/// Result of a full-field replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("unexpected identifier returned by the store: {0}")]
    InvalidId(String),

    #[error("store is closed")]
    Closed,
}

/// Operations the API performs against the two collections.
#[async_trait]
pub trait LibraryStore: Send + Sync + 'static {
    /// The form `id` takes in records returned by this store. References
    /// that only differ in spelling (letter case) map to the same value.
    fn canonical_id(&self, id: &str) -> String {
        id.to_string()
    }

    /// Insert an author and return its new identifier.
    async fn insert_autor(&self, autor: NewAutor) -> Result<String, StoreError>;

    /// Authors whose identifier is in `ids`. Unknown or malformed ids are skipped.
    async fn find_autores(&self, ids: &[String]) -> Result<Vec<AutorRecord>, StoreError>;

    /// Insert a book and return its new identifier.
    async fn insert_libro(&self, libro: LibroFields) -> Result<String, StoreError>;

    /// All books, or only those whose title equals `titulo` exactly.
    async fn find_libros(&self, titulo: Option<&str>) -> Result<Vec<LibroRecord>, StoreError>;

    async fn find_libro(&self, id: &str) -> Result<Option<LibroRecord>, StoreError>;

    /// Overwrite title, authors and copies of the book `id`.
    async fn replace_libro(
        &self,
        id: &str,
        libro: LibroFields,
    ) -> Result<ReplaceOutcome, StoreError>;

    /// Returns `true` when a record was removed.
    async fn delete_libro(&self, id: &str) -> Result<bool, StoreError>;

    async fn count_libros(&self) -> Result<u64, StoreError>;

    /// Round trip to the backend.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release backend resources. Called once on shutdown.
    async fn close(&self) {}
}

/// Build the store named by the configured connection string.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SharedStore> {
    let url = settings.connection_string()?;

    if url.starts_with(MEMORY_SCHEME) {
        tracing::warn!(
            target: "biblioteca-db",
            "using the in-memory store; data is lost on exit"
        );
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let store = MongoStore::connect(url, &settings.name)
        .await
        .with_context(|| "failed to connect to MongoDB")?;
    Ok(Arc::new(store))
}
