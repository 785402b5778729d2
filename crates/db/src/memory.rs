//! In-process backend with the same observable semantics as [`crate::MongoStore`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    AutorRecord, LibraryStore, LibroFields, LibroRecord, NewAutor, ReplaceOutcome, StoreError,
};

#[derive(Default)]
struct Collections {
    libros: BTreeMap<String, LibroRecord>,
    autores: BTreeMap<String, AutorRecord>,
}

/// Thread-safe store keeping both collections behind one async `RwLock`.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<Collections>,
    closed: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id() -> String {
        Uuid::now_v7().simple().to_string()
    }

    /// UUIDs parse in any letter case; stored keys are lowercase `simple`.
    fn key(id: &str) -> String {
        Uuid::parse_str(id)
            .map(|uuid| uuid.simple().to_string())
            .unwrap_or_else(|_| id.to_string())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryStore for InMemoryStore {
    fn canonical_id(&self, id: &str) -> String {
        Self::key(id)
    }

    async fn insert_autor(&self, autor: NewAutor) -> Result<String, StoreError> {
        self.ensure_open()?;
        let id = Self::next_id();
        let record = AutorRecord {
            id: id.clone(),
            nombre: autor.nombre,
            biografia: autor.biografia,
        };
        self.collections
            .write()
            .await
            .autores
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn find_autores(&self, ids: &[String]) -> Result<Vec<AutorRecord>, StoreError> {
        self.ensure_open()?;
        let keys: Vec<String> = ids.iter().map(|id| Self::key(id)).collect();
        let collections = self.collections.read().await;
        // Natural (insertion) order, like an `$in` query without a sort.
        Ok(collections
            .autores
            .values()
            .filter(|autor| keys.contains(&autor.id))
            .cloned()
            .collect())
    }

    async fn insert_libro(&self, libro: LibroFields) -> Result<String, StoreError> {
        self.ensure_open()?;
        let id = Self::next_id();
        let record = LibroRecord {
            id: id.clone(),
            titulo: libro.titulo,
            autores: libro.autores,
            copias: libro.copias,
        };
        self.collections
            .write()
            .await
            .libros
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn find_libros(&self, titulo: Option<&str>) -> Result<Vec<LibroRecord>, StoreError> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .libros
            .values()
            .filter(|libro| titulo.map_or(true, |titulo| libro.titulo == titulo))
            .cloned()
            .collect())
    }

    async fn find_libro(&self, id: &str) -> Result<Option<LibroRecord>, StoreError> {
        self.ensure_open()?;
        Ok(self.collections.read().await.libros.get(&Self::key(id)).cloned())
    }

    async fn replace_libro(
        &self,
        id: &str,
        libro: LibroFields,
    ) -> Result<ReplaceOutcome, StoreError> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        let Some(record) = collections.libros.get_mut(&Self::key(id)) else {
            return Ok(ReplaceOutcome {
                matched: 0,
                modified: 0,
            });
        };

        let changed = record.titulo != libro.titulo
            || record.autores != libro.autores
            || record.copias != libro.copias;
        if changed {
            record.titulo = libro.titulo;
            record.autores = libro.autores;
            record.copias = libro.copias;
        }

        Ok(ReplaceOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_libro(&self, id: &str) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(self.collections.write().await.libros.remove(&Self::key(id)).is_some())
    }

    async fn count_libros(&self) -> Result<u64, StoreError> {
        self.ensure_open()?;
        Ok(self.collections.read().await.libros.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
