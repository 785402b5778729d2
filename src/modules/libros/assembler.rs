//! Turns stored books into [`Libro`] responses by resolving author ids.
//!
//! The join is soft: ids that do not resolve to a stored author are dropped
//! without error. Store faults still propagate.

use std::collections::HashMap;

use biblioteca_db::{LibraryStore, LibroRecord, StoreError};
use futures_util::future::try_join_all;

use super::models::Libro;
use crate::modules::autores::models::Autor;

/// Authors found for `ids`, in order of first reference, each at most once.
pub async fn resolve_autores(
    store: &dyn LibraryStore,
    ids: &[String],
) -> Result<Vec<Autor>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = canonical_ids(store, ids);
    let mut found: HashMap<String, Autor> = store
        .find_autores(&ids)
        .await?
        .into_iter()
        .map(|record| (record.id.clone(), Autor::from(record)))
        .collect();

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

/// `ids` in the form the store reports them, so lookups match by value.
pub fn canonical_ids(store: &dyn LibraryStore, ids: &[String]) -> Vec<String> {
    ids.iter().map(|id| store.canonical_id(id)).collect()
}

pub async fn hydrate(store: &dyn LibraryStore, libro: LibroRecord) -> Result<Libro, StoreError> {
    let autores = resolve_autores(store, &libro.autores).await?;

    Ok(Libro {
        id: libro.id,
        titulo: libro.titulo,
        autores,
        copias: libro.copias,
    })
}

/// Hydrate every record concurrently, preserving the input order.
pub async fn hydrate_all(
    store: &dyn LibraryStore,
    libros: Vec<LibroRecord>,
) -> Result<Vec<Libro>, StoreError> {
    try_join_all(libros.into_iter().map(|libro| hydrate(store, libro))).await
}
