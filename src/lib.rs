//! Biblioteca: books and authors over a document store.
//!
//! Book reads are hydrated: the author ids stored with a book are replaced by
//! the author documents that still exist (see [`modules::libros::assembler`]).

pub mod modules;
pub mod utils;

use axum::Router;
use biblioteca_db::SharedStore;
use biblioteca_kernel::ModuleRegistry;

pub use modules::register_all;

/// Registry holding every feature module wired to `store`.
pub fn registry(store: SharedStore) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, store)?;
    Ok(registry)
}

/// The complete HTTP application over `store`.
pub fn app(store: SharedStore) -> anyhow::Result<Router> {
    let registry = registry(store.clone())?;
    Ok(biblioteca_http::build_router(&registry, store))
}
