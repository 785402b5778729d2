pub mod autores;
pub mod libros;

use biblioteca_db::SharedStore;
use biblioteca_kernel::ModuleRegistry;

/// Register every feature module with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: SharedStore) -> anyhow::Result<()> {
    registry.register(autores::create_module(store.clone()))?;
    registry.register(libros::create_module(store))?;
    Ok(())
}
