pub mod assembler;
pub mod models;
mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use biblioteca_db::SharedStore;
use biblioteca_kernel::{InitCtx, Module};
use serde_json::json;

/// Book listing, lookup and maintenance
pub struct LibrosModule {
    store: SharedStore,
}

impl LibrosModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for LibrosModule {
    fn name(&self) -> &'static str {
        "libros"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.name,
            "libros module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/libros", get(routes::list_libros))
            .route(
                "/libro",
                get(routes::get_libro)
                    .post(routes::create_libro)
                    .put(routes::update_libro)
                    .delete(routes::delete_libro),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let id_param = json!({
            "name": "id",
            "in": "query",
            "required": true,
            "schema": { "type": "string" }
        });
        let write_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/CreateLibro" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/libros": {
                    "get": {
                        "summary": "List books, optionally by exact title",
                        "tags": ["Libros"],
                        "parameters": [{
                            "name": "titulo",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Hydrated books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Libro" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/libro": {
                    "get": {
                        "summary": "Get one book",
                        "tags": ["Libros"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "Hydrated book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Libro" }
                                    }
                                }
                            },
                            "400": merge_description(&error, "Missing id"),
                            "404": merge_description(&error, "Book not found")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Libros"],
                        "requestBody": write_body.clone(),
                        "responses": {
                            "201": { "description": "Book created" },
                            "400": merge_description(&error, "Missing or malformed fields")
                        }
                    },
                    "put": {
                        "summary": "Replace title, authors and copies of a book",
                        "tags": ["Libros"],
                        "parameters": [id_param.clone()],
                        "requestBody": write_body,
                        "responses": {
                            "200": { "description": "Book updated; authors listed under `autor`" },
                            "400": merge_description(&error, "Missing or malformed fields"),
                            "404": merge_description(&error, "Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Libros"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "Book deleted" },
                            "400": merge_description(&error, "Missing id"),
                            "404": merge_description(&error, "Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Libro": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "titulo": { "type": "string" },
                            "autores": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Autor" }
                            },
                            "copias": { "type": "integer" }
                        },
                        "required": ["id", "titulo", "autores", "copias"]
                    },
                    "CreateLibro": {
                        "type": "object",
                        "properties": {
                            "titulo": { "type": "string" },
                            "autores": { "type": "array", "items": { "type": "string" } },
                            "copias": { "type": "integer" }
                        },
                        "required": ["titulo", "autores", "copias"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let libros = self.store.count_libros().await?;
        tracing::info!(module = self.name(), libros, "libros module started");
        Ok(())
    }
}

fn merge_description(response: &serde_json::Value, description: &str) -> serde_json::Value {
    let mut response = response.clone();
    response["description"] = json!(description);
    response
}

/// Create a new instance of the libros module
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(LibrosModule::new(store))
}
