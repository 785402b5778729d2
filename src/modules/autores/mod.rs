pub mod models;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use biblioteca_db::SharedStore;
use biblioteca_http::{body::parse_json, error::AppError};
use biblioteca_kernel::{InitCtx, Module};
use serde_json::json;

use models::{Autor, CreateAutor};

/// Author creation. Authors are never updated or deleted through the API.
pub struct AutoresModule {
    store: SharedStore,
}

impl AutoresModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AutoresModule {
    fn name(&self) -> &'static str {
        "autores"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "autores module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/autor", post(create_autor))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/autor": {
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Autores"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateAutor" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Author created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Autor" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing or malformed fields",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Autor": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "nombre": { "type": "string" },
                            "biografia": { "type": "integer" }
                        },
                        "required": ["id", "nombre", "biografia"]
                    },
                    "CreateAutor": {
                        "type": "object",
                        "properties": {
                            "nombre": { "type": "string" },
                            "biografia": { "type": "integer" }
                        },
                        "required": ["nombre", "biografia"]
                    }
                }
            }
        }))
    }
}

/// `POST /autor`
async fn create_autor(
    State(store): State<SharedStore>,
    body: Bytes,
) -> Result<(StatusCode, Json<Autor>), AppError> {
    let autor = parse_json::<CreateAutor>(&body)?.validate()?;

    let id = store.insert_autor(autor.clone()).await?;
    tracing::info!(autor_id = %id, "autor created");

    Ok((
        StatusCode::CREATED,
        Json(Autor {
            id,
            nombre: autor.nombre,
            biografia: autor.biografia,
        }),
    ))
}

/// Create a new instance of the autores module
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AutoresModule::new(store))
}
