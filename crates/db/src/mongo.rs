//! MongoDB backend.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::{
    AutorRecord, LibraryStore, LibroFields, LibroRecord, NewAutor, ReplaceOutcome, StoreError,
    AUTORES_COLLECTION, LIBROS_COLLECTION,
};

#[derive(Debug, Serialize, Deserialize)]
struct AutorDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    nombre: String,
    biografia: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LibroDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    titulo: String,
    #[serde(default)]
    autores: Vec<String>,
    copias: i64,
}

impl TryFrom<AutorDocument> for AutorRecord {
    type Error = StoreError;

    fn try_from(document: AutorDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: hex_id(document.id)?,
            nombre: document.nombre,
            biografia: document.biografia,
        })
    }
}

impl TryFrom<LibroDocument> for LibroRecord {
    type Error = StoreError;

    fn try_from(document: LibroDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: hex_id(document.id)?,
            titulo: document.titulo,
            autores: document.autores,
            copias: document.copias,
        })
    }
}

fn hex_id(id: Option<ObjectId>) -> Result<String, StoreError> {
    id.map(|oid| oid.to_hex())
        .ok_or_else(|| StoreError::InvalidId("missing _id".to_string()))
}

fn inserted_hex(inserted: Bson) -> Result<String, StoreError> {
    match inserted {
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        other => Err(StoreError::InvalidId(other.to_string())),
    }
}

/// Lowercase hex for anything that parses as an ObjectId, `id` unchanged otherwise.
fn canonical_object_id(id: &str) -> String {
    ObjectId::parse_str(id)
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|_| id.to_string())
}

/// Filter matching a single `_id`, or `None` when `id` is not an ObjectId.
fn by_id(id: &str) -> Option<Document> {
    ObjectId::parse_str(id).ok().map(|oid| doc! { "_id": oid })
}

/// MongoDB-backed store holding one client for the process lifetime.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    libros: Collection<LibroDocument>,
    autores: Collection<AutorDocument>,
}

impl MongoStore {
    /// Connect to `uri` and verify the deployment answers a ping.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let store = Self::from_client(client, database);
        store.ping().await?;

        tracing::info!(
            target: "biblioteca-db",
            database = database,
            "connected successfully to server"
        );
        Ok(store)
    }

    pub fn from_client(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self {
            libros: database.collection(LIBROS_COLLECTION),
            autores: database.collection(AUTORES_COLLECTION),
            database,
            client,
        }
    }
}

#[async_trait]
impl LibraryStore for MongoStore {
    fn canonical_id(&self, id: &str) -> String {
        canonical_object_id(id)
    }

    async fn insert_autor(&self, autor: NewAutor) -> Result<String, StoreError> {
        let document = AutorDocument {
            id: None,
            nombre: autor.nombre,
            biografia: autor.biografia,
        };
        let result = self.autores.insert_one(document).await?;
        inserted_hex(result.inserted_id)
    }

    async fn find_autores(&self, ids: &[String]) -> Result<Vec<AutorRecord>, StoreError> {
        let object_ids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<AutorDocument> = self
            .autores
            .find(doc! { "_id": { "$in": object_ids } })
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(AutorRecord::try_from).collect()
    }

    async fn insert_libro(&self, libro: LibroFields) -> Result<String, StoreError> {
        let document = LibroDocument {
            id: None,
            titulo: libro.titulo,
            autores: libro.autores,
            copias: libro.copias,
        };
        let result = self.libros.insert_one(document).await?;
        inserted_hex(result.inserted_id)
    }

    async fn find_libros(&self, titulo: Option<&str>) -> Result<Vec<LibroRecord>, StoreError> {
        let filter = match titulo {
            Some(titulo) => doc! { "titulo": titulo },
            None => doc! {},
        };

        let documents: Vec<LibroDocument> =
            self.libros.find(filter).await?.try_collect().await?;

        documents.into_iter().map(LibroRecord::try_from).collect()
    }

    async fn find_libro(&self, id: &str) -> Result<Option<LibroRecord>, StoreError> {
        let Some(filter) = by_id(id) else {
            return Ok(None);
        };

        self.libros
            .find_one(filter)
            .await?
            .map(LibroRecord::try_from)
            .transpose()
    }

    async fn replace_libro(
        &self,
        id: &str,
        libro: LibroFields,
    ) -> Result<ReplaceOutcome, StoreError> {
        let Some(filter) = by_id(id) else {
            return Ok(ReplaceOutcome {
                matched: 0,
                modified: 0,
            });
        };

        let update = doc! {
            "$set": {
                "titulo": libro.titulo,
                "autores": libro.autores,
                "copias": libro.copias,
            }
        };
        let result = self.libros.update_one(filter, update).await?;

        Ok(ReplaceOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_libro(&self, id: &str) -> Result<bool, StoreError> {
        let Some(filter) = by_id(id) else {
            return Ok(false);
        };

        let result = self.libros.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_libros(&self) -> Result<u64, StoreError> {
        Ok(self.libros.count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!(target: "biblioteca-db", "closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
