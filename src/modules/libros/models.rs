use biblioteca_db::LibroFields;
use biblioteca_http::error::AppError;
use serde::{Deserialize, Serialize};

use crate::modules::autores::models::Autor;
use crate::utils;

pub const MISSING_FIELDS: &str = "El título, los autores y las copias son campos requeridos.";
pub const MISSING_ID: &str = "Introduce id";
pub const ID_MISMATCH: &str = "El id de la consulta y el del cuerpo no coinciden.";

/// A book with its author references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Libro {
    pub id: String,
    pub titulo: String,
    pub autores: Vec<Autor>,
    pub copias: i64,
}

/// Body of `POST /libro`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLibro {
    pub titulo: Option<String>,
    pub autores: Option<Vec<String>>,
    pub copias: Option<i64>,
}

impl CreateLibro {
    /// `titulo` non-empty, `autores` present (possibly empty), `copias` non-zero.
    pub fn validate(self) -> Result<LibroFields, AppError> {
        let mut details = Vec::new();
        let fields = self.collect(&mut details);
        fields.ok_or_else(|| AppError::validation(details, MISSING_FIELDS))
    }

    fn collect(self, details: &mut Vec<serde_json::Value>) -> Option<LibroFields> {
        let titulo = utils::non_empty(self.titulo);
        let copias = self.copias.filter(|copias| *copias != 0);

        if titulo.is_none() {
            details.push(utils::required("titulo"));
        }
        if self.autores.is_none() {
            details.push(utils::required("autores"));
        }
        if copias.is_none() {
            details.push(utils::required("copias"));
        }

        Some(LibroFields {
            titulo: titulo?,
            autores: self.autores?,
            copias: copias?,
        })
    }
}

/// Body of `PUT /libro`. The id normally travels in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLibro {
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: CreateLibro,
}

impl UpdateLibro {
    /// Resolve the target id from query and body, then validate the fields.
    pub fn validate(self, query_id: Option<String>) -> Result<(String, LibroFields), AppError> {
        let id = match (query_id, utils::non_empty(self.id)) {
            (Some(query), Some(body)) if query != body => {
                return Err(AppError::bad_request(ID_MISMATCH))
            }
            (query, body) => query.or(body),
        };

        let mut details = Vec::new();
        if id.is_none() {
            details.push(utils::required("id"));
        }
        let fields = self.fields.collect(&mut details);

        match (id, fields) {
            (Some(id), Some(fields)) => Ok((id, fields)),
            _ => Err(AppError::validation(details, MISSING_FIELDS)),
        }
    }
}

/// `?id=` parameter shared by get, update and delete.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn id(self) -> Option<String> {
        utils::non_empty(self.id)
    }
}

/// `?titulo=` filter of `GET /libros`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub titulo: Option<String>,
}

/// Response of `POST /libro`: the stored fields echoed with the new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLibro {
    pub id: String,
    pub titulo: String,
    pub autores: Vec<String>,
    pub copias: i64,
}

impl CreatedLibro {
    pub fn new(id: String, fields: LibroFields) -> Self {
        Self {
            id,
            titulo: fields.titulo,
            autores: fields.autores,
            copias: fields.copias,
        }
    }
}

/// Response of `PUT /libro`. The author list is published under `autor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedLibro {
    pub id: String,
    pub titulo: String,
    #[serde(rename = "autor")]
    pub autores: Vec<String>,
    pub copias: i64,
}

impl UpdatedLibro {
    pub fn new(id: String, fields: LibroFields) -> Self {
        Self {
            id,
            titulo: fields.titulo,
            autores: fields.autores,
            copias: fields.copias,
        }
    }
}
